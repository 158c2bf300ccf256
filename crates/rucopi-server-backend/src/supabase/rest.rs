// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! [`ProfileStore`] over PostgREST.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::{ensure_success, read_json, send, SupabaseClient};
use crate::error::BackendError;
use crate::provider::ProfileStore;
use crate::types::{AccountId, UserProfileRow};

#[derive(Debug, Deserialize)]
struct RoleRow {
	cargo: Option<String>,
}

#[async_trait]
impl ProfileStore for SupabaseClient {
	#[instrument(skip(self), fields(account_id = %id, table = %self.users_table))]
	async fn role_of(&self, id: &AccountId) -> Result<Option<String>, BackendError> {
		let url = self.rest_url();
		let response = send(
			self.service_request(Method::GET, &url)
				.query(&[("select", "cargo".to_string()), ("id", format!("eq.{id}"))]),
		)
		.await?;

		let rows: Vec<RoleRow> = read_json(response).await?;
		if rows.len() > 1 {
			return Err(BackendError::InvalidResponse(format!(
				"expected at most one row for id {id}, got {}",
				rows.len()
			)));
		}
		let role = rows.into_iter().next().and_then(|r| r.cargo);
		debug!(found = role.is_some(), "Role lookup finished");
		Ok(role)
	}

	#[instrument(skip(self, row), fields(account_id = %row.id, table = %self.users_table))]
	async fn insert_user(&self, row: &UserProfileRow) -> Result<(), BackendError> {
		let url = self.rest_url();
		let response = send(
			self.service_request(Method::POST, &url)
				.header("Prefer", "return=minimal")
				.json(row),
		)
		.await?;
		ensure_success(response).await?;
		info!("User row inserted");
		Ok(())
	}
}
