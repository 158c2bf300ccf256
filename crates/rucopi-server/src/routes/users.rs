// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User provisioning HTTP handler.

use axum::{
	extract::{rejection::JsonRejection, State},
	http::HeaderMap,
	Json,
};
use rucopi_server_provisioning::CreateUserBody;
use serde::Serialize;

use crate::{api::AppState, auth::extract_bearer_token, error::ApiError};

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
	pub success: bool,
}

/// POST /criar-usuario - Create a user on behalf of an administrator.
#[tracing::instrument(skip_all)]
pub async fn create_user(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Result<Json<CreateUserBody>, JsonRejection>,
) -> Result<Json<CreateUserResponse>, ApiError> {
	let Json(body) = body?;
	let token = extract_bearer_token(&headers);

	let provisioned = state.provisioning.provision(token.as_deref(), body).await?;
	tracing::debug!(
		account_id = %provisioned.account_id,
		email = %provisioned.email,
		"responding success"
	);

	Ok(Json(CreateUserResponse { success: true }))
}
