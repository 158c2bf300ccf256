// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supabase client: GoTrue admin API for accounts, PostgREST for the user
//! table.
//!
//! All calls authenticate with the service-role key (`apikey` header plus
//! bearer), except identity resolution, which forwards the caller's own
//! token as the bearer.

mod auth;
mod rest;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use rucopi_common_secret::SecretString;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, trace};

use crate::error::BackendError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_USERS_TABLE: &str = "usuarios";

/// Client for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
	http_client: Client,
	base_url: String,
	service_role_key: SecretString,
	users_table: String,
}

impl SupabaseClient {
	/// Creates a client for the project at `base_url` (e.g.
	/// `https://xyz.supabase.co`).
	pub fn new(base_url: impl Into<String>, service_role_key: SecretString) -> Self {
		let base_url = base_url.into().trim_end_matches('/').to_string();
		Self {
			http_client: rucopi_common_http::new_client_with_timeout(DEFAULT_TIMEOUT),
			base_url,
			service_role_key,
			users_table: DEFAULT_USERS_TABLE.to_string(),
		}
	}

	/// Sets the per-request timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.http_client = rucopi_common_http::new_client_with_timeout(timeout);
		self
	}

	/// Sets the table holding application user rows.
	pub fn with_users_table(mut self, table: impl Into<String>) -> Self {
		self.users_table = table.into();
		self
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn users_table(&self) -> &str {
		&self.users_table
	}

	fn auth_url(&self, path: &str) -> String {
		format!("{}/auth/v1{}", self.base_url, path)
	}

	fn rest_url(&self) -> String {
		format!("{}/rest/v1/{}", self.base_url, self.users_table)
	}

	/// A request authenticated as the service role.
	fn service_request(&self, method: Method, url: &str) -> RequestBuilder {
		self.http_client
			.request(method, url)
			.header("apikey", self.service_role_key.expose())
			.bearer_auth(self.service_role_key.expose())
	}
}

async fn send(request: RequestBuilder) -> Result<Response, BackendError> {
	request.send().await.map_err(|e| {
		if e.is_timeout() {
			error!("Request timed out");
			return BackendError::Timeout;
		}
		error!(error = %e, "Network error during backend request");
		BackendError::Network(e)
	})
}

/// Fails with [`BackendError::Rejected`] unless the response is 2xx.
async fn ensure_success(response: Response) -> Result<Response, BackendError> {
	let status = response.status();
	debug!(status = %status, "Received response from backend");
	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();
	let message = extract_error_message(&body).unwrap_or_else(|| {
		status
			.canonical_reason()
			.unwrap_or("unknown error")
			.to_string()
	});
	debug!(status = status.as_u16(), message = %message, "Backend rejected request");
	Err(BackendError::rejected(status.as_u16(), message))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
	let response = ensure_success(response).await?;
	let body = response.text().await.map_err(|e| {
		error!(error = %e, "Failed to read response body");
		BackendError::Network(e)
	})?;
	trace!(body_len = body.len(), "Response body");

	serde_json::from_str(&body).map_err(|e| {
		error!(error = %e, "Failed to parse backend response");
		BackendError::InvalidResponse(format!("JSON parse error: {e}"))
	})
}

/// Error body shapes used by GoTrue and PostgREST.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
	msg: Option<String>,
	message: Option<String>,
	error_description: Option<String>,
	error: Option<String>,
}

/// Pull a human-readable message out of an error body.
///
/// GoTrue answers with `msg` (or `error_description` on OAuth-style
/// endpoints), PostgREST with `message`.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
	let parsed: ErrorBody = serde_json::from_str(body).ok()?;
	[
		parsed.msg,
		parsed.message,
		parsed.error_description,
		parsed.error,
	]
	.into_iter()
	.flatten()
	.find(|m| !m.trim().is_empty())
}
