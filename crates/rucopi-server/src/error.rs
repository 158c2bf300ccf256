// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP error responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rucopi_server_provisioning::ProvisioningError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	/// The body is not JSON or does not have the expected fields.
	#[error("invalid request body: {0}")]
	InvalidBody(String),
	#[error(transparent)]
	Provisioning(#[from] ProvisioningError),
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		ApiError::InvalidBody(rejection.body_text())
	}
}

/// JSON error body. `error` is a stable code, except for account creation
/// failures where it carries the auth provider's message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub error: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub account_id: Option<String>,
}

impl ErrorBody {
	fn code(error: &str) -> Self {
		Self {
			error: error.to_string(),
			message: None,
			account_id: None,
		}
	}

	fn with_message(error: &str, message: impl Into<String>) -> Self {
		Self {
			message: Some(message.into()),
			..Self::code(error)
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (status, body) = match &self {
			ApiError::InvalidBody(msg) => (
				StatusCode::BAD_REQUEST,
				ErrorBody::with_message("invalid_request", msg.clone()),
			),
			ApiError::Provisioning(err) => match err {
				ProvisioningError::InvalidRequest(msg) => (
					StatusCode::BAD_REQUEST,
					ErrorBody::with_message(err.error_code(), msg.clone()),
				),
				ProvisioningError::NotAdmin => (StatusCode::FORBIDDEN, ErrorBody::code("not_admin")),
				ProvisioningError::AccountCreation(source) => {
					(StatusCode::BAD_REQUEST, ErrorBody::code(&source.to_string()))
				}
				ProvisioningError::MetadataUpdate { .. } => (
					StatusCode::BAD_GATEWAY,
					ErrorBody::with_message(err.error_code(), err.to_string()),
				),
				ProvisioningError::ProfileInsert { .. } => (
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorBody::with_message(err.error_code(), err.to_string()),
				),
				ProvisioningError::PartialProvisioning { account_id, .. } => (
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorBody {
						account_id: Some(account_id.to_string()),
						..ErrorBody::with_message(err.error_code(), err.to_string())
					},
				),
			},
		};

		if status.is_server_error() {
			tracing::error!(status = status.as_u16(), error = %self, "provisioning request failed");
		}

		(status, Json(body)).into_response()
	}
}
