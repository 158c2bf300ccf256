// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! [`AuthProvider`] over the GoTrue API.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{ensure_success, read_json, send, SupabaseClient};
use crate::error::BackendError;
use crate::provider::AuthProvider;
use crate::types::{AccountId, AuthUser, NewAccount, UserMetadata};

#[derive(Debug, Serialize)]
struct CreateUserPayload<'a> {
	email: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	password: Option<&'a str>,
	email_confirm: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	user_metadata: Option<&'a UserMetadata>,
}

#[derive(Debug, Serialize)]
struct UpdateMetadataPayload<'a> {
	user_metadata: &'a UserMetadata,
}

#[async_trait]
impl AuthProvider for SupabaseClient {
	#[instrument(skip(self, token))]
	async fn user_from_token(&self, token: &str) -> Result<Option<AuthUser>, BackendError> {
		let url = self.auth_url("/user");
		debug!(url = %url, "Resolving caller from bearer token");

		let response = send(
			self.http_client
				.get(&url)
				.header("apikey", self.service_role_key.expose())
				.bearer_auth(token),
		)
		.await?;

		match response.status() {
			StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
				debug!(status = %response.status(), "Token not recognised by auth provider");
				Ok(None)
			}
			_ => read_json(response).await.map(Some),
		}
	}

	#[instrument(skip(self, account), fields(email_confirm = account.email_confirm))]
	async fn create_user(&self, account: &NewAccount) -> Result<AuthUser, BackendError> {
		let url = self.auth_url("/admin/users");
		let payload = CreateUserPayload {
			email: &account.email,
			password: account.password.as_ref().map(|p| p.expose().as_str()),
			email_confirm: account.email_confirm,
			user_metadata: account.user_metadata.as_ref(),
		};

		let response = send(self.service_request(Method::POST, &url).json(&payload)).await?;
		let user: AuthUser = read_json(response).await?;
		info!(account_id = %user.id, "Auth account created");
		Ok(user)
	}

	#[instrument(skip(self, metadata), fields(account_id = %id))]
	async fn update_user_metadata(
		&self,
		id: &AccountId,
		metadata: &UserMetadata,
	) -> Result<AuthUser, BackendError> {
		let url = self.auth_url(&format!("/admin/users/{id}"));
		let payload = UpdateMetadataPayload {
			user_metadata: metadata,
		};

		let response = send(self.service_request(Method::PUT, &url).json(&payload)).await?;
		read_json(response).await
	}

	#[instrument(skip(self), fields(account_id = %id))]
	async fn delete_user(&self, id: &AccountId) -> Result<(), BackendError> {
		let url = self.auth_url(&format!("/admin/users/{id}"));
		let response = send(self.service_request(Method::DELETE, &url)).await?;
		if let Err(e) = ensure_success(response).await {
			warn!(error = %e, "Auth account delete failed");
			return Err(e);
		}
		info!("Auth account deleted");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rucopi_common_secret::SecretString;
	use serde_json::json;
	use wiremock::matchers::{body_json, header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	const ACCOUNT: &str = "6f1c4c2e-8f7a-4b7e-9a51-1c2d3e4f5a6b";

	fn client(server: &MockServer) -> SupabaseClient {
		SupabaseClient::new(server.uri(), SecretString::from("service-key"))
	}

	fn user_json(email: &str) -> serde_json::Value {
		json!({
			"id": ACCOUNT,
			"aud": "authenticated",
			"email": email,
			"email_confirmed_at": "2025-01-01T00:00:00Z",
			"user_metadata": {}
		})
	}

	#[tokio::test]
	async fn user_from_token_forwards_caller_token() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/auth/v1/user"))
			.and(header("apikey", "service-key"))
			.and(header("authorization", "Bearer caller-jwt"))
			.respond_with(ResponseTemplate::new(200).set_body_json(user_json("admin@x.com")))
			.expect(1)
			.mount(&server)
			.await;

		let user = client(&server)
			.user_from_token("caller-jwt")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(user.id.to_string(), ACCOUNT);
	}

	#[tokio::test]
	async fn user_from_token_unauthorized_is_none() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/auth/v1/user"))
			.respond_with(
				ResponseTemplate::new(401)
					.set_body_json(json!({"code": 401, "msg": "invalid JWT"})),
			)
			.mount(&server)
			.await;

		let user = client(&server).user_from_token("expired").await.unwrap();
		assert!(user.is_none());
	}

	#[tokio::test]
	async fn create_user_sends_password_and_metadata() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/auth/v1/admin/users"))
			.and(header("authorization", "Bearer service-key"))
			.and(body_json(json!({
				"email": "ana@x.com",
				"password": "Temp123!",
				"email_confirm": true,
				"user_metadata": {
					"full_name": "Ana",
					"display_name": "Ana",
					"must_change_password": true
				}
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(user_json("ana@x.com")))
			.expect(1)
			.mount(&server)
			.await;

		let account = NewAccount {
			email: "ana@x.com".to_string(),
			password: Some(SecretString::from("Temp123!")),
			email_confirm: true,
			user_metadata: Some(UserMetadata::temporary_password("Ana")),
		};
		let user = client(&server).create_user(&account).await.unwrap();
		assert_eq!(user.email.as_deref(), Some("ana@x.com"));
	}

	#[tokio::test]
	async fn create_invite_user_omits_password() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/auth/v1/admin/users"))
			.and(body_json(json!({
				"email": "bia@x.com",
				"email_confirm": false
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(user_json("bia@x.com")))
			.expect(1)
			.mount(&server)
			.await;

		let account = NewAccount {
			email: "bia@x.com".to_string(),
			password: None,
			email_confirm: false,
			user_metadata: None,
		};
		client(&server).create_user(&account).await.unwrap();
	}

	#[tokio::test]
	async fn create_user_duplicate_surfaces_message() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/auth/v1/admin/users"))
			.respond_with(ResponseTemplate::new(422).set_body_json(json!({
				"code": 422,
				"error_code": "email_exists",
				"msg": "A user with this email address has already been registered"
			})))
			.mount(&server)
			.await;

		let account = NewAccount {
			email: "ana@x.com".to_string(),
			password: None,
			email_confirm: false,
			user_metadata: None,
		};
		let err = client(&server).create_user(&account).await.unwrap_err();
		match err {
			BackendError::Rejected { status, message } => {
				assert_eq!(status, 422);
				assert_eq!(
					message,
					"A user with this email address has already been registered"
				);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn update_metadata_targets_account() {
		let server = MockServer::start().await;
		Mock::given(method("PUT"))
			.and(path(format!("/auth/v1/admin/users/{ACCOUNT}")))
			.and(body_json(json!({
				"user_metadata": {
					"full_name": "Ana",
					"display_name": "Ana",
					"must_change_password": true
				}
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(user_json("ana@x.com")))
			.expect(1)
			.mount(&server)
			.await;

		let id: AccountId = ACCOUNT.parse().unwrap();
		client(&server)
			.update_user_metadata(&id, &UserMetadata::temporary_password("Ana"))
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn delete_user_reports_failure() {
		let server = MockServer::start().await;
		Mock::given(method("DELETE"))
			.and(path(format!("/auth/v1/admin/users/{ACCOUNT}")))
			.respond_with(ResponseTemplate::new(500).set_body_json(json!({"msg": "boom"})))
			.mount(&server)
			.await;

		let id: AccountId = ACCOUNT.parse().unwrap();
		let err = client(&server).delete_user(&id).await.unwrap_err();
		assert_eq!(err.status(), Some(500));
	}
}
