// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integration tests for the user provisioning routes.
//!
//! Tests cover:
//! - Admin gate (missing token, unknown token, non-admin role)
//! - Both provisioning modes
//! - Body validation before any backend call
//! - Upstream error propagation and rollback responses

use std::sync::Arc;

use axum::{
	body::Body,
	http::{header, Method, Request, StatusCode},
	Router,
};
use rucopi_server::{cors_layer, create_router, AppState};
use rucopi_server_backend::testing::{InMemoryAuthProvider, InMemoryProfileStore};
use rucopi_server_backend::{AccountId, UserProfileRow};
use rucopi_server_config::{ProvisioningConfig, ProvisioningMode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const ADMIN_TOKEN: &str = "admin-access-token";
const OPERATOR_TOKEN: &str = "operator-access-token";

struct TestApp {
	router: Router,
	auth: Arc<InMemoryAuthProvider>,
	profiles: Arc<InMemoryProfileStore>,
}

fn setup_test_app(mode: ProvisioningMode) -> TestApp {
	let admin = AccountId::new(Uuid::new_v4());
	let operator = AccountId::new(Uuid::new_v4());
	let auth = Arc::new(
		InMemoryAuthProvider::new()
			.with_session(ADMIN_TOKEN, admin)
			.with_session(OPERATOR_TOKEN, operator),
	);
	let profiles = Arc::new(
		InMemoryProfileStore::new()
			.with_row(UserProfileRow::new(admin, "Root", "administrador"))
			.with_row(UserProfileRow::new(operator, "Op", "operador")),
	);
	let config = ProvisioningConfig {
		mode,
		..ProvisioningConfig::default()
	};
	let state = AppState::new(auth.clone(), profiles.clone(), &config);
	TestApp {
		router: create_router(state),
		auth,
		profiles,
	}
}

fn create_request(token: Option<&str>, body: Value) -> Request<Body> {
	let mut builder = Request::builder()
		.method(Method::POST)
		.uri("/criar-usuario")
		.header(header::CONTENT_TYPE, "application/json");
	if let Some(token) = token {
		builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
	}
	builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = router.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	let body = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).unwrap()
	};
	(status, body)
}

fn ana() -> Value {
	json!({
		"nome": "Ana",
		"email": "ana@x.com",
		"cargo": "operador",
		"senha": "Temp123!"
	})
}

// ============================================================================
// Admin gate
// ============================================================================

#[tokio::test]
async fn test_missing_token_returns_403() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);

	let (status, body) = send(&app.router, create_request(None, ana())).await;

	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body, json!({"error": "not_admin"}));
	assert_eq!(app.auth.create_calls(), 0);
}

#[tokio::test]
async fn test_non_admin_returns_403_without_side_effects() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);

	let (status, body) = send(&app.router, create_request(Some(OPERATOR_TOKEN), ana())).await;

	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body, json!({"error": "not_admin"}));
	assert!(app.auth.account_by_email("ana@x.com").is_none());
	assert_eq!(app.profiles.rows().len(), 2);
}

#[tokio::test]
async fn test_unknown_token_returns_403() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);

	let (status, _) = send(&app.router, create_request(Some("expired"), ana())).await;

	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_non_bearer_scheme_returns_403() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);
	let request = Request::builder()
		.method(Method::POST)
		.uri("/criar-usuario")
		.header(header::CONTENT_TYPE, "application/json")
		.header(header::AUTHORIZATION, format!("Token {ADMIN_TOKEN}"))
		.body(Body::from(ana().to_string()))
		.unwrap();

	let (status, _) = send(&app.router, request).await;

	assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Provisioning
// ============================================================================

#[tokio::test]
async fn test_admin_password_mode_creates_user() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);

	let (status, body) = send(&app.router, create_request(Some(ADMIN_TOKEN), ana())).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({"success": true}));

	let account = app.auth.account_by_email("ana@x.com").unwrap();
	assert_eq!(account.password.as_deref(), Some("Temp123!"));
	assert!(account.user.is_email_confirmed());
	assert_eq!(account.user.user_metadata["must_change_password"], true);
	assert_eq!(account.user.user_metadata["full_name"], "Ana");

	let row = app.profiles.row(&account.user.id).unwrap();
	assert_eq!(row.nome, "Ana");
	assert_eq!(row.cargo, "operador");
	assert!(row.permissoes.is_empty());
}

#[tokio::test]
async fn test_invite_only_mode_creates_unconfirmed_user() {
	let app = setup_test_app(ProvisioningMode::InviteOnly);
	let body = json!({"nome": "Bia", "email": "bia@x.com", "cargo": "administrador"});

	let (status, response) = send(&app.router, create_request(Some(ADMIN_TOKEN), body)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(response, json!({"success": true}));

	let account = app.auth.account_by_email("bia@x.com").unwrap();
	assert!(account.password.is_none());
	assert!(!account.user.is_email_confirmed());
	assert_eq!(app.auth.metadata_calls(), 0);
	assert_eq!(
		app.profiles.row(&account.user.id).unwrap().cargo,
		"administrador"
	);
}

#[tokio::test]
async fn test_edge_function_path_is_routed() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);
	let request = Request::builder()
		.method(Method::POST)
		.uri("/functions/v1/criar-usuario")
		.header(header::CONTENT_TYPE, "application/json")
		.header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
		.body(Body::from(ana().to_string()))
		.unwrap();

	let (status, _) = send(&app.router, request).await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_email_returns_400_with_provider_message() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);

	let (first, _) = send(&app.router, create_request(Some(ADMIN_TOKEN), ana())).await;
	let (second, body) = send(&app.router, create_request(Some(ADMIN_TOKEN), ana())).await;

	assert_eq!(first, StatusCode::OK);
	assert_eq!(second, StatusCode::BAD_REQUEST);
	assert_eq!(
		body,
		json!({"error": "A user with this email address has already been registered"})
	);
	assert_eq!(app.profiles.rows().len(), 3);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_missing_field_returns_400_before_backend_calls() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);
	let body = json!({"nome": "Ana", "email": "ana@x.com"});

	let (status, response) = send(&app.router, create_request(Some(ADMIN_TOKEN), body)).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(response["error"], "invalid_request");
	assert_eq!(app.auth.create_calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);
	let request = Request::builder()
		.method(Method::POST)
		.uri("/criar-usuario")
		.header(header::CONTENT_TYPE, "application/json")
		.header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
		.body(Body::from("{not json"))
		.unwrap();

	let (status, response) = send(&app.router, request).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(response["error"], "invalid_request");
}

#[tokio::test]
async fn test_missing_password_in_admin_mode_returns_400() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);
	let body = json!({"nome": "Ana", "email": "ana@x.com", "cargo": "operador"});

	let (status, response) = send(&app.router, create_request(Some(ADMIN_TOKEN), body)).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(response["error"], "invalid_request");
	assert_eq!(response["message"], "senha is required");
}

#[tokio::test]
async fn test_invalid_body_is_rejected_even_for_non_admin() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);
	let body = json!({"nome": " ", "email": "ana@x.com", "cargo": "operador", "senha": "pw"});

	let (status, _) = send(&app.router, create_request(None, body)).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Failures after account creation
// ============================================================================

#[tokio::test]
async fn test_insert_failure_rolls_back_account() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);
	app.profiles.fail_insert(true);

	let (status, body) = send(&app.router, create_request(Some(ADMIN_TOKEN), ana())).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body["error"], "profile_insert_failed");
	assert!(app.auth.account_by_email("ana@x.com").is_none());
}

#[tokio::test]
async fn test_metadata_failure_returns_502() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);
	app.auth.fail_metadata_update(true);

	let (status, body) = send(&app.router, create_request(Some(ADMIN_TOKEN), ana())).await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(body["error"], "metadata_update_failed");
	assert!(app.auth.account_by_email("ana@x.com").is_none());
}

#[tokio::test]
async fn test_failed_rollback_returns_account_id() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);
	app.profiles.fail_insert(true);
	app.auth.fail_delete(true);

	let (status, body) = send(&app.router, create_request(Some(ADMIN_TOKEN), ana())).await;

	let orphan = app.auth.account_by_email("ana@x.com").unwrap();
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body["error"], "partial_provisioning");
	assert_eq!(body["account_id"], orphan.user.id.to_string());
}

// ============================================================================
// Health and CORS
// ============================================================================

#[tokio::test]
async fn test_health_reports_mode() {
	let app = setup_test_app(ProvisioningMode::InviteOnly);
	let request = Request::builder()
		.uri("/health")
		.body(Body::empty())
		.unwrap();

	let (status, body) = send(&app.router, request).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({"status": "ok", "mode": "invite_only"}));
}

#[tokio::test]
async fn test_cors_preflight_allows_authorization_header() {
	let app = setup_test_app(ProvisioningMode::AdminPassword);
	let router = app.router.layer(cors_layer());
	let request = Request::builder()
		.method(Method::OPTIONS)
		.uri("/criar-usuario")
		.header(header::ORIGIN, "https://dashboard.example.com")
		.header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
		.header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
		.body(Body::empty())
		.unwrap();

	let response = router.oneshot(request).await.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response
			.headers()
			.get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
			.and_then(|v| v.to_str().ok()),
		Some("*")
	);
}
