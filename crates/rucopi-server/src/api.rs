// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Router and application state.

use std::sync::Arc;
use std::time::Duration;

use axum::{
	http::{header, Method},
	routing::{get, post},
	Router,
};
use rucopi_server_backend::{AuthProvider, ProfileStore, SupabaseClient};
use rucopi_server_config::{ProvisioningConfig, ServerConfig};
use rucopi_server_provisioning::ProvisioningService;
use tower_http::cors::{Any, CorsLayer};

use crate::routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub provisioning: Arc<ProvisioningService>,
}

impl AppState {
	pub fn new(
		auth: Arc<dyn AuthProvider>,
		profiles: Arc<dyn ProfileStore>,
		config: &ProvisioningConfig,
	) -> Self {
		Self {
			provisioning: Arc::new(ProvisioningService::new(auth, profiles, config)),
		}
	}
}

/// Build state backed by the configured Supabase project.
pub fn create_app_state(config: &ServerConfig) -> AppState {
	let client = Arc::new(
		SupabaseClient::new(
			config.backend.url.clone(),
			config.backend.service_role_key.clone(),
		)
		.with_timeout(Duration::from_secs(config.backend.request_timeout_secs))
		.with_users_table(config.provisioning.users_table.clone()),
	);

	tracing::debug!(
		backend_url = %client.base_url(),
		users_table = %client.users_table(),
		"created Supabase client"
	);

	AppState::new(client.clone(), client, &config.provisioning)
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/criar-usuario", post(routes::users::create_user))
		.route("/functions/v1/criar-usuario", post(routes::users::create_user))
		.with_state(state)
}

/// CORS policy for browser callers (the dashboard calls the endpoint
/// directly with the user's access token).
pub fn cors_layer() -> CorsLayer {
	CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers([
			header::AUTHORIZATION,
			header::CONTENT_TYPE,
			header::HeaderName::from_static("apikey"),
			header::HeaderName::from_static("x-client-info"),
		])
}
