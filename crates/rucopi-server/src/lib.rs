// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rucopi user provisioning server.
//!
//! Exposes the admin-only `criar-usuario` endpoint over HTTP, backed by the
//! Supabase auth and REST APIs.

pub mod api;
pub mod auth;
pub mod error;
pub mod routes;

pub use api::{cors_layer, create_app_state, create_router, AppState};
pub use error::ApiError;
pub use rucopi_server_config::ServerConfig;
