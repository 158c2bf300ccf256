// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Rucopi provisioning server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`RUCOPI_SERVER_*`)
//!
//! The resolved [`ServerConfig`] is built once at startup and handed to the
//! server; request handlers never read the environment.
//!
//! # Usage
//!
//! ```ignore
//! use rucopi_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use rucopi_common_secret::{load_secret_env, SecretString};
use tracing::{debug, info};

/// Serializes tests that touch the fixed `RUCOPI_SERVER_*` / `SUPABASE_*`
/// variables; the process environment is shared between test threads.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn lock_env() -> std::sync::MutexGuard<'static, ()> {
	let guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
	for name in [
		"RUCOPI_SERVER_HOST",
		"RUCOPI_SERVER_PORT",
		"RUCOPI_SERVER_SUPABASE_URL",
		"SUPABASE_URL",
		"RUCOPI_SERVER_SUPABASE_SERVICE_ROLE_KEY",
		"RUCOPI_SERVER_SUPABASE_SERVICE_ROLE_KEY_FILE",
		"SUPABASE_SERVICE_ROLE_KEY",
		"SUPABASE_SERVICE_ROLE_KEY_FILE",
		"RUCOPI_SERVER_PROVISIONING_MODE",
	] {
		std::env::remove_var(name);
	}
	guard
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub backend: BackendConfig,
	pub provisioning: ProvisioningConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`RUCOPI_SERVER_*`)
/// 2. Config file (`/etc/rucopi/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Read the service-role key, preferring the namespaced variable.
fn load_service_role_key() -> Result<Option<SecretString>, ConfigError> {
	let namespaced = load_secret_env("RUCOPI_SERVER_SUPABASE_SERVICE_ROLE_KEY")
		.map_err(|e| ConfigError::Secret(e.to_string()))?;
	if namespaced.is_some() {
		return Ok(namespaced);
	}
	load_secret_env("SUPABASE_SERVICE_ROLE_KEY").map_err(|e| ConfigError::Secret(e.to_string()))
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let service_role_key = load_service_role_key()?;
	resolve(layer, service_role_key)
}

/// Resolve a merged layer plus the service-role secret into a [`ServerConfig`].
pub fn resolve(
	layer: ServerConfigLayer,
	service_role_key: Option<SecretString>,
) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let backend = layer.backend.unwrap_or_default().finalize(service_role_key)?;
	let provisioning = layer.provisioning.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		host = %http.host,
		port = http.port,
		backend_url = %backend.url,
		mode = %provisioning.mode,
		users_table = %provisioning.users_table,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		backend,
		provisioning,
		logging,
	})
}
