// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Backend (Supabase auth + REST) configuration.

use rucopi_common_secret::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Backend configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct BackendConfig {
	/// Project base URL, e.g. `https://xyz.supabase.co`. No trailing slash.
	pub url: String,
	/// Privileged service-role key used for admin calls and table access.
	pub service_role_key: SecretString,
	pub request_timeout_secs: u64,
}

/// Backend configuration layer (partial, for merging).
///
/// The service-role key is never read from a config file; it comes from the
/// environment only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
}

impl BackendConfigLayer {
	pub fn merge(&mut self, other: BackendConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
	}

	pub fn finalize(
		self,
		service_role_key: Option<SecretString>,
	) -> Result<BackendConfig, ConfigError> {
		let url = self
			.url
			.ok_or_else(|| ConfigError::Missing("backend.url (RUCOPI_SERVER_SUPABASE_URL)".to_string()))?;
		let url = url.trim().trim_end_matches('/').to_string();
		if !(url.starts_with("http://") || url.starts_with("https://")) {
			return Err(ConfigError::Validation(format!(
				"backend.url must start with http:// or https://, got '{url}'"
			)));
		}

		let service_role_key = service_role_key.filter(|k| !k.is_empty()).ok_or_else(|| {
			ConfigError::Missing(
				"service role key (RUCOPI_SERVER_SUPABASE_SERVICE_ROLE_KEY)".to_string(),
			)
		})?;

		let request_timeout_secs = self
			.request_timeout_secs
			.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
		if request_timeout_secs == 0 {
			return Err(ConfigError::Validation(
				"backend.request_timeout_secs must be greater than zero".to_string(),
			));
		}

		Ok(BackendConfig {
			url,
			service_role_key,
			request_timeout_secs,
		})
	}
}
