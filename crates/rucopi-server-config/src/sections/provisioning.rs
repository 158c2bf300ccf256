// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User provisioning configuration.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_USERS_TABLE: &str = "usuarios";
pub const DEFAULT_ADMIN_ROLE: &str = "administrador";

/// How new accounts are created in the auth provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningMode {
	/// The admin chooses a temporary password; the email is pre-confirmed
	/// and the user must change the password on first login.
	#[default]
	AdminPassword,
	/// Only the email is registered; it stays unconfirmed and the user
	/// completes sign-up from the invitation.
	InviteOnly,
}

impl ProvisioningMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			ProvisioningMode::AdminPassword => "admin_password",
			ProvisioningMode::InviteOnly => "invite_only",
		}
	}

	pub fn sets_password(&self) -> bool {
		matches!(self, ProvisioningMode::AdminPassword)
	}
}

impl fmt::Display for ProvisioningMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ProvisioningMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().replace('-', "_").as_str() {
			"admin_password" | "password" => Ok(ProvisioningMode::AdminPassword),
			"invite_only" | "invite" => Ok(ProvisioningMode::InviteOnly),
			other => Err(format!(
				"unknown provisioning mode '{other}' (expected admin_password or invite_only)"
			)),
		}
	}
}

/// Provisioning configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
	pub mode: ProvisioningMode,
	/// Table holding the application user rows (`id`, `nome`, `cargo`, `permissoes`).
	pub users_table: String,
	/// Exact `cargo` value that grants permission to provision users.
	pub admin_role: String,
}

impl Default for ProvisioningConfig {
	fn default() -> Self {
		Self {
			mode: ProvisioningMode::default(),
			users_table: DEFAULT_USERS_TABLE.to_string(),
			admin_role: DEFAULT_ADMIN_ROLE.to_string(),
		}
	}
}

/// Provisioning configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisioningConfigLayer {
	#[serde(default)]
	pub mode: Option<ProvisioningMode>,
	#[serde(default)]
	pub users_table: Option<String>,
	#[serde(default)]
	pub admin_role: Option<String>,
}

impl ProvisioningConfigLayer {
	pub fn merge(&mut self, other: ProvisioningConfigLayer) {
		if other.mode.is_some() {
			self.mode = other.mode;
		}
		if other.users_table.is_some() {
			self.users_table = other.users_table;
		}
		if other.admin_role.is_some() {
			self.admin_role = other.admin_role;
		}
	}

	pub fn finalize(self) -> Result<ProvisioningConfig, ConfigError> {
		let users_table = self
			.users_table
			.unwrap_or_else(|| DEFAULT_USERS_TABLE.to_string());
		if users_table.is_empty()
			|| !users_table
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '_')
		{
			return Err(ConfigError::InvalidValue {
				key: "provisioning.users_table".to_string(),
				message: format!("'{users_table}' is not a plain table name"),
			});
		}

		let admin_role = self
			.admin_role
			.unwrap_or_else(|| DEFAULT_ADMIN_ROLE.to_string());
		if admin_role.trim().is_empty() {
			return Err(ConfigError::InvalidValue {
				key: "provisioning.admin_role".to_string(),
				message: "must not be empty".to_string(),
			});
		}

		Ok(ProvisioningConfig {
			mode: self.mode.unwrap_or_default(),
			users_table,
			admin_role,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = ProvisioningConfigLayer::default().finalize().unwrap();
		assert_eq!(config.mode, ProvisioningMode::AdminPassword);
		assert_eq!(config.users_table, "usuarios");
		assert_eq!(config.admin_role, "administrador");
	}

	#[test]
	fn test_mode_parsing() {
		assert_eq!(
			"invite-only".parse::<ProvisioningMode>().unwrap(),
			ProvisioningMode::InviteOnly
		);
		assert_eq!(
			"ADMIN_PASSWORD".parse::<ProvisioningMode>().unwrap(),
			ProvisioningMode::AdminPassword
		);
		assert!("magic".parse::<ProvisioningMode>().is_err());
	}

	#[test]
	fn test_rejects_injected_table_name() {
		let layer = ProvisioningConfigLayer {
			users_table: Some("usuarios?select=*".to_string()),
			..Default::default()
		};
		assert!(layer.finalize().is_err());
	}

	#[test]
	fn test_only_admin_password_sets_password() {
		assert!(ProvisioningMode::AdminPassword.sets_password());
		assert!(!ProvisioningMode::InviteOnly.sets_password());
	}
}
