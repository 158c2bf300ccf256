// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account and profile types shared by the backend implementations.

use std::fmt;
use std::str::FromStr;

use rucopi_common_secret::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to an account by the auth provider.
///
/// The local `usuarios` row reuses it as its primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
	pub fn new(id: Uuid) -> Self {
		Self(id)
	}

}

impl fmt::Display for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for AccountId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Uuid::parse_str(s).map(Self)
	}
}

impl From<Uuid> for AccountId {
	fn from(id: Uuid) -> Self {
		Self(id)
	}
}

/// An account as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
	pub id: AccountId,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub email_confirmed_at: Option<String>,
	#[serde(default)]
	pub user_metadata: serde_json::Map<String, serde_json::Value>,
}

impl AuthUser {
	pub fn is_email_confirmed(&self) -> bool {
		self.email_confirmed_at.is_some()
	}
}

/// Metadata attached to accounts created with an admin-chosen password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
	pub full_name: String,
	pub display_name: String,
	pub must_change_password: bool,
}

impl UserMetadata {
	/// Metadata for a freshly provisioned user who must pick a new password.
	pub fn temporary_password(name: &str) -> Self {
		Self {
			full_name: name.to_string(),
			display_name: name.to_string(),
			must_change_password: true,
		}
	}
}

/// Parameters for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
	pub email: String,
	pub password: Option<SecretString>,
	/// Mark the email as already verified.
	pub email_confirm: bool,
	pub user_metadata: Option<UserMetadata>,
}

/// Row in the application user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfileRow {
	pub id: AccountId,
	pub nome: String,
	pub cargo: String,
	#[serde(default)]
	pub permissoes: serde_json::Map<String, serde_json::Value>,
}

impl UserProfileRow {
	/// A new row with an empty permission set.
	pub fn new(id: AccountId, nome: impl Into<String>, cargo: impl Into<String>) -> Self {
		Self {
			id,
			nome: nome.into(),
			cargo: cargo.into(),
			permissoes: serde_json::Map::new(),
		}
	}
}
