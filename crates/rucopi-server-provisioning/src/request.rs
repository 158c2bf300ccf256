// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provisioning request schema and validation.

use rucopi_common_secret::SecretString;
use rucopi_server_backend::{NewAccount, UserMetadata};
use rucopi_server_config::ProvisioningMode;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProvisioningError;

/// Request body as sent by the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserBody {
	pub nome: String,
	pub email: String,
	pub cargo: String,
	/// Temporary password chosen by the admin (admin-password mode only).
	#[serde(default)]
	pub senha: Option<SecretString>,
}

/// A validated provisioning request.
#[derive(Debug, Clone)]
pub struct ProvisioningRequest {
	pub name: String,
	pub email: String,
	pub role: String,
	pub password: Option<SecretString>,
}

impl ProvisioningRequest {
	/// Validate a body for the given mode.
	///
	/// In invite-only mode any supplied password is dropped.
	pub fn validate(body: CreateUserBody, mode: ProvisioningMode) -> Result<Self, ProvisioningError> {
		let name = required("nome", &body.nome)?;
		let role = required("cargo", &body.cargo)?;
		let email = required("email", &body.email)?;
		if !is_plausible_email(&email) {
			return Err(ProvisioningError::InvalidRequest(
				"email is not a valid address".to_string(),
			));
		}

		let password = if mode.sets_password() {
			match body.senha {
				Some(senha) if !senha.is_empty() => Some(senha),
				_ => {
					return Err(ProvisioningError::InvalidRequest(
						"senha is required".to_string(),
					))
				}
			}
		} else {
			if body.senha.is_some() {
				debug!(mode = %mode, "ignoring senha");
			}
			None
		};

		Ok(Self {
			name,
			email,
			role,
			password,
		})
	}

	/// Account parameters for the auth provider.
	///
	/// With a password the email is pre-confirmed and the user is flagged to
	/// change the password on first login; without one the account is an
	/// unconfirmed invitation.
	pub fn new_account(&self) -> NewAccount {
		match &self.password {
			Some(password) => NewAccount {
				email: self.email.clone(),
				password: Some(password.clone()),
				email_confirm: true,
				user_metadata: Some(UserMetadata::temporary_password(&self.name)),
			},
			None => NewAccount {
				email: self.email.clone(),
				password: None,
				email_confirm: false,
				user_metadata: None,
			},
		}
	}
}

fn required(field: &str, value: &str) -> Result<String, ProvisioningError> {
	let trimmed = value.trim();
	if trimmed.is_empty() {
		return Err(ProvisioningError::InvalidRequest(format!(
			"{field} must not be empty"
		)));
	}
	Ok(trimmed.to_string())
}

/// Shape check only; the auth provider has the final word.
fn is_plausible_email(email: &str) -> bool {
	if email.chars().any(char::is_whitespace) {
		return false;
	}
	let Some((local, domain)) = email.split_once('@') else {
		return false;
	};
	!local.is_empty()
		&& !domain.is_empty()
		&& !domain.contains('@')
		&& !domain.starts_with('.')
		&& !domain.ends_with('.')
}
