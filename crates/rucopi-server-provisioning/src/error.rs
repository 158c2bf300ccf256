// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use rucopi_server_backend::{AccountId, BackendError};

/// Errors that can occur during user provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	#[error("invalid request: {0}")]
	InvalidRequest(String),

	/// Caller could not be identified or lacks the admin role.
	#[error("not_admin")]
	NotAdmin,

	/// The auth provider refused to create the account. Displays the
	/// provider's own message.
	#[error("{0}")]
	AccountCreation(#[source] BackendError),

	#[error("failed to update metadata of account {account_id}: {source}")]
	MetadataUpdate {
		account_id: AccountId,
		#[source]
		source: BackendError,
	},

	#[error("failed to insert user row for account {account_id}: {source}")]
	ProfileInsert {
		account_id: AccountId,
		#[source]
		source: BackendError,
	},

	/// A later step failed and deleting the created account failed too.
	#[error("account {account_id} left without user row ({cause}); rollback failed: {source}")]
	PartialProvisioning {
		account_id: AccountId,
		cause: String,
		#[source]
		source: BackendError,
	},
}

impl ProvisioningError {
	/// Stable machine-readable code for API responses.
	pub fn error_code(&self) -> &'static str {
		match self {
			ProvisioningError::InvalidRequest(_) => "invalid_request",
			ProvisioningError::NotAdmin => "not_admin",
			ProvisioningError::AccountCreation(_) => "account_creation_failed",
			ProvisioningError::MetadataUpdate { .. } => "metadata_update_failed",
			ProvisioningError::ProfileInsert { .. } => "profile_insert_failed",
			ProvisioningError::PartialProvisioning { .. } => "partial_provisioning",
		}
	}

	/// The account left behind in the auth provider, if any.
	pub fn orphaned_account(&self) -> Option<&AccountId> {
		match self {
			ProvisioningError::PartialProvisioning { account_id, .. } => Some(account_id),
			_ => None,
		}
	}
}
