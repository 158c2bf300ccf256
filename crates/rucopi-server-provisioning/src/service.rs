// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use rucopi_server_backend::{AccountId, AuthProvider, BackendError, ProfileStore, UserProfileRow};
use rucopi_server_config::{ProvisioningConfig, ProvisioningMode};
use tracing::{debug, error, info, instrument, warn};

use crate::error::ProvisioningError;
use crate::request::{CreateUserBody, ProvisioningRequest};

/// Result of a successful provisioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedUser {
	pub account_id: AccountId,
	pub email: String,
	pub mode: ProvisioningMode,
}

/// Creates application users on behalf of an administrator.
pub struct ProvisioningService {
	auth: Arc<dyn AuthProvider>,
	profiles: Arc<dyn ProfileStore>,
	mode: ProvisioningMode,
	admin_role: String,
}

impl ProvisioningService {
	pub fn new(
		auth: Arc<dyn AuthProvider>,
		profiles: Arc<dyn ProfileStore>,
		config: &ProvisioningConfig,
	) -> Self {
		Self {
			auth,
			profiles,
			mode: config.mode,
			admin_role: config.admin_role.clone(),
		}
	}

	pub fn mode(&self) -> ProvisioningMode {
		self.mode
	}

	/// Provision a new user.
	///
	/// `bearer` is the caller's access token, without the `Bearer ` prefix.
	/// Nothing is written unless the caller holds the admin role. Once the
	/// account exists, a failure in a later step deletes it again.
	#[instrument(skip(self, bearer, body), fields(mode = %self.mode))]
	pub async fn provision(
		&self,
		bearer: Option<&str>,
		body: CreateUserBody,
	) -> Result<ProvisionedUser, ProvisioningError> {
		let request = ProvisioningRequest::validate(body, self.mode)?;

		let caller = self.authorize(bearer).await?;
		debug!(caller = %caller, "caller authorized");

		let account = request.new_account();
		let created = self
			.auth
			.create_user(&account)
			.await
			.map_err(|e| {
				warn!(error = %e, "auth provider rejected account creation");
				ProvisioningError::AccountCreation(e)
			})?;
		let account_id = created.id;

		if let Some(metadata) = &account.user_metadata {
			if let Err(e) = self.auth.update_user_metadata(&account_id, metadata).await {
				warn!(account_id = %account_id, error = %e, "failed to re-apply account metadata");
				return Err(self
					.compensate(account_id, e, |account_id, source| {
						ProvisioningError::MetadataUpdate { account_id, source }
					})
					.await);
			}
		}

		let row = UserProfileRow::new(account_id, &request.name, &request.role);
		if let Err(e) = self.profiles.insert_user(&row).await {
			warn!(account_id = %account_id, error = %e, "failed to insert user row");
			return Err(self
				.compensate(account_id, e, |account_id, source| {
					ProvisioningError::ProfileInsert { account_id, source }
				})
				.await);
		}

		info!(account_id = %account_id, caller = %caller, "user provisioned");
		Ok(ProvisionedUser {
			account_id,
			email: request.email,
			mode: self.mode,
		})
	}

	/// Resolve the caller and check the admin role.
	///
	/// Lookup failures count as "not an admin".
	async fn authorize(&self, bearer: Option<&str>) -> Result<AccountId, ProvisioningError> {
		let Some(token) = bearer.filter(|t| !t.is_empty()) else {
			debug!("no bearer token");
			return Err(ProvisioningError::NotAdmin);
		};

		let caller = match self.auth.user_from_token(token).await {
			Ok(Some(user)) => user.id,
			Ok(None) => {
				debug!("bearer token not recognised");
				return Err(ProvisioningError::NotAdmin);
			}
			Err(e) => {
				warn!(error = %e, "failed to resolve caller identity");
				return Err(ProvisioningError::NotAdmin);
			}
		};

		match self.profiles.role_of(&caller).await {
			Ok(Some(role)) if role == self.admin_role => Ok(caller),
			Ok(Some(role)) => {
				debug!(caller = %caller, role = %role, "caller is not an admin");
				Err(ProvisioningError::NotAdmin)
			}
			Ok(None) => {
				debug!(caller = %caller, "caller has no user row");
				Err(ProvisioningError::NotAdmin)
			}
			Err(e) => {
				warn!(caller = %caller, error = %e, "failed to look up caller role");
				Err(ProvisioningError::NotAdmin)
			}
		}
	}

	/// Delete a just-created account after `failure`.
	///
	/// Returns `rolled_back(account_id, failure)` if the account is gone, or
	/// [`ProvisioningError::PartialProvisioning`] if it could not be deleted.
	async fn compensate(
		&self,
		account_id: AccountId,
		failure: BackendError,
		rolled_back: impl FnOnce(AccountId, BackendError) -> ProvisioningError,
	) -> ProvisioningError {
		match self.auth.delete_user(&account_id).await {
			Ok(()) => {
				info!(account_id = %account_id, "rolled back account");
				rolled_back(account_id, failure)
			}
			Err(delete_err) => {
				let cause = failure.to_string();
				error!(
					account_id = %account_id,
					cause = %cause,
					error = %delete_err,
					"rollback failed; account has no user row"
				);
				ProvisioningError::PartialProvisioning {
					account_id,
					cause,
					source: delete_err,
				}
			}
		}
	}
}
