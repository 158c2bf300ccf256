// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{AccountId, AuthUser, NewAccount, UserMetadata, UserProfileRow};

/// External service of record for credentials and account lifecycle.
#[async_trait]
pub trait AuthProvider: Send + Sync {
	/// Resolve the account behind a caller's bearer token.
	///
	/// Returns `Ok(None)` when the provider does not recognise the token.
	async fn user_from_token(&self, token: &str) -> Result<Option<AuthUser>, BackendError>;

	async fn create_user(&self, account: &NewAccount) -> Result<AuthUser, BackendError>;

	/// Replace the account's user metadata.
	async fn update_user_metadata(
		&self,
		id: &AccountId,
		metadata: &UserMetadata,
	) -> Result<AuthUser, BackendError>;

	async fn delete_user(&self, id: &AccountId) -> Result<(), BackendError>;
}

/// The application's user table.
#[async_trait]
pub trait ProfileStore: Send + Sync {
	/// The `cargo` of the row keyed by `id`, or `None` if there is no row
	/// (or the row has no role).
	async fn role_of(&self, id: &AccountId) -> Result<Option<String>, BackendError>;

	async fn insert_user(&self, row: &UserProfileRow) -> Result<(), BackendError>;
}
