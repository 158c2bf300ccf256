// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory [`AuthProvider`] and [`ProfileStore`] for tests.
//!
//! Both fakes record every call so tests can assert on side effects, and
//! each remote operation can be made to fail on demand.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::BackendError;
use crate::provider::{AuthProvider, ProfileStore};
use crate::types::{AccountId, AuthUser, NewAccount, UserMetadata, UserProfileRow};

const CONFIRMED_AT: &str = "2025-01-01T00:00:00Z";

/// An account held by [`InMemoryAuthProvider`].
#[derive(Debug, Clone)]
pub struct StoredAccount {
	pub user: AuthUser,
	pub password: Option<String>,
}

#[derive(Default)]
pub struct InMemoryAuthProvider {
	sessions: Mutex<HashMap<String, AccountId>>,
	accounts: Mutex<Vec<StoredAccount>>,
	fail_token_lookup: AtomicBool,
	fail_metadata_update: AtomicBool,
	fail_delete: AtomicBool,
	create_calls: AtomicUsize,
	metadata_calls: AtomicUsize,
	delete_calls: AtomicUsize,
}

impl InMemoryAuthProvider {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register an existing account reachable through `token`.
	pub fn with_session(self, token: &str, id: AccountId) -> Self {
		self.lock_sessions().insert(token.to_string(), id);
		self
	}

	/// Fail `user_from_token` with a transport error.
	pub fn fail_token_lookup(&self, fail: bool) {
		self.fail_token_lookup.store(fail, Ordering::SeqCst);
	}

	pub fn fail_metadata_update(&self, fail: bool) {
		self.fail_metadata_update.store(fail, Ordering::SeqCst);
	}

	pub fn fail_delete(&self, fail: bool) {
		self.fail_delete.store(fail, Ordering::SeqCst);
	}

	pub fn accounts(&self) -> Vec<StoredAccount> {
		self.lock_accounts().clone()
	}

	pub fn account_by_email(&self, email: &str) -> Option<StoredAccount> {
		self.lock_accounts()
			.iter()
			.find(|a| a.user.email.as_deref() == Some(email))
			.cloned()
	}

	pub fn create_calls(&self) -> usize {
		self.create_calls.load(Ordering::SeqCst)
	}

	pub fn metadata_calls(&self) -> usize {
		self.metadata_calls.load(Ordering::SeqCst)
	}

	pub fn delete_calls(&self) -> usize {
		self.delete_calls.load(Ordering::SeqCst)
	}

	fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, AccountId>> {
		self.sessions.lock().expect("sessions lock poisoned")
	}

	fn lock_accounts(&self) -> std::sync::MutexGuard<'_, Vec<StoredAccount>> {
		self.accounts.lock().expect("accounts lock poisoned")
	}
}

fn metadata_map(metadata: &UserMetadata) -> serde_json::Map<String, serde_json::Value> {
	match serde_json::to_value(metadata) {
		Ok(serde_json::Value::Object(map)) => map,
		_ => serde_json::Map::new(),
	}
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
	async fn user_from_token(&self, token: &str) -> Result<Option<AuthUser>, BackendError> {
		if self.fail_token_lookup.load(Ordering::SeqCst) {
			return Err(BackendError::Timeout);
		}
		let Some(id) = self.lock_sessions().get(token).copied() else {
			return Ok(None);
		};
		let known = self
			.lock_accounts()
			.iter()
			.find(|a| a.user.id == id)
			.map(|a| a.user.clone());
		Ok(Some(known.unwrap_or(AuthUser {
			id,
			email: None,
			email_confirmed_at: Some(CONFIRMED_AT.to_string()),
			user_metadata: serde_json::Map::new(),
		})))
	}

	async fn create_user(&self, account: &NewAccount) -> Result<AuthUser, BackendError> {
		self.create_calls.fetch_add(1, Ordering::SeqCst);

		let email = account.email.trim().to_lowercase();
		if !email.contains('@') {
			return Err(BackendError::rejected(
				400,
				"Unable to validate email address: invalid format",
			));
		}

		let mut accounts = self.lock_accounts();
		if accounts
			.iter()
			.any(|a| a.user.email.as_deref() == Some(email.as_str()))
		{
			return Err(BackendError::rejected(
				422,
				"A user with this email address has already been registered",
			));
		}

		let user = AuthUser {
			id: AccountId::new(Uuid::new_v4()),
			email: Some(email),
			email_confirmed_at: account.email_confirm.then(|| CONFIRMED_AT.to_string()),
			user_metadata: account
				.user_metadata
				.as_ref()
				.map(metadata_map)
				.unwrap_or_default(),
		};
		accounts.push(StoredAccount {
			user: user.clone(),
			password: account.password.as_ref().map(|p| p.expose().clone()),
		});
		Ok(user)
	}

	async fn update_user_metadata(
		&self,
		id: &AccountId,
		metadata: &UserMetadata,
	) -> Result<AuthUser, BackendError> {
		self.metadata_calls.fetch_add(1, Ordering::SeqCst);
		if self.fail_metadata_update.load(Ordering::SeqCst) {
			return Err(BackendError::rejected(500, "metadata update failed"));
		}

		let mut accounts = self.lock_accounts();
		let account = accounts
			.iter_mut()
			.find(|a| a.user.id == *id)
			.ok_or_else(|| BackendError::rejected(404, "User not found"))?;
		account.user.user_metadata = metadata_map(metadata);
		Ok(account.user.clone())
	}

	async fn delete_user(&self, id: &AccountId) -> Result<(), BackendError> {
		self.delete_calls.fetch_add(1, Ordering::SeqCst);
		if self.fail_delete.load(Ordering::SeqCst) {
			return Err(BackendError::Timeout);
		}

		let mut accounts = self.lock_accounts();
		let before = accounts.len();
		accounts.retain(|a| a.user.id != *id);
		if accounts.len() == before {
			return Err(BackendError::rejected(404, "User not found"));
		}
		Ok(())
	}
}

#[derive(Default)]
pub struct InMemoryProfileStore {
	rows: Mutex<Vec<UserProfileRow>>,
	fail_role_lookup: AtomicBool,
	fail_insert: AtomicBool,
}

impl InMemoryProfileStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seed an existing row.
	pub fn with_row(self, row: UserProfileRow) -> Self {
		self.lock_rows().push(row);
		self
	}

	pub fn fail_role_lookup(&self, fail: bool) {
		self.fail_role_lookup.store(fail, Ordering::SeqCst);
	}

	pub fn fail_insert(&self, fail: bool) {
		self.fail_insert.store(fail, Ordering::SeqCst);
	}

	pub fn rows(&self) -> Vec<UserProfileRow> {
		self.lock_rows().clone()
	}

	pub fn row(&self, id: &AccountId) -> Option<UserProfileRow> {
		self.lock_rows().iter().find(|r| r.id == *id).cloned()
	}

	fn lock_rows(&self) -> std::sync::MutexGuard<'_, Vec<UserProfileRow>> {
		self.rows.lock().expect("rows lock poisoned")
	}
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
	async fn role_of(&self, id: &AccountId) -> Result<Option<String>, BackendError> {
		if self.fail_role_lookup.load(Ordering::SeqCst) {
			return Err(BackendError::InvalidResponse("JSON parse error".to_string()));
		}
		Ok(self.row(id).map(|r| r.cargo))
	}

	async fn insert_user(&self, row: &UserProfileRow) -> Result<(), BackendError> {
		if self.fail_insert.load(Ordering::SeqCst) {
			return Err(BackendError::rejected(503, "service unavailable"));
		}

		let mut rows = self.lock_rows();
		if rows.iter().any(|r| r.id == row.id) {
			return Err(BackendError::rejected(
				409,
				"duplicate key value violates unique constraint",
			));
		}
		rows.push(row.clone());
		Ok(())
	}
}
