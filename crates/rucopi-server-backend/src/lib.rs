// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Backend collaborators for user provisioning.
//!
//! Two seams are defined here:
//!
//! - [`AuthProvider`]: resolves callers from bearer tokens and manages
//!   accounts (create, update metadata, delete)
//! - [`ProfileStore`]: the application `usuarios` table (role lookup, insert)
//!
//! [`SupabaseClient`] implements both against the Supabase auth and REST
//! APIs. With the `testing` feature, in-memory implementations are available
//! in [`testing`].

pub mod error;
pub mod provider;
pub mod supabase;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::BackendError;
pub use provider::{AuthProvider, ProfileStore};
pub use supabase::SupabaseClient;
pub use types::{AccountId, AuthUser, NewAccount, UserMetadata, UserProfileRow};
