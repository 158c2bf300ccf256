// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin-gated user provisioning.
//!
//! [`ProvisioningService::provision`] validates the request, checks that the
//! caller is an administrator, creates the auth account and then the local
//! user row keyed by the new account id. If a step after account creation
//! fails, the account is deleted again so the two stores stay consistent.

pub mod error;
pub mod request;
pub mod service;

pub use error::ProvisioningError;
pub use request::{CreateUserBody, ProvisioningRequest};
pub use rucopi_server_config::ProvisioningMode;
pub use service::{ProvisionedUser, ProvisioningService};
