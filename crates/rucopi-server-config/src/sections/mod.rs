// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod backend;
mod http;
mod logging;
mod provisioning;

pub use backend::{BackendConfig, BackendConfigLayer, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use provisioning::{
	ProvisioningConfig, ProvisioningConfigLayer, ProvisioningMode, DEFAULT_ADMIN_ROLE,
	DEFAULT_USERS_TABLE,
};
