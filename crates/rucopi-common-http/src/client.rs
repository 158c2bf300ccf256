// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a new HTTP client with a custom timeout and the standard User-Agent.
///
/// The User-Agent format is: `rucopi/{version} ({os}-{arch})`
/// Example: `rucopi/0.1.0 (linux-x86_64)`
pub fn new_client_with_timeout(timeout: Duration) -> Client {
	debug!(timeout_secs = timeout.as_secs(), "building HTTP client");
	builder()
		.timeout(timeout)
		.build()
		.expect("failed to build HTTP client")
}

fn user_agent() -> String {
	format!(
		"rucopi/{} ({}-{})",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH
	)
}
