// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Rucopi.
//!
//! Every outbound call to the auth provider and data store goes through a
//! client built here so they carry the same User-Agent and timeout policy.

mod client;

pub use client::new_client_with_timeout;
