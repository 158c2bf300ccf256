// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for backend calls.

use thiserror::Error;

/// Errors that can occur when talking to the auth provider or profile store.
#[derive(Debug, Error)]
pub enum BackendError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// The backend refused the request. `message` is the backend's own
	/// explanation, suitable to relay to the caller.
	#[error("{message}")]
	Rejected { status: u16, message: String },

	/// Invalid or unparseable response from the backend.
	#[error("Invalid response from backend: {0}")]
	InvalidResponse(String),
}

impl BackendError {
	pub fn rejected(status: u16, message: impl Into<String>) -> Self {
		BackendError::Rejected {
			status,
			message: message.into(),
		}
	}

	/// HTTP status reported by the backend, if it answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			BackendError::Rejected { status, .. } => Some(*status),
			BackendError::Network(e) => e.status().map(|s| s.as_u16()),
			BackendError::Timeout | BackendError::InvalidResponse(_) => None,
		}
	}
}
