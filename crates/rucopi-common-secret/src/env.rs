// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loading secrets from environment variables.
//!
//! A secret named `FOO` is read from `FOO` directly, or from the file whose
//! path is in `FOO_FILE` (Docker/Kubernetes secret mounts).

use std::path::PathBuf;

use tracing::debug;

use crate::SecretString;

#[derive(Debug, thiserror::Error)]
pub enum SecretEnvError {
	#[error("both {name} and {name}_FILE are set; use only one")]
	Ambiguous { name: String },

	#[error("failed to read secret file {path} for {name}: {source}")]
	FileRead {
		name: String,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Load an optional secret from `name` or `name_FILE`.
///
/// Empty values are treated as unset. Trailing newlines are stripped from
/// file contents.
pub fn load_secret_env(name: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{name}_FILE");
	let direct = non_empty_var(name);
	let file = non_empty_var(&file_var);

	match (direct, file) {
		(Some(_), Some(_)) => Err(SecretEnvError::Ambiguous {
			name: name.to_string(),
		}),
		(Some(value), None) => {
			debug!(name, "loaded secret from environment");
			Ok(Some(SecretString::new(value)))
		}
		(None, Some(path)) => {
			let path = PathBuf::from(path);
			let content =
				std::fs::read_to_string(&path).map_err(|source| SecretEnvError::FileRead {
					name: name.to_string(),
					path: path.clone(),
					source,
				})?;
			debug!(name, path = %path.display(), "loaded secret from file");
			let value = content.trim_end_matches(['\r', '\n']).to_string();
			if value.is_empty() {
				Ok(None)
			} else {
				Ok(Some(SecretString::new(value)))
			}
		}
		(None, None) => Ok(None),
	}
}

fn non_empty_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|v| !v.is_empty())
}
