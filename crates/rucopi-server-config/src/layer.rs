// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

use crate::sections::{
	BackendConfigLayer, HttpConfigLayer, LoggingConfigLayer, ProvisioningConfigLayer,
};

/// One partial configuration as read from a single source.
///
/// Layers are merged in precedence order; a field set in a later layer
/// replaces the same field from an earlier one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub backend: Option<BackendConfigLayer>,
	#[serde(default)]
	pub provisioning: Option<ProvisioningConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

macro_rules! merge_section {
	($self:ident, $other:ident, $field:ident) => {
		match ($self.$field.as_mut(), $other.$field) {
			(Some(current), Some(next)) => current.merge(next),
			(None, Some(next)) => $self.$field = Some(next),
			(_, None) => {}
		}
	};
}

impl ServerConfigLayer {
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section!(self, other, http);
		merge_section!(self, other, backend);
		merge_section!(self, other, provisioning);
		merge_section!(self, other, logging);
	}
}
