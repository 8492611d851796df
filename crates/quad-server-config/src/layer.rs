// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer produced by each source and merged by
//! precedence.

use serde::Deserialize;

use crate::sections::{DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer};

/// Partial server configuration from one source.
///
/// Every section is optional; merging keeps the higher-precedence value
/// wherever both layers set one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Merge a higher-precedence layer into this one.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		if let Some(theirs) = other.http {
			match &mut self.http {
				Some(mine) => mine.merge(theirs),
				None => self.http = Some(theirs),
			}
		}
		if let Some(theirs) = other.database {
			match &mut self.database {
				Some(mine) => mine.merge(theirs),
				None => self.database = Some(theirs),
			}
		}
		if let Some(theirs) = other.logging {
			match &mut self.logging {
				Some(mine) => mine.merge(theirs),
				None => self.logging = Some(theirs),
			}
		}
	}
}
