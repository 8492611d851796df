// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Version reporting for the `version` subcommand.

/// Human-readable version line.
pub fn format_version_info() -> String {
	format!("quad-server {}", env!("CARGO_PKG_VERSION"))
}
