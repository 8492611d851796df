// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use quad_server_auth::PasswordError;
use quad_server_db::DbError;

/// Errors that can occur during account provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	#[error("database error: {0}")]
	Database(#[from] DbError),

	#[error("record not found: {0}")]
	RecordNotFound(String),

	#[error("invalid request: {0}")]
	InvalidRequest(String),

	#[error(transparent)]
	Password(#[from] PasswordError),
}
