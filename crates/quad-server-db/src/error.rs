// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),
}

impl DbError {
	/// Returns true if this error is a storage-layer uniqueness violation.
	///
	/// SQLite reports these as `SQLITE_CONSTRAINT_UNIQUE`/`_PRIMARYKEY`;
	/// sqlx normalizes both behind [`sqlx::error::DatabaseError::is_unique_violation`].
	/// Callers use this to reconcile a lost create race with a re-lookup.
	pub fn is_unique_violation(&self) -> bool {
		match self {
			DbError::Sqlx(sqlx::Error::Database(db)) => db.is_unique_violation(),
			DbError::Conflict(_) => true,
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, DbError>;
