// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Domain-record store: the student/faculty rows owned by admin workflows.
//!
//! Records pre-exist provisioning (a student row can sit with no login for
//! a whole term). The only mutation this store exposes is setting a record's
//! identity back-reference; everything else about these rows belongs to the
//! out-of-scope admin CRUD flows.

use async_trait::async_trait;
use chrono::Utc;
use quad_server_auth::{RecordId, Role, UserId};
use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

#[async_trait]
pub trait RecordStore: Send + Sync {
	async fn link_identity(
		&self,
		role: Role,
		record_id: &RecordId,
		user_id: &UserId,
	) -> Result<(), DbError>;
}

/// Repository for student/faculty record linkage.
#[derive(Clone)]
pub struct RecordRepository {
	pool: SqlitePool,
}

impl RecordRepository {
	/// Create a new repository with the given pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Set the identity back-reference on a domain record.
	///
	/// The table is selected by `role` (`students` or `faculty`).
	///
	/// # Arguments
	/// * `role` - Selects the record table
	/// * `record_id` - The record's UUID
	/// * `user_id` - The identity to reference
	///
	/// # Errors
	/// Returns `DbError::NotFound` if no record exists with this ID, and
	/// `DbError::Internal` if the role has no backing table.
	#[tracing::instrument(skip(self), fields(role = %role, record_id = %record_id, user_id = %user_id))]
	pub async fn link_identity(
		&self,
		role: Role,
		record_id: &RecordId,
		user_id: &UserId,
	) -> Result<(), DbError> {
		let table = role
			.record_table()
			.ok_or_else(|| DbError::Internal(format!("no domain table for role '{role}'")))?;

		let now = Utc::now().to_rfc3339();
		// `table` is one of two compile-time constants, never caller input.
		let result = sqlx::query(&format!(
			"UPDATE {table} SET user_id = ?, updated_at = ? WHERE id = ?"
		))
		.bind(user_id.to_string())
		.bind(&now)
		.bind(record_id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!(
				"no {role} record with id {record_id}"
			)));
		}

		tracing::debug!(role = %role, record_id = %record_id, user_id = %user_id, "domain record linked to identity");
		Ok(())
	}
}

#[async_trait]
impl RecordStore for RecordRepository {
	async fn link_identity(
		&self,
		role: Role,
		record_id: &RecordId,
		user_id: &UserId,
	) -> Result<(), DbError> {
		self.link_identity(role, record_id, user_id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{
		create_provisioning_test_pool, fetch_record_user_id, insert_test_identity,
		insert_test_record,
	};

	#[tokio::test]
	async fn test_link_student_record() {
		let pool = create_provisioning_test_pool().await;
		let repo = RecordRepository::new(pool.clone());

		let user_id = UserId::generate();
		insert_test_identity(&pool, &user_id, "s@campus.edu").await;
		let record_id = RecordId::generate();
		insert_test_record(&pool, Role::Student, &record_id, "S One").await;

		repo
			.link_identity(Role::Student, &record_id, &user_id)
			.await
			.unwrap();

		let linked = fetch_record_user_id(&pool, Role::Student, &record_id).await;
		assert_eq!(linked.as_deref(), Some(user_id.to_string().as_str()));
	}

	#[tokio::test]
	async fn test_link_faculty_record() {
		let pool = create_provisioning_test_pool().await;
		let repo = RecordRepository::new(pool.clone());

		let user_id = UserId::generate();
		insert_test_identity(&pool, &user_id, "f@campus.edu").await;
		let record_id = RecordId::generate();
		insert_test_record(&pool, Role::Faculty, &record_id, "F One").await;

		repo
			.link_identity(Role::Faculty, &record_id, &user_id)
			.await
			.unwrap();

		let linked = fetch_record_user_id(&pool, Role::Faculty, &record_id).await;
		assert_eq!(linked.as_deref(), Some(user_id.to_string().as_str()));
	}

	#[tokio::test]
	async fn test_unknown_record_is_not_found() {
		let pool = create_provisioning_test_pool().await;
		let repo = RecordRepository::new(pool.clone());

		let user_id = UserId::generate();
		insert_test_identity(&pool, &user_id, "x@campus.edu").await;

		let err = repo
			.link_identity(Role::Student, &RecordId::generate(), &user_id)
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::NotFound(_)));
	}

	#[tokio::test]
	async fn test_admin_role_has_no_table() {
		let pool = create_provisioning_test_pool().await;
		let repo = RecordRepository::new(pool);

		let err = repo
			.link_identity(Role::Admin, &RecordId::generate(), &UserId::generate())
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::Internal(_)));
	}
}
