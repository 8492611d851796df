// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role-assignment store.
//!
//! Assignments are unique per `(user_id, role)` pair; inserting a duplicate
//! surfaces a uniqueness violation rather than a second row. The provisioner
//! treats that as "already assigned" and moves on.

use async_trait::async_trait;
use chrono::Utc;
use quad_server_auth::{AssignmentId, Role, RoleAssignment, UserId};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait RoleStore: Send + Sync {
	async fn get_assignment(
		&self,
		user_id: &UserId,
		role: Role,
	) -> Result<Option<RoleAssignment>, DbError>;
	async fn insert_assignment(&self, user_id: &UserId, role: Role)
		-> Result<RoleAssignment, DbError>;
	async fn list_assignments(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>, DbError>;
}

/// Repository for role-assignment database operations.
#[derive(Clone)]
pub struct RoleRepository {
	pool: SqlitePool,
}

impl RoleRepository {
	/// Create a new repository with the given pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Get the assignment for a `(user_id, role)` pair.
	///
	/// # Arguments
	/// * `user_id` - The identity's UUID
	/// * `role` - The role to look up
	///
	/// # Returns
	/// `None` if the identity does not hold the role.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role = %role))]
	pub async fn get_assignment(
		&self,
		user_id: &UserId,
		role: Role,
	) -> Result<Option<RoleAssignment>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT user_id, role, created_at
			FROM role_assignments
			WHERE user_id = ? AND role = ?
			"#,
		)
		.bind(user_id.to_string())
		.bind(role.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_assignment(&r)).transpose()
	}

	/// Insert a role assignment and return it.
	///
	/// # Arguments
	/// * `user_id` - The identity's UUID
	/// * `role` - The role to assign
	///
	/// # Errors
	/// Returns `DbError::Sqlx` if insert fails (e.g., duplicate pair).
	///
	/// # Database Constraints
	/// - (`user_id`, `role`) must be unique
	/// - `user_id` must reference an existing identity
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role = %role))]
	pub async fn insert_assignment(
		&self,
		user_id: &UserId,
		role: Role,
	) -> Result<RoleAssignment, DbError> {
		let id = AssignmentId::generate();
		let assignment = RoleAssignment {
			user_id: *user_id,
			role,
			created_at: Utc::now(),
		};
		sqlx::query(
			r#"
			INSERT INTO role_assignments (id, user_id, role, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(assignment.user_id.to_string())
		.bind(assignment.role.to_string())
		.bind(assignment.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(user_id = %user_id, role = %role, "role assigned");
		Ok(assignment)
	}

	/// List all assignments held by an identity.
	///
	/// # Arguments
	/// * `user_id` - The identity's UUID
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn list_assignments(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT user_id, role, created_at
			FROM role_assignments
			WHERE user_id = ?
			ORDER BY created_at ASC
			"#,
		)
		.bind(user_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(|r| self.row_to_assignment(r)).collect()
	}

	fn row_to_assignment(&self, row: &sqlx::sqlite::SqliteRow) -> Result<RoleAssignment, DbError> {
		let user_id_str: String = row.get("user_id");
		let role_str: String = row.get("role");
		let created_at: String = row.get("created_at");

		let user_id = Uuid::parse_str(&user_id_str)
			.map_err(|e| DbError::Internal(format!("Invalid user_id: {e}")))?;
		let role = role_str
			.parse::<Role>()
			.map_err(|e| DbError::Internal(format!("Invalid role: {e}")))?;

		Ok(RoleAssignment {
			user_id: UserId::new(user_id),
			role,
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

#[async_trait]
impl RoleStore for RoleRepository {
	async fn get_assignment(
		&self,
		user_id: &UserId,
		role: Role,
	) -> Result<Option<RoleAssignment>, DbError> {
		self.get_assignment(user_id, role).await
	}

	async fn insert_assignment(
		&self,
		user_id: &UserId,
		role: Role,
	) -> Result<RoleAssignment, DbError> {
		self.insert_assignment(user_id, role).await
	}

	async fn list_assignments(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>, DbError> {
		self.list_assignments(user_id).await
	}
}
