// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity directory: login identities keyed by unique email.
//!
//! The email column carries a UNIQUE constraint and is matched exactly as
//! stored (no case folding). Creation and lookup are the two halves of the
//! provisioner's find-or-create step; a create that loses a race surfaces a
//! uniqueness violation for the caller to reconcile.

use async_trait::async_trait;
use chrono::Utc;
use quad_server_auth::{Identity, UserId};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait IdentityDirectory: Send + Sync {
	async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DbError>;
	async fn create_identity(&self, identity: &Identity, password_hash: &str)
		-> Result<(), DbError>;
	async fn get_identity(&self, id: &UserId) -> Result<Option<Identity>, DbError>;
}

/// Repository for login-identity database operations.
///
/// All IDs are UUIDs stored as strings in SQLite.
#[derive(Clone)]
pub struct DirectoryRepository {
	pool: SqlitePool,
}

impl DirectoryRepository {
	/// Create a new repository with the given pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Find an identity by its email address.
	///
	/// # Arguments
	/// * `email` - Email address, matched exactly as stored
	///
	/// # Returns
	/// `None` if no identity exists for this email.
	#[tracing::instrument(skip(self, email))]
	pub async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, display_name, email_confirmed, created_at, updated_at
			FROM users
			WHERE email = ?
			"#,
		)
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;

		let result = row.map(|r| self.row_to_identity(&r)).transpose()?;
		if let Some(ref identity) = result {
			tracing::debug!(user_id = %identity.id, "identity found by email");
		}
		Ok(result)
	}

	/// Create a new identity with the given password hash.
	///
	/// # Arguments
	/// * `identity` - The identity to create
	/// * `password_hash` - Argon2 PHC string for the initial credential
	///
	/// # Errors
	/// Returns `DbError::Sqlx` if insert fails (e.g., duplicate email).
	///
	/// # Database Constraints
	/// - `id` must be unique
	/// - `email` must be unique
	#[tracing::instrument(skip(self, identity, password_hash), fields(user_id = %identity.id))]
	pub async fn create_identity(
		&self,
		identity: &Identity,
		password_hash: &str,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, email, display_name, password_hash, email_confirmed, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(identity.id.to_string())
		.bind(&identity.email)
		.bind(&identity.display_name)
		// Note: password_hash is intentionally not logged
		.bind(password_hash)
		.bind(identity.email_confirmed as i32)
		.bind(identity.created_at.to_rfc3339())
		.bind(identity.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(user_id = %identity.id, "identity created");
		Ok(())
	}

	/// Get an identity by ID.
	///
	/// # Arguments
	/// * `id` - The identity's UUID
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_identity(&self, id: &UserId) -> Result<Option<Identity>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, display_name, email_confirmed, created_at, updated_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_identity(&r)).transpose()
	}

	fn row_to_identity(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Identity, DbError> {
		let id_str: String = row.get("id");
		let email_confirmed: i32 = row.get("email_confirmed");
		let created_at: String = row.get("created_at");
		let updated_at: String = row.get("updated_at");

		let id =
			Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(format!("Invalid user ID: {e}")))?;

		Ok(Identity {
			id: UserId::new(id),
			email: row.get("email"),
			display_name: row.get("display_name"),
			email_confirmed: email_confirmed != 0,
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
			updated_at: chrono::DateTime::parse_from_rfc3339(&updated_at)
				.map_err(|e| DbError::Internal(format!("Invalid updated_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

#[async_trait]
impl IdentityDirectory for DirectoryRepository {
	async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DbError> {
		self.find_by_email(email).await
	}

	async fn create_identity(
		&self,
		identity: &Identity,
		password_hash: &str,
	) -> Result<(), DbError> {
		self.create_identity(identity, password_hash).await
	}

	async fn get_identity(&self, id: &UserId) -> Result<Option<Identity>, DbError> {
		self.get_identity(id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_provisioning_test_pool;

	async fn make_repo() -> DirectoryRepository {
		let pool = create_provisioning_test_pool().await;
		DirectoryRepository::new(pool)
	}

	#[tokio::test]
	async fn test_create_and_find_by_email() {
		let repo = make_repo().await;
		let identity = Identity::new("a@campus.edu", "A One");

		repo.create_identity(&identity, "hash").await.unwrap();

		let fetched = repo.find_by_email("a@campus.edu").await.unwrap();
		assert!(fetched.is_some());
		let fetched = fetched.unwrap();
		assert_eq!(fetched.id, identity.id);
		assert_eq!(fetched.display_name, "A One");
		assert!(fetched.email_confirmed);
	}

	#[tokio::test]
	async fn test_find_missing_email_returns_none() {
		let repo = make_repo().await;
		let result = repo.find_by_email("nobody@campus.edu").await.unwrap();
		assert!(result.is_none());
	}

	#[tokio::test]
	async fn test_email_match_is_case_sensitive() {
		let repo = make_repo().await;
		let identity = Identity::new("Mixed@Campus.edu", "Mixed");
		repo.create_identity(&identity, "hash").await.unwrap();

		assert!(repo.find_by_email("Mixed@Campus.edu").await.unwrap().is_some());
		assert!(repo.find_by_email("mixed@campus.edu").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_duplicate_email_is_unique_violation() {
		let repo = make_repo().await;
		repo
			.create_identity(&Identity::new("a@campus.edu", "First"), "hash")
			.await
			.unwrap();

		let err = repo
			.create_identity(&Identity::new("a@campus.edu", "Second"), "hash")
			.await
			.unwrap_err();
		assert!(err.is_unique_violation());
	}

	#[tokio::test]
	async fn test_get_identity_by_id() {
		let repo = make_repo().await;
		let identity = Identity::new("b@campus.edu", "B Two");
		repo.create_identity(&identity, "hash").await.unwrap();

		let fetched = repo.get_identity(&identity.id).await.unwrap().unwrap();
		assert_eq!(fetched.email, "b@campus.edu");

		let missing = repo.get_identity(&UserId::generate()).await.unwrap();
		assert!(missing.is_none());
	}
}
