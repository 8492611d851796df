// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared helpers for repository and integration tests.
//!
//! Pools are in-memory and capped at one connection so every query sees the
//! same database. Seed helpers write rows directly, standing in for the
//! admin CRUD flows that own student/faculty records in production.

use quad_server_auth::{RecordId, Role, UserId};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::migrations::run_migrations;

pub async fn create_test_pool() -> SqlitePool {
	SqlitePoolOptions::new()
		.max_connections(1)
		.connect(":memory:")
		.await
		.expect("Failed to create test pool")
}

/// In-memory pool with the full provisioning schema applied.
pub async fn create_provisioning_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	run_migrations(&pool).await.expect("Failed to run migrations");
	pool
}

pub async fn insert_test_identity(pool: &SqlitePool, user_id: &UserId, email: &str) {
	let now = chrono::Utc::now().to_rfc3339();
	sqlx::query(
		r#"
		INSERT INTO users (id, email, display_name, password_hash, email_confirmed, created_at, updated_at)
		VALUES (?, ?, 'Test Identity', 'test-hash', 1, ?, ?)
		"#,
	)
	.bind(user_id.to_string())
	.bind(email)
	.bind(&now)
	.bind(&now)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn insert_test_record(
	pool: &SqlitePool,
	role: Role,
	record_id: &RecordId,
	full_name: &str,
) {
	let table = role.record_table().expect("role must have a record table");
	let now = chrono::Utc::now().to_rfc3339();
	sqlx::query(&format!(
		"INSERT INTO {table} (id, full_name, user_id, created_at, updated_at) VALUES (?, ?, NULL, ?, ?)"
	))
	.bind(record_id.to_string())
	.bind(full_name)
	.bind(&now)
	.bind(&now)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn fetch_record_user_id(
	pool: &SqlitePool,
	role: Role,
	record_id: &RecordId,
) -> Option<String> {
	let table = role.record_table().expect("role must have a record table");
	let row = sqlx::query(&format!("SELECT user_id FROM {table} WHERE id = ?"))
		.bind(record_id.to_string())
		.fetch_one(pool)
		.await
		.unwrap();
	row.get("user_id")
}

pub async fn count_identities_for_email(pool: &SqlitePool, email: &str) -> i64 {
	let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
		.bind(email)
		.fetch_one(pool)
		.await
		.unwrap();
	row.0
}

pub async fn count_assignments(pool: &SqlitePool, user_id: &UserId, role: Role) -> i64 {
	let row: (i64,) =
		sqlx::query_as("SELECT COUNT(*) FROM role_assignments WHERE user_id = ? AND role = ?")
			.bind(user_id.to_string())
			.bind(role.to_string())
			.fetch_one(pool)
			.await
			.unwrap();
	row.0
}
