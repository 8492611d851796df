// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite repositories for the Quad server.
//!
//! Three stores back the account provisioner:
//! - [`DirectoryRepository`] - login identities, looked up by unique email
//! - [`RoleRepository`] - `(identity, role)` assignments, unique per pair
//! - [`RecordRepository`] - student/faculty domain records, linked to an
//!   identity by setting their `user_id` column
//!
//! Uniqueness is enforced at the storage layer (UNIQUE constraints on
//! `users.email` and `role_assignments(user_id, role)`); callers racing to
//! create the same row observe a unique-violation error, classified by
//! [`DbError::is_unique_violation`].

pub mod directory;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod records;
pub mod roles;
pub mod testing;

pub use directory::{DirectoryRepository, IdentityDirectory};
pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::create_pool;
pub use records::{RecordRepository, RecordStore};
pub use roles::{RoleRepository, RoleStore};
