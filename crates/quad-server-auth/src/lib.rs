// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity, role, and credential types for the Quad server.
//!
//! This crate defines the domain vocabulary shared by the database and
//! provisioning layers:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs ([`UserId`],
//!   [`RecordId`], [`AssignmentId`]) preventing accidental mixing
//! - **[`Role`]**: the campus role taxonomy (student, faculty, admin)
//! - **[`Identity`]** and [`RoleAssignment`]: the login-identity entities
//! - **Password hashing**: argon2id helpers with reduced-cost test parameters

pub mod password;
pub mod types;
pub mod user;

pub use password::{hash_password, verify_password, PasswordError};
pub use types::{AssignmentId, RecordId, Role, UserId};
pub use user::{Identity, RoleAssignment};
