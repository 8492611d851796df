// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login-identity entities.
//!
//! This module provides:
//! - [`Identity`] - a login identity keyed by its unique email
//! - [`RoleAssignment`] - the (identity, role) pair, unique per identity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// A login identity.
///
/// Exactly one identity exists per email address; the email is the sole
/// external lookup key. Identities are created lazily by the account
/// provisioner and reused on every subsequent provisioning call for the
/// same email.
///
/// # PII Handling
///
/// `email` and `display_name` are user-provided PII and should be redacted
/// in logs. The password hash is deliberately not part of this struct; it
/// never leaves the directory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
	/// Unique identifier for this identity.
	pub id: UserId,

	/// Email address, unique across all identities.
	pub email: String,

	/// Display name shown in the admin UI.
	pub display_name: String,

	/// Whether the email is considered confirmed.
	/// Administrative provisioning sets this true at creation, bypassing
	/// the normal signup confirmation step.
	pub email_confirmed: bool,

	/// When the identity was created.
	pub created_at: DateTime<Utc>,

	/// When the identity was last updated.
	pub updated_at: DateTime<Utc>,
}

impl Identity {
	/// Create a new identity with a generated ID and current timestamps.
	///
	/// The confirmation flag is set true: identities minted by an
	/// administrator do not go through email verification.
	pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			id: UserId::generate(),
			email: email.into(),
			display_name: display_name.into(),
			email_confirmed: true,
			created_at: now,
			updated_at: now,
		}
	}
}

/// A role held by a login identity.
///
/// At most one assignment exists per `(user_id, role)` pair; assignment is
/// additive-only through the provisioning flow (no removal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
	/// The identity holding the role.
	pub user_id: UserId,

	/// The role held.
	pub role: Role,

	/// When the assignment was created.
	pub created_at: DateTime<Utc>,
}
