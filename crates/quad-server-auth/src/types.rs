// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for identities and roles.
//!
//! This module defines the foundational types used throughout the server:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for different entity
//!   types ([`UserId`], [`RecordId`], [`AssignmentId`]) preventing accidental
//!   mixing
//! - **[`Role`]**: the campus role taxonomy; only student and faculty are
//!   provisionable (they are the roles with a backing domain-record table)
//!
//! All ID types implement transparent serde serialization (as UUID strings)
//! and provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a login identity.");
define_id_type!(RecordId, "Unique identifier for a student or faculty record.");
define_id_type!(AssignmentId, "Unique identifier for a role assignment.");

// =============================================================================
// Roles
// =============================================================================

/// Campus roles a login identity can hold.
///
/// `Student` and `Faculty` are backed by a domain-record table and are the
/// only roles the account provisioner produces. `Admin` exists in the
/// taxonomy (assignments can be stored for it) but has no domain record and
/// is never provisioned through the account-linking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Enrolled student with a row in the `students` table.
	Student,
	/// Teaching staff with a row in the `faculty` table.
	Faculty,
	/// Administrative staff; no backing domain record.
	Admin,
}

impl Role {
	/// Returns all roles in the taxonomy.
	pub fn all() -> &'static [Role] {
		&[Role::Student, Role::Faculty, Role::Admin]
	}

	/// Returns the domain-record table backing this role, if any.
	pub fn record_table(&self) -> Option<&'static str> {
		match self {
			Role::Student => Some("students"),
			Role::Faculty => Some("faculty"),
			Role::Admin => None,
		}
	}

	/// Returns true if the account provisioner may produce this role.
	pub fn is_provisionable(&self) -> bool {
		self.record_table().is_some()
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Student => write!(f, "student"),
			Role::Faculty => write!(f, "faculty"),
			Role::Admin => write!(f, "admin"),
		}
	}
}

impl FromStr for Role {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"student" => Ok(Role::Student),
			"faculty" => Ok(Role::Faculty),
			"admin" => Ok(Role::Admin),
			other => Err(format!("unknown role '{other}'")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::collections::HashSet;

	#[test]
	fn test_role_display_roundtrip() {
		for role in Role::all() {
			let parsed: Role = role.to_string().parse().unwrap();
			assert_eq!(parsed, *role);
		}
	}

	#[test]
	fn test_unknown_role_rejected() {
		assert!("registrar".parse::<Role>().is_err());
	}

	#[test]
	fn test_record_table_mapping() {
		assert_eq!(Role::Student.record_table(), Some("students"));
		assert_eq!(Role::Faculty.record_table(), Some("faculty"));
		assert_eq!(Role::Admin.record_table(), None);
	}

	#[test]
	fn test_only_record_backed_roles_are_provisionable() {
		assert!(Role::Student.is_provisionable());
		assert!(Role::Faculty.is_provisionable());
		assert!(!Role::Admin.is_provisionable());
	}

	proptest! {
		#[test]
		fn user_id_generation_is_unique(count in 1..1000usize) {
			let mut ids = HashSet::new();
			for _ in 0..count {
				let id = UserId::generate();
				prop_assert!(ids.insert(id.to_string()), "Generated duplicate UserId");
			}
		}

		#[test]
		fn record_id_generation_is_unique(count in 1..1000usize) {
			let mut ids = HashSet::new();
			for _ in 0..count {
				let id = RecordId::generate();
				prop_assert!(ids.insert(id.to_string()), "Generated duplicate RecordId");
			}
		}
	}
}
