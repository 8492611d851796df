// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The account provisioner: create-or-link a login identity for a
//! pre-existing student or faculty record.
//!
//! The routine is sequential and performs at most one attempt per
//! sub-operation: resolve the identity, ensure the role assignment, link
//! the domain record. There is no rollback; a failure part-way leaves the
//! already-committed steps in place, and because identity creation and role
//! assignment are find-or-create, a retry with corrected input converges
//! instead of duplicating rows.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use quad_server_auth::{hash_password, Identity, RecordId, Role, UserId};
use quad_server_db::{DbError, DirectoryRepository, RecordRepository, RoleRepository};

use crate::error::ProvisioningError;

/// A single provisioning request.
///
/// `password` is used only when a new identity must be created; an existing
/// identity keeps its stored credential untouched.
#[derive(Clone)]
pub struct ProvisionRequest {
	pub email: String,
	pub password: String,
	pub full_name: String,
	pub role: Role,
	pub record_id: RecordId,
}

/// Which branch the identity step took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStatus {
	/// A new identity was created for the email.
	CreatedNew,
	/// An identity already existed for the email and was reused.
	LinkedExisting,
}

impl fmt::Display for ProvisionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProvisionStatus::CreatedNew => write!(f, "created_new"),
			ProvisionStatus::LinkedExisting => write!(f, "linked_existing"),
		}
	}
}

/// Result of a successful provisioning call.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
	pub user_id: UserId,
	pub status: ProvisionStatus,
}

/// Create-or-link service over the identity directory, role store, and
/// domain-record store.
///
/// Holds only shared repository handles; construction happens once at
/// startup and the service is read-only thereafter.
#[derive(Clone)]
pub struct AccountProvisioner {
	directory: Arc<DirectoryRepository>,
	roles: Arc<RoleRepository>,
	records: Arc<RecordRepository>,
}

impl AccountProvisioner {
	/// Create a new provisioner over the given repositories.
	pub fn new(
		directory: Arc<DirectoryRepository>,
		roles: Arc<RoleRepository>,
		records: Arc<RecordRepository>,
	) -> Self {
		Self {
			directory,
			roles,
			records,
		}
	}

	/// Ensure an identity exists for the request's email, ensure it holds
	/// the requested role, and link the target domain record to it.
	///
	/// # Errors
	/// Any failing step aborts the remaining steps and surfaces its cause
	/// verbatim. Already-committed steps are not rolled back; they are
	/// no-ops on retry.
	#[tracing::instrument(skip(self, request), fields(role = %request.role, record_id = %request.record_id))]
	pub async fn provision(
		&self,
		request: ProvisionRequest,
	) -> Result<ProvisionOutcome, ProvisioningError> {
		if request.email.is_empty() {
			return Err(ProvisioningError::InvalidRequest(
				"email must not be empty".to_string(),
			));
		}
		if request.password.is_empty() {
			return Err(ProvisioningError::InvalidRequest(
				"password must not be empty".to_string(),
			));
		}
		if !request.role.is_provisionable() {
			return Err(ProvisioningError::InvalidRequest(format!(
				"role '{}' cannot be provisioned",
				request.role
			)));
		}

		let (identity, created) = find_or_create(
			|| self.directory.find_by_email(&request.email),
			|| async {
				let password_hash = hash_password(&request.password)?;
				let identity = Identity::new(request.email.clone(), request.full_name.clone());
				self
					.directory
					.create_identity(&identity, &password_hash)
					.await?;
				Ok(identity)
			},
		)
		.await?;

		let status = if created {
			ProvisionStatus::CreatedNew
		} else {
			ProvisionStatus::LinkedExisting
		};

		find_or_create(
			|| self.roles.get_assignment(&identity.id, request.role),
			|| async { Ok(self.roles.insert_assignment(&identity.id, request.role).await?) },
		)
		.await?;

		self
			.records
			.link_identity(request.role, &request.record_id, &identity.id)
			.await
			.map_err(|e| match e {
				DbError::NotFound(msg) => ProvisioningError::RecordNotFound(msg),
				other => ProvisioningError::Database(other),
			})?;

		tracing::info!(user_id = %identity.id, role = %request.role, status = %status, "account provisioned");

		Ok(ProvisionOutcome {
			user_id: identity.id,
			status,
		})
	}
}

/// Run `lookup`; on a miss, run `create`.
///
/// If `create` loses a race to a concurrent insert (a storage-layer
/// uniqueness violation), `lookup` is re-run once and a hit is treated as
/// the existing-entity branch; the create error is propagated only if the
/// re-lookup also misses. Returns the entity and true when the create
/// branch produced it.
async fn find_or_create<T, L, LFut, C, CFut>(
	lookup: L,
	create: C,
) -> Result<(T, bool), ProvisioningError>
where
	L: Fn() -> LFut,
	LFut: Future<Output = Result<Option<T>, DbError>>,
	C: FnOnce() -> CFut,
	CFut: Future<Output = Result<T, ProvisioningError>>,
{
	if let Some(existing) = lookup().await? {
		return Ok((existing, false));
	}

	match create().await {
		Ok(created) => Ok((created, true)),
		Err(ProvisioningError::Database(e)) if e.is_unique_violation() => match lookup().await? {
			Some(existing) => Ok((existing, false)),
			None => Err(ProvisioningError::Database(e)),
		},
		Err(e) => Err(e),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use quad_server_auth::verify_password;
	use quad_server_db::testing::{
		count_assignments, count_identities_for_email, create_provisioning_test_pool,
		fetch_record_user_id, insert_test_record,
	};
	use sqlx::sqlite::SqlitePool;
	use sqlx::Row;
	use std::sync::atomic::{AtomicBool, Ordering};

	async fn make_provisioner() -> (AccountProvisioner, SqlitePool) {
		let pool = create_provisioning_test_pool().await;
		let provisioner = AccountProvisioner::new(
			Arc::new(DirectoryRepository::new(pool.clone())),
			Arc::new(RoleRepository::new(pool.clone())),
			Arc::new(RecordRepository::new(pool.clone())),
		);
		(provisioner, pool)
	}

	fn student_request(record_id: RecordId) -> ProvisionRequest {
		ProvisionRequest {
			email: "a@x.com".to_string(),
			password: "secret1".to_string(),
			full_name: "A One".to_string(),
			role: Role::Student,
			record_id,
		}
	}

	#[tokio::test]
	async fn test_provision_creates_identity_role_and_linkage() {
		let (provisioner, pool) = make_provisioner().await;
		let record_id = RecordId::generate();
		insert_test_record(&pool, Role::Student, &record_id, "A One").await;

		let outcome = provisioner
			.provision(student_request(record_id))
			.await
			.unwrap();

		assert_eq!(outcome.status, ProvisionStatus::CreatedNew);
		assert_eq!(count_identities_for_email(&pool, "a@x.com").await, 1);
		assert_eq!(count_assignments(&pool, &outcome.user_id, Role::Student).await, 1);

		let linked = fetch_record_user_id(&pool, Role::Student, &record_id).await;
		assert_eq!(linked.as_deref(), Some(outcome.user_id.to_string().as_str()));
	}

	#[tokio::test]
	async fn test_provision_stores_verifiable_password_hash() {
		let (provisioner, pool) = make_provisioner().await;
		let record_id = RecordId::generate();
		insert_test_record(&pool, Role::Student, &record_id, "A One").await;

		provisioner
			.provision(student_request(record_id))
			.await
			.unwrap();

		let row = sqlx::query("SELECT password_hash FROM users WHERE email = ?")
			.bind("a@x.com")
			.fetch_one(&pool)
			.await
			.unwrap();
		let hash: String = row.get("password_hash");
		assert!(verify_password("secret1", &hash).unwrap());
	}

	#[tokio::test]
	async fn test_repeat_provision_reuses_identity() {
		let (provisioner, pool) = make_provisioner().await;
		let record_id = RecordId::generate();
		insert_test_record(&pool, Role::Student, &record_id, "A One").await;

		let first = provisioner
			.provision(student_request(record_id))
			.await
			.unwrap();
		let second = provisioner
			.provision(student_request(record_id))
			.await
			.unwrap();

		assert_eq!(first.user_id, second.user_id);
		assert_eq!(second.status, ProvisionStatus::LinkedExisting);
		assert_eq!(count_identities_for_email(&pool, "a@x.com").await, 1);
		assert_eq!(count_assignments(&pool, &first.user_id, Role::Student).await, 1);
	}

	#[tokio::test]
	async fn test_repeat_provision_preserves_existing_credential() {
		let (provisioner, pool) = make_provisioner().await;
		let record_id = RecordId::generate();
		insert_test_record(&pool, Role::Student, &record_id, "A One").await;

		provisioner
			.provision(student_request(record_id))
			.await
			.unwrap();

		let mut changed = student_request(record_id);
		changed.password = "different".to_string();
		provisioner.provision(changed).await.unwrap();

		let row = sqlx::query("SELECT password_hash FROM users WHERE email = ?")
			.bind("a@x.com")
			.fetch_one(&pool)
			.await
			.unwrap();
		let hash: String = row.get("password_hash");
		assert!(verify_password("secret1", &hash).unwrap());
		assert!(!verify_password("different", &hash).unwrap());
	}

	#[tokio::test]
	async fn test_unknown_record_leaves_identity_and_role_committed() {
		let (provisioner, pool) = make_provisioner().await;

		let err = provisioner
			.provision(student_request(RecordId::generate()))
			.await
			.unwrap_err();
		assert!(matches!(err, ProvisioningError::RecordNotFound(_)));

		// Steps 1-2 committed, step 3 aborted.
		assert_eq!(count_identities_for_email(&pool, "a@x.com").await, 1);
		let row = sqlx::query("SELECT id FROM users WHERE email = ?")
			.bind("a@x.com")
			.fetch_one(&pool)
			.await
			.unwrap();
		let user_id: String = row.get("id");
		let user_id = UserId::new(user_id.parse().unwrap());
		assert_eq!(count_assignments(&pool, &user_id, Role::Student).await, 1);
	}

	#[tokio::test]
	async fn test_retry_after_record_failure_converges() {
		let (provisioner, pool) = make_provisioner().await;

		provisioner
			.provision(student_request(RecordId::generate()))
			.await
			.unwrap_err();

		let record_id = RecordId::generate();
		insert_test_record(&pool, Role::Student, &record_id, "A One").await;
		let outcome = provisioner
			.provision(student_request(record_id))
			.await
			.unwrap();

		assert_eq!(outcome.status, ProvisionStatus::LinkedExisting);
		assert_eq!(count_identities_for_email(&pool, "a@x.com").await, 1);
		assert_eq!(count_assignments(&pool, &outcome.user_id, Role::Student).await, 1);

		let linked = fetch_record_user_id(&pool, Role::Student, &record_id).await;
		assert_eq!(linked.as_deref(), Some(outcome.user_id.to_string().as_str()));
	}

	#[tokio::test]
	async fn test_same_identity_can_gain_second_role() {
		let (provisioner, pool) = make_provisioner().await;
		let student_rec = RecordId::generate();
		insert_test_record(&pool, Role::Student, &student_rec, "A One").await;
		let faculty_rec = RecordId::generate();
		insert_test_record(&pool, Role::Faculty, &faculty_rec, "A One").await;

		let first = provisioner
			.provision(student_request(student_rec))
			.await
			.unwrap();

		let mut as_faculty = student_request(faculty_rec);
		as_faculty.role = Role::Faculty;
		let second = provisioner.provision(as_faculty).await.unwrap();

		assert_eq!(first.user_id, second.user_id);
		assert_eq!(count_assignments(&pool, &first.user_id, Role::Student).await, 1);
		assert_eq!(count_assignments(&pool, &first.user_id, Role::Faculty).await, 1);
	}

	#[tokio::test]
	async fn test_admin_role_rejected_before_any_mutation() {
		let (provisioner, pool) = make_provisioner().await;

		let mut request = student_request(RecordId::generate());
		request.role = Role::Admin;
		let err = provisioner.provision(request).await.unwrap_err();

		assert!(matches!(err, ProvisioningError::InvalidRequest(_)));
		assert_eq!(count_identities_for_email(&pool, "a@x.com").await, 0);
	}

	#[tokio::test]
	async fn test_empty_email_and_password_rejected() {
		let (provisioner, _pool) = make_provisioner().await;

		let mut request = student_request(RecordId::generate());
		request.email = String::new();
		assert!(matches!(
			provisioner.provision(request).await.unwrap_err(),
			ProvisioningError::InvalidRequest(_)
		));

		let mut request = student_request(RecordId::generate());
		request.password = String::new();
		assert!(matches!(
			provisioner.provision(request).await.unwrap_err(),
			ProvisioningError::InvalidRequest(_)
		));
	}

	#[tokio::test]
	async fn test_find_or_create_reconciles_lost_create_race() {
		let pool = create_provisioning_test_pool().await;
		let directory = DirectoryRepository::new(pool.clone());

		let winner = Identity::new("race@campus.edu", "Winner");
		directory.create_identity(&winner, "hash").await.unwrap();

		// First lookup misses (the concurrent insert lands after it), the
		// create then collides with the winner's row, and the re-lookup hits.
		let first_lookup = AtomicBool::new(true);
		let (found, created) = find_or_create(
			|| async {
				if first_lookup.swap(false, Ordering::SeqCst) {
					Ok(None)
				} else {
					directory.find_by_email("race@campus.edu").await
				}
			},
			|| async {
				let loser = Identity::new("race@campus.edu", "Loser");
				directory.create_identity(&loser, "hash").await?;
				Ok(loser)
			},
		)
		.await
		.unwrap();

		assert!(!created);
		assert_eq!(found.id, winner.id);
	}

	#[tokio::test]
	async fn test_find_or_create_propagates_when_relookup_misses() {
		let pool = create_provisioning_test_pool().await;
		let directory = DirectoryRepository::new(pool.clone());

		let winner = Identity::new("race@campus.edu", "Winner");
		directory.create_identity(&winner, "hash").await.unwrap();

		let result = find_or_create(
			|| async { Ok::<Option<Identity>, DbError>(None) },
			|| async {
				let loser = Identity::new("race@campus.edu", "Loser");
				directory.create_identity(&loser, "hash").await?;
				Ok(loser)
			},
		)
		.await;

		assert!(matches!(
			result,
			Err(ProvisioningError::Database(e)) if e.is_unique_violation()
		));
	}

	#[tokio::test]
	async fn test_find_or_create_propagates_other_create_errors() {
		let result: Result<(Identity, bool), ProvisioningError> = find_or_create(
			|| async { Ok::<Option<Identity>, DbError>(None) },
			|| async { Err(ProvisioningError::Database(DbError::Internal("boom".to_string()))) },
		)
		.await;

		assert!(matches!(
			result,
			Err(ProvisioningError::Database(DbError::Internal(_)))
		));
	}
}
