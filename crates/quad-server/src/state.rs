// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use quad_server_db::{DirectoryRepository, RecordRepository, RoleRepository};
use quad_server_provisioning::AccountProvisioner;
use sqlx::sqlite::SqlitePool;

/// Shared application state for the router.
#[derive(Clone)]
pub struct AppState {
	pub provisioner: Arc<AccountProvisioner>,
}

/// Build the application state from a database pool.
///
/// Constructed once at startup; the repositories and provisioner are
/// read-only handles after this point.
pub fn create_app_state(pool: SqlitePool) -> AppState {
	let provisioner = AccountProvisioner::new(
		Arc::new(DirectoryRepository::new(pool.clone())),
		Arc::new(RoleRepository::new(pool.clone())),
		Arc::new(RecordRepository::new(pool)),
	);

	AppState {
		provisioner: Arc::new(provisioner),
	}
}
