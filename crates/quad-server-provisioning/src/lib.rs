// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account provisioning for the Quad server.
//!
//! [`AccountProvisioner`] is the create-or-link routine behind the admin
//! "grant a login" flow: given an email, credential, role, and the ID of a
//! pre-existing student/faculty record, it ensures exactly one identity
//! exists for the email, ensures the identity holds the role exactly once,
//! and points the record at the identity. Every step is idempotent, so a
//! partially completed call is safe to re-run.

pub mod error;
pub mod service;

pub use error::ProvisioningError;
pub use service::{AccountProvisioner, ProvisionOutcome, ProvisionRequest, ProvisionStatus};
