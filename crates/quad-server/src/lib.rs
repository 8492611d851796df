// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP surface for Quad college administration.
//!
//! The server exposes a single state-changing endpoint - the account
//! provisioning call used by the admin UI to grant a login to an existing
//! student or faculty record - plus a liveness probe. CORS is wide open
//! (the admin SPA is served from a different origin), so pre-flight
//! `OPTIONS` requests are answered by the CORS layer before any handler or
//! storage dependency is touched.

pub mod api;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{create_app_state, AppState};
