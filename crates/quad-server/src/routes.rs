// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	routing::{get, post},
	Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::state::AppState;

/// Build the application router.
///
/// The wildcard CORS layer is part of the API contract (the admin SPA is
/// served from another origin) and sits outside the routes, so pre-flight
/// `OPTIONS` requests are answered without reaching a handler.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(api::health))
		.route("/api/accounts/provision", post(api::provision_account))
		.with_state(state)
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		)
}
