// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request handlers for the provisioning API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quad_server_auth::{RecordId, Role, UserId};
use quad_server_provisioning::{ProvisionRequest, ProvisionStatus, ProvisioningError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

/// Body of `POST /api/accounts/provision`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionAccountRequest {
	pub email: String,
	pub password: String,
	pub full_name: String,
	pub role: Role,
	pub record_id: RecordId,
}

/// Success body for `POST /api/accounts/provision`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionAccountResponse {
	pub success: bool,
	pub user_id: UserId,
	pub message: String,
}

/// Error body: a single flat message.
///
/// The admin UI displays this text as-is in a notification; there is no
/// structured error code for callers to branch on.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	#[error(transparent)]
	Provisioning(#[from] ProvisioningError),
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let ApiError::Provisioning(e) = self;
		let message = e.to_string();
		warn!(error = %message, "provisioning request failed");
		(
			StatusCode::BAD_REQUEST,
			Json(ErrorResponse { error: message }),
		)
			.into_response()
	}
}

/// Create-or-link a login account for a student or faculty record.
pub async fn provision_account(
	State(state): State<AppState>,
	Json(body): Json<ProvisionAccountRequest>,
) -> Result<Json<ProvisionAccountResponse>, ApiError> {
	let outcome = state
		.provisioner
		.provision(ProvisionRequest {
			email: body.email,
			password: body.password,
			full_name: body.full_name,
			role: body.role,
			record_id: body.record_id,
		})
		.await?;

	let message = match outcome.status {
		ProvisionStatus::CreatedNew => "account created and linked".to_string(),
		ProvisionStatus::LinkedExisting => {
			"existing account linked; stored credential kept".to_string()
		}
	};

	Ok(Json(ProvisionAccountResponse {
		success: true,
		user_id: outcome.user_id,
		message,
	}))
}

/// Liveness probe for the admin UI.
pub async fn health() -> Json<serde_json::Value> {
	Json(json!({ "status": "ok" }))
}
