// SPDX-License-Identifier: MIT

//! Phone verification routes used by the mobile app (no admin auth).

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/verify/send", post(send_code))
        .route("/api/verify/check", post(check_code))
}

#[derive(Deserialize, Validate)]
struct SendCodeRequest {
    #[validate(length(min = 6, message = "Phone number is too short"))]
    phone: String,
}

#[derive(Serialize)]
pub struct SendCodeResponse {
    pub success: bool,
    /// Normalized +359 number the code was issued for
    pub phone: String,
}

/// Issue a verification code for a phone number.
///
/// Demo mode: the code is logged instead of dispatched to an SMS gateway,
/// so it can be read from the server output during manual testing.
async fn send_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SendCodeRequest>,
) -> Result<Json<SendCodeResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    let (phone, code) = state.codes.issue(&payload.phone);

    tracing::info!(phone, code, "Demo SMS verification code issued");

    Ok(Json(SendCodeResponse {
        success: true,
        phone,
    }))
}

#[derive(Deserialize)]
struct CheckCodeRequest {
    phone: String,
    code: String,
}

#[derive(Serialize)]
pub struct CheckCodeResponse {
    pub success: bool,
    pub verified: bool,
}

/// Check a submitted verification code.
async fn check_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckCodeRequest>,
) -> Result<Json<CheckCodeResponse>> {
    match state.codes.consume(&payload.phone, &payload.code) {
        Ok(()) => Ok(Json(CheckCodeResponse {
            success: true,
            verified: true,
        })),
        Err(e) => Err(AppError::InvalidArgument(e.to_string())),
    }
}
