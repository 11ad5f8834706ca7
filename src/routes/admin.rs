// SPDX-License-Identifier: MIT

//! Admin panel API routes (require authentication via JWT).
//! The auth middleware is applied in routes/mod.rs for these routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthAdmin;
use crate::models::user::{AccountStatus, CompanyInfo, DocumentKind, User};
use crate::models::verification::{summarize, VerificationSummary};
use crate::services::MigrationReport;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{uid}", patch(update_user).delete(delete_user))
        .route(
            "/api/users/{uid}/documents/{kind}/approve",
            post(approve_document),
        )
        .route(
            "/api/users/{uid}/documents/{kind}/reject",
            post(reject_document),
        )
        .route(
            "/api/users/{uid}/documents/approve-all",
            post(approve_all_documents),
        )
        .route("/api/users/{uid}/approve", post(approve_driver))
        .route("/api/users/{uid}/reject", post(reject_driver))
        .route("/api/users/{uid}/toggle-active", post(toggle_active))
        .route(
            "/api/users/{uid}/toggle-phone-verified",
            post(toggle_phone_verified),
        )
        .route("/api/migrate", post(run_migration))
        .route("/api/documents/url", get(document_url))
}

// ─── User Listing ────────────────────────────────────────────

/// One user row with its derived verification summary.
#[derive(Serialize)]
pub struct UserEntry {
    #[serde(flatten)]
    pub user: User,
    pub verification: VerificationSummary,
}

#[derive(Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserEntry>,
    pub total: usize,
}

/// List all users for the admin table, newest first.
///
/// Sorted here rather than in the query: a Firestore order-by would drop
/// legacy records that lack `createdAt` entirely.
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<UserListResponse>> {
    let mut users = state.db.list_users().await?;
    users.sort_by(|a, b| {
        let a_time = a.created_at.as_ref().map(|t| t.0);
        let b_time = b.created_at.as_ref().map(|t| t.0);
        b_time.cmp(&a_time)
    });

    let entries: Vec<UserEntry> = users
        .into_iter()
        .map(|user| UserEntry {
            verification: summarize(&user),
            user,
        })
        .collect();

    let total = entries.len();
    Ok(Json(UserListResponse {
        users: entries,
        total,
    }))
}

// ─── Profile Updates ─────────────────────────────────────────

/// Profile fields the admin panel may patch directly. Anything else
/// (notably the nested document maps) is rejected, so the verification
/// engine stays the single writer of decision state and no wrongly-typed
/// value can reach storage.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProfilePatch {
    full_name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    phone_verified: Option<bool>,
    is_active: Option<bool>,
    status: Option<AccountStatus>,
    company_info: Option<CompanyInfo>,
}

/// Partially update a user's profile fields.
///
/// The field mask is the set of keys present in the request body; the
/// typed patch guarantees each of them carries a legal value.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<SuccessResponse>> {
    let fields = body
        .as_object()
        .ok_or_else(|| AppError::InvalidArgument("Request body must be an object".to_string()))?;

    if fields.is_empty() {
        return Err(AppError::InvalidArgument(
            "No fields to update".to_string(),
        ));
    }

    let paths: Vec<String> = fields.keys().cloned().collect();
    let patch: ProfilePatch = serde_json::from_value(body)
        .map_err(|e| AppError::InvalidArgument(format!("Invalid update: {}", e)))?;

    if state.db.get_user(&uid).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", uid)));
    }

    state.db.update_user_fields(&uid, &patch, paths).await?;

    Ok(Json(SuccessResponse { success: true }))
}

// ─── Document Decisions ──────────────────────────────────────

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Decision response with the refreshed summary for the admin table.
#[derive(Serialize)]
pub struct DecisionResponse {
    pub success: bool,
    pub verification: VerificationSummary,
}

async fn decision_response(state: &AppState, uid: &str) -> Result<Json<DecisionResponse>> {
    let user = state
        .db
        .get_user(uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;

    Ok(Json(DecisionResponse {
        success: true,
        verification: summarize(&user),
    }))
}

/// Approve a single document.
async fn approve_document(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Path((uid, kind)): Path<(String, String)>,
) -> Result<Json<DecisionResponse>> {
    let kind: DocumentKind = kind.parse()?;

    tracing::info!(uid, kind = %kind, admin = %admin.subject, "Admin approving document");
    state.verification.approve_document(&uid, kind).await?;

    decision_response(&state, &uid).await
}

#[derive(Deserialize, Validate)]
struct RejectRequest {
    #[validate(length(min = 1, message = "Rejection reason must not be empty"))]
    reason: String,
}

/// Reject a single document with a reason.
async fn reject_document(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Path((uid, kind)): Path<(String, String)>,
    Json(payload): Json<RejectRequest>,
) -> Result<Json<DecisionResponse>> {
    let kind: DocumentKind = kind.parse()?;
    payload
        .validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    tracing::info!(uid, kind = %kind, admin = %admin.subject, "Admin rejecting document");
    state
        .verification
        .reject_document(&uid, kind, &payload.reason)
        .await?;

    decision_response(&state, &uid).await
}

/// Approve all three documents and activate the driver.
async fn approve_all_documents(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Path(uid): Path<String>,
) -> Result<Json<DecisionResponse>> {
    tracing::info!(uid, admin = %admin.subject, "Admin approving all documents");
    state.verification.approve_all_documents(&uid).await?;

    decision_response(&state, &uid).await
}

// ─── Account-Level Operations ────────────────────────────────

async fn approve_driver(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Path(uid): Path<String>,
) -> Result<Json<SuccessResponse>> {
    tracing::info!(uid, admin = %admin.subject, "Admin approving driver account");
    state.verification.approve_driver(&uid).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn reject_driver(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Path(uid): Path<String>,
) -> Result<Json<SuccessResponse>> {
    tracing::info!(uid, admin = %admin.subject, "Admin rejecting driver account");
    state.verification.reject_driver(&uid).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub value: bool,
}

async fn toggle_active(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<ToggleResponse>> {
    let value = state.verification.toggle_active(&uid).await?;
    Ok(Json(ToggleResponse {
        success: true,
        value,
    }))
}

async fn toggle_phone_verified(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<ToggleResponse>> {
    let value = state.verification.toggle_phone_verified(&uid).await?;
    Ok(Json(ToggleResponse {
        success: true,
        value,
    }))
}

// ─── Account Deletion ────────────────────────────────────────

#[derive(Serialize)]
pub struct DeleteUserResponse {
    pub success: bool,
    /// Storage objects that were removed
    pub deleted_files: u32,
}

/// Delete a user and their uploaded documents.
///
/// Storage cleanup is best-effort: a file that cannot be removed is logged
/// and skipped, then the user document is deleted regardless. The panel
/// supplies a Google OAuth token for the bucket in `x-storage-token`;
/// without it the objects are left behind for a later sweep.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteUserResponse>> {
    let user = state
        .db
        .get_user(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;

    tracing::info!(uid, admin = %admin.subject, "Admin deleting user");

    let storage_token = headers
        .get("x-storage-token")
        .and_then(|h| h.to_str().ok());

    let mut deleted_files = 0;
    if let Some(documents) = &user.documents {
        match storage_token {
            Some(token) => {
                for object in documents.values() {
                    match state.storage.delete(object, token).await {
                        Ok(()) => deleted_files += 1,
                        Err(e) => {
                            tracing::warn!(uid, object = %object, error = %e, "Failed to delete document file, continuing");
                        }
                    }
                }
            }
            None => {
                tracing::warn!(uid, "No storage token supplied, leaving document files behind");
            }
        }
    }

    state.db.delete_user(&uid).await?;

    Ok(Json(DeleteUserResponse {
        success: true,
        deleted_files,
    }))
}

// ─── Migration ───────────────────────────────────────────────

/// Run the legacy-account migration and report what changed.
async fn run_migration(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
) -> Result<Json<MigrationReport>> {
    tracing::info!(admin = %admin.subject, "Admin triggered migration");
    let report = state.verification.migrate().await?;
    Ok(Json(report))
}

// ─── Document URLs ───────────────────────────────────────────

#[derive(Deserialize)]
struct DocumentUrlQuery {
    file: String,
}

#[derive(Serialize)]
pub struct DocumentUrlResponse {
    pub url: String,
}

/// Resolve a stored object name to a viewable URL.
async fn document_url(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DocumentUrlQuery>,
) -> Result<Json<DocumentUrlResponse>> {
    if params.file.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "file parameter must not be empty".to_string(),
        ));
    }

    let url = state.storage.resolve_url(&params.file).await?;
    Ok(Json(DocumentUrlResponse { url }))
}
