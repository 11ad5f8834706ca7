// SPDX-License-Identifier: MIT

//! Mobile-facing proxy routes: document upload and Firestore REST
//! pass-through. Auth is the caller's own Firebase token, forwarded as-is;
//! the admin JWT middleware does not apply here.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/upload", post(upload_document))
        .route("/api/save-image", post(save_image))
        .route("/api/proxy/documents/{collection}", post(proxy_create))
        .route(
            "/api/proxy/documents/{collection}/{id}",
            get(proxy_get),
        )
        .route("/api/test-firebase", get(test_firebase))
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)
}

/// Firestore collection IDs from the path; keeps the proxy from being
/// aimed at arbitrary URLs.
fn validate_collection(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !ok {
        return Err(AppError::InvalidArgument(format!(
            "Invalid collection name: {}",
            name
        )));
    }
    Ok(())
}

// ─── Upload ──────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// Object name under the bucket, stored in the user's document map
    pub file_name: String,
    pub url: String,
}

/// Upload a document image from the mobile app.
///
/// Expects a multipart body with a `file` field. The object is stored
/// under `uploads/` with a timestamp prefix so repeated uploads of the
/// same filename never collide.
async fn upload_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let bearer = extract_bearer(&headers)?.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidArgument(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("document")
            .replace(['/', '\\'], "_");
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidArgument(format!("Failed to read upload: {}", e)))?;

        if bytes.is_empty() {
            return Err(AppError::InvalidArgument(
                "Uploaded file is empty".to_string(),
            ));
        }

        let object = format!("uploads/{}_{}", chrono::Utc::now().timestamp_millis(), filename);
        let url = state
            .storage
            .upload(&object, &content_type, bytes.to_vec(), &bearer)
            .await?;

        return Ok(Json(UploadResponse {
            success: true,
            file_name: object,
            url,
        }));
    }

    Err(AppError::InvalidArgument(
        "Missing multipart field: file".to_string(),
    ))
}

#[derive(Deserialize)]
struct SaveImageRequest {
    /// Data-URI or raw base64 payload
    image: String,
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Serialize)]
pub struct SaveImageResponse {
    pub success: bool,
    /// Firestore document name holding the image
    pub name: String,
}

/// Fallback image save: store a base64 payload as a Firestore document.
///
/// Used by app builds that cannot reach the storage bucket directly. The
/// payload lands in the `image_uploads` collection with the caller's own
/// token, so security rules still apply.
async fn save_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SaveImageRequest>,
) -> Result<Json<SaveImageResponse>> {
    let bearer = extract_bearer(&headers)?;

    if payload.image.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "image payload must not be empty".to_string(),
        ));
    }

    let mut fields = Map::new();
    fields.insert("image".to_string(), Value::String(payload.image));
    fields.insert(
        "filename".to_string(),
        Value::String(payload.filename.unwrap_or_else(|| "document".to_string())),
    );
    fields.insert(
        "uploadedAt".to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );

    let document = state
        .firebase_rest
        .create_document(crate::db::collections::IMAGE_UPLOADS, &fields, bearer)
        .await?;

    let name = document
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(Json(SaveImageResponse {
        success: true,
        name,
    }))
}

// ─── Firestore REST Pass-Through ─────────────────────────────

/// Create a document in a collection (plain JSON in, plain JSON out).
async fn proxy_create(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    validate_collection(&collection)?;
    let bearer = extract_bearer(&headers)?;

    let fields: &Map<String, Value> = body
        .as_object()
        .ok_or_else(|| AppError::InvalidArgument("Request body must be an object".to_string()))?;

    let document = state
        .firebase_rest
        .create_document(&collection, fields, bearer)
        .await?;

    Ok(Json(document))
}

/// Fetch a document by ID.
async fn proxy_get(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    validate_collection(&collection)?;
    let bearer = extract_bearer(&headers)?;

    let document = state
        .firebase_rest
        .get_document(&collection, &id, bearer)
        .await?;

    Ok(Json(document))
}

// ─── Connectivity ────────────────────────────────────────────

#[derive(Serialize)]
pub struct TestFirebaseResponse {
    pub success: bool,
    pub message: String,
}

/// Write-then-read probe against Firestore, for deploy smoke checks.
async fn test_firebase(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TestFirebaseResponse>> {
    state.db.connectivity_check().await?;

    Ok(Json(TestFirebaseResponse {
        success: true,
        message: "Firestore connection OK".to_string(),
    }))
}
