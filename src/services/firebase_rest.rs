// SPDX-License-Identifier: MIT

//! Thin Firestore REST client for the mobile proxy endpoints.
//!
//! The mobile app talks to Firestore over REST with the user's own ID
//! token. These endpoints keep that contract but speak plain JSON on the
//! app side; tagging and untagging happens through `db::codec`.

use crate::db::codec;
use crate::error::{AppError, Result};
use serde_json::{json, Map, Value};

/// Firestore REST client (pass-through auth).
#[derive(Clone)]
pub struct FirebaseRestClient {
    http: reqwest::Client,
    base_url: String,
}

impl FirebaseRestClient {
    pub fn new(project_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!(
                "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
                project_id
            ),
        }
    }

    /// Create a document with auto-generated ID. Returns the document name
    /// and its fields as native JSON.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: &Map<String, Value>,
        bearer: &str,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, collection);
        let body = json!({ "fields": codec::to_tagged_fields(fields) });

        let response = self
            .http
            .post(&url)
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Database(format!("Firestore REST request failed: {}", e)))?;

        let document = Self::check_response(response).await?;
        Self::document_to_native(&document)
    }

    /// Fetch a document by ID as native JSON.
    pub async fn get_document(&self, collection: &str, id: &str, bearer: &str) -> Result<Value> {
        let url = format!("{}/{}/{}", self.base_url, collection, id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| AppError::Database(format!("Firestore REST request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "Document {}/{} not found",
                collection, id
            )));
        }

        let document = Self::check_response(response).await?;
        Self::document_to_native(&document)
    }

    async fn check_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AppError::InvalidToken);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Database(format!(
                "Firestore REST returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("Invalid Firestore REST response: {}", e)))
    }

    fn document_to_native(document: &Value) -> Result<Value> {
        let name = document
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let fields = document
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Ok(json!({
            "name": name,
            "fields": codec::from_tagged_fields(&fields)?,
        }))
    }
}
