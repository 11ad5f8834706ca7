// SPDX-License-Identifier: MIT

//! Cloud Storage access for uploaded driver documents.
//!
//! Uploads and deletes go through the Storage JSON API with the caller's
//! bearer token passed through, matching how the mobile app talks to the
//! bucket directly. Uploaded objects are publicly readable, so URL
//! resolution is a plain HTTPS URL plus an existence probe.

use crate::error::{AppError, Result};

/// Placeholder shown for seeded demo/mock document records.
const DEMO_PLACEHOLDER_URL: &str =
    "https://via.placeholder.com/300x200/0066CC/FFFFFF?text=Demo+Document";

/// Cloud Storage client for the document bucket.
#[derive(Clone)]
pub struct StorageService {
    http: reqwest::Client,
    bucket: String,
}

impl StorageService {
    pub fn new(bucket: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            bucket: bucket.to_string(),
        }
    }

    /// Public download URL for an object.
    pub fn public_url(&self, object: &str) -> String {
        format!("https://storage.googleapis.com/{}/{}", self.bucket, object)
    }

    /// Resolve a stored object name to a viewable URL.
    ///
    /// Demo/mock object names (from seeded test data) resolve to a
    /// placeholder image. A missing object is `NotFound`.
    pub async fn resolve_url(&self, object: &str) -> Result<String> {
        if object.contains("demo") || object.contains("mock") {
            tracing::debug!(object, "Demo object, returning placeholder URL");
            return Ok(DEMO_PLACEHOLDER_URL.to_string());
        }

        let url = self.public_url(object);
        let response = self
            .http
            .head(&url)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Existence check failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "Document file {} not found",
                object
            )));
        }
        if !response.status().is_success() {
            return Err(AppError::Storage(format!(
                "Existence check for {} returned {}",
                object,
                response.status()
            )));
        }

        Ok(url)
    }

    /// Upload bytes as a new object, using the caller's bearer token.
    ///
    /// Returns the public URL of the uploaded object.
    pub async fn upload(
        &self,
        object: &str,
        content_type: &str,
        bytes: Vec<u8>,
        bearer: &str,
    ) -> Result<String> {
        let url = format!(
            "https://storage.googleapis.com/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.bucket,
            urlencoding::encode(object)
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(bearer)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Upload of {} returned {}: {}",
                object, status, body
            )));
        }

        tracing::info!(object, "Uploaded document to storage");
        Ok(self.public_url(object))
    }

    /// Delete an object, using the caller's bearer token.
    pub async fn delete(&self, object: &str, bearer: &str) -> Result<()> {
        let url = format!(
            "https://storage.googleapis.com/storage/v1/b/{}/o/{}",
            self.bucket,
            urlencoding::encode(object)
        );

        let response = self
            .http
            .delete(&url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Delete request failed: {}", e)))?;

        let status = response.status();
        // Treat already-gone as success; deletion is retried by admins
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::Storage(format!(
                "Delete of {} returned {}",
                object, status
            )));
        }

        Ok(())
    }
}
