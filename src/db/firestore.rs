// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for the `users` collection: typed reads,
//! full upserts, masked partial updates, and deletion. Partial updates take
//! an explicit field-path mask (dotted paths allowed) so decisions on one
//! document never overwrite sibling keys, and multi-field decisions land as
//! a single atomic write.

use crate::db::collections;
use crate::error::AppError;
use crate::models::User;
use firestore::FirestoreTimestamp;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their auth UID.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get every user document.
    ///
    /// Deliberately unordered: Firestore drops documents missing the
    /// ordered-by field from the result set, and legacy records lack
    /// `createdAt`. Callers that need an order sort in memory.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a user document.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Apply a partial update to a user document.
    ///
    /// Only the fields named in `field_paths` are written; the whole mask
    /// lands in one write, so readers never observe a torn update. Dotted
    /// paths such as `documentsStatus.driverPhoto` update a single key of a
    /// nested map without touching its siblings.
    pub async fn update_user_fields<T>(
        &self,
        uid: &str,
        patch: &T,
        field_paths: Vec<String>,
    ) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(field_paths)
            .in_col(collections::USERS)
            .document_id(uid)
            .object(patch)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a user document.
    ///
    /// The caller is responsible for removing the user's uploaded storage
    /// objects first; once the document is gone they are unreachable.
    pub async fn delete_user(&self, uid: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(uid)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(uid, "User document deleted");
        Ok(())
    }

    // ─── Connectivity Probe ──────────────────────────────────────

    /// Write and read back a probe document to verify connectivity.
    ///
    /// Returns the probe timestamp that was stored.
    pub async fn connectivity_check(&self) -> Result<FirestoreTimestamp, AppError> {
        let probe = ConnectivityProbe {
            timestamp: FirestoreTimestamp(chrono::Utc::now()),
            test: true,
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TEST)
            .document_id("connection")
            .object(&probe)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let stored: Option<ConnectivityProbe> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TEST)
            .obj()
            .one("connection")
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        stored
            .map(|p| p.timestamp)
            .ok_or_else(|| AppError::Database("Probe document missing after write".to_string()))
    }
}

/// Probe document stored at `test/connection`.
#[derive(Debug, Serialize, Deserialize)]
struct ConnectivityProbe {
    timestamp: FirestoreTimestamp,
    test: bool,
}
