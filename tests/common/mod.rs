// SPDX-License-Identifier: MIT

use roadside_admin::config::Config;
use roadside_admin::db::FirestoreDb;
use roadside_admin::middleware::auth::create_jwt;
use roadside_admin::routes::create_router;
use roadside_admin::services::{
    FirebaseRestClient, StorageService, VerificationCodeStore, VerificationService,
};
use roadside_admin::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(test_db_offline())
}

/// Create a test app backed by a specific database (e.g. the emulator).
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let storage = StorageService::new(&config.storage_bucket);
    let firebase_rest = FirebaseRestClient::new(&config.gcp_project_id);
    let verification = VerificationService::new(db.clone());
    let codes = VerificationCodeStore::new(config.sms_code_ttl_minutes);

    let state = Arc::new(AppState {
        config,
        db,
        storage,
        firebase_rest,
        verification,
        codes,
    });

    (create_router(state.clone()), state)
}

/// Mint a valid admin session token for the test signing key.
#[allow(dead_code)]
pub fn create_test_jwt() -> String {
    let config = Config::test_default();
    create_jwt("admin@test.local", &config.jwt_signing_key).expect("Failed to create test JWT")
}
