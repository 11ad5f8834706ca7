// SPDX-License-Identifier: MIT

//! Roadside-Admin API Server
//!
//! Backend for the roadside assistance admin panel: driver document
//! verification, status aggregation, account migration, and the mobile
//! app's upload and phone-verification endpoints.

use roadside_admin::{
    config::Config,
    db::FirestoreDb,
    services::{FirebaseRestClient, StorageService, VerificationCodeStore, VerificationService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Roadside-Admin API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let storage = StorageService::new(&config.storage_bucket);
    tracing::info!(bucket = %config.storage_bucket, "Storage service initialized");

    let firebase_rest = FirebaseRestClient::new(&config.gcp_project_id);
    let verification = VerificationService::new(db.clone());
    let codes = VerificationCodeStore::new(config.sms_code_ttl_minutes);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        storage,
        firebase_rest,
        verification,
        codes,
    });

    // Build router
    let app = roadside_admin::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("roadside_admin=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
