// SPDX-License-Identifier: MIT

//! Roadside-Admin: backend API for the roadside assistance admin panel.
//!
//! This crate reviews driver verification documents, aggregates their
//! status, and serves the mobile app's upload and phone-verification
//! endpoints.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{FirebaseRestClient, StorageService, VerificationCodeStore, VerificationService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub storage: StorageService,
    pub firebase_rest: FirebaseRestClient,
    pub verification: VerificationService,
    pub codes: VerificationCodeStore,
}
