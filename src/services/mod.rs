// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod firebase_rest;
pub mod sms;
pub mod storage;
pub mod verification;

pub use firebase_rest::FirebaseRestClient;
pub use sms::VerificationCodeStore;
pub use storage::StorageService;
pub use verification::{MigrationReport, VerificationService};
