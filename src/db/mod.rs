// SPDX-License-Identifier: MIT

//! Database layer (Firestore).

pub mod codec;
pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Base64 image fallback documents written by the upload proxy
    pub const IMAGE_UPLOADS: &str = "image_uploads";
    /// Connectivity probe documents
    pub const TEST: &str = "test";
}
