// SPDX-License-Identifier: MIT

//! User model for storage and the admin API.
//!
//! Field names are camelCase on the wire to match the Firestore schema the
//! mobile app already writes (`users` collection, keyed by auth UID).

use crate::error::AppError;
use firestore::FirestoreTimestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three documents every driver must submit.
///
/// The set is closed: there are exactly three kinds and they are always
/// co-present in the nested per-document maps once an account is migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    RoadsideAssistanceCert,
    IaalaLicense,
    DriverPhoto,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::RoadsideAssistanceCert,
        DocumentKind::IaalaLicense,
        DocumentKind::DriverPhoto,
    ];

    /// Wire/field name of this kind inside the nested document maps.
    pub fn field_name(&self) -> &'static str {
        match self {
            DocumentKind::RoadsideAssistanceCert => "roadsideAssistanceCert",
            DocumentKind::IaalaLicense => "iaalaLicense",
            DocumentKind::DriverPhoto => "driverPhoto",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for DocumentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roadsideAssistanceCert" => Ok(DocumentKind::RoadsideAssistanceCert),
            "iaalaLicense" => Ok(DocumentKind::IaalaLicense),
            "driverPhoto" => Ok(DocumentKind::DriverPhoto),
            other => Err(AppError::InvalidArgument(format!(
                "Unknown document kind: {}",
                other
            ))),
        }
    }
}

/// Verification status of a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

/// Account-level status, distinct from per-document statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Approved,
    Rejected,
}

/// Account type. Only drivers carry document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Client,
    Driver,
}

/// Fixed three-key record, one value per required document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSet<T> {
    pub roadside_assistance_cert: T,
    pub iaala_license: T,
    pub driver_photo: T,
}

impl<T> DocumentSet<T> {
    pub fn get(&self, kind: DocumentKind) -> &T {
        match kind {
            DocumentKind::RoadsideAssistanceCert => &self.roadside_assistance_cert,
            DocumentKind::IaalaLicense => &self.iaala_license,
            DocumentKind::DriverPhoto => &self.driver_photo,
        }
    }

    pub fn get_mut(&mut self, kind: DocumentKind) -> &mut T {
        match kind {
            DocumentKind::RoadsideAssistanceCert => &mut self.roadside_assistance_cert,
            DocumentKind::IaalaLicense => &mut self.iaala_license,
            DocumentKind::DriverPhoto => &mut self.driver_photo,
        }
    }

    pub fn values(&self) -> [&T; 3] {
        [
            &self.roadside_assistance_cert,
            &self.iaala_license,
            &self.driver_photo,
        ]
    }
}

impl<T: Clone> DocumentSet<T> {
    /// A set with the same value under every key.
    pub fn filled(value: T) -> Self {
        Self {
            roadside_assistance_cert: value.clone(),
            iaala_license: value.clone(),
            driver_photo: value,
        }
    }
}

/// Company details supplied by drivers at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub bulstat: String,
}

/// User document stored in Firestore.
///
/// The `Option` fields are absent on legacy records; the migration in
/// `services::verification` backfills them for drivers. A missing
/// `documentsStatus` map reads as all-pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Auth UID (also used as document ID)
    pub uid: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_verified: Option<bool>,
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<FirestoreTimestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_info: Option<CompanyInfo>,
    /// Storage object names of the uploaded files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<DocumentSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_status: Option<DocumentSet<DocumentStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_verified_at: Option<DocumentSet<Option<FirestoreTimestamp>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_rejection_reasons: Option<DocumentSet<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl User {
    pub fn is_driver(&self) -> bool {
        self.user_type == UserType::Driver
    }
}

/// Partial user update written with an explicit field mask.
///
/// Every masked path must have a value here; fields outside the mask are
/// serialized but never applied, so the `None` defaults are harmless.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub phone_verified: Option<bool>,
    pub is_active: Option<bool>,
    pub status: Option<AccountStatus>,
    pub documents_status: Option<DocumentSet<DocumentStatus>>,
    pub documents_verified_at: Option<DocumentSet<Option<FirestoreTimestamp>>>,
    pub documents_rejection_reasons: Option<DocumentSet<Option<String>>>,
}
