// SPDX-License-Identifier: MIT

//! Pure document verification state: aggregate summary and the Firestore
//! field paths touched by administrator decisions.

use crate::models::user::{DocumentKind, DocumentStatus, User};
use serde::Serialize;

/// Aggregate verification state across the three required documents.
///
/// The three counts always sum to 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSummary {
    pub all_approved: bool,
    pub pending_count: u32,
    pub approved_count: u32,
    pub rejected_count: u32,
}

/// Summarize a user's document statuses.
///
/// A missing `documentsStatus` map means the account never went through
/// migration; it reads as "not yet started", never as an error.
pub fn summarize(user: &User) -> VerificationSummary {
    let Some(statuses) = &user.documents_status else {
        return VerificationSummary {
            all_approved: false,
            pending_count: 3,
            approved_count: 0,
            rejected_count: 0,
        };
    };

    let mut pending_count = 0;
    let mut approved_count = 0;
    let mut rejected_count = 0;

    for status in statuses.values() {
        match status {
            DocumentStatus::Pending => pending_count += 1,
            DocumentStatus::Approved => approved_count += 1,
            DocumentStatus::Rejected => rejected_count += 1,
        }
    }

    VerificationSummary {
        all_approved: approved_count == 3,
        pending_count,
        approved_count,
        rejected_count,
    }
}

/// Dotted field paths touched by a single-document decision.
///
/// Dotted paths keep the update from overwriting sibling keys of the
/// nested maps.
pub fn decision_paths(kind: DocumentKind) -> [String; 3] {
    [
        format!("documentsStatus.{}", kind.field_name()),
        format!("documentsVerifiedAt.{}", kind.field_name()),
        format!("documentsRejectionReasons.{}", kind.field_name()),
    ]
}
