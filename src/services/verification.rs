// SPDX-License-Identifier: MIT

//! Document verification engine.
//!
//! Owns the per-driver document approval state:
//! - individual approve/reject decisions per document kind
//! - the bulk approve-all override that also activates the account
//! - account-level status changes and toggles used by the admin panel
//! - the one-time schema migration for legacy accounts
//!
//! Every mutating operation lands as a single masked Firestore write, so a
//! reader never observes a torn update: a rejected document always carries
//! its reason, an approved or pending one never does.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::user::{
    AccountStatus, DocumentKind, DocumentSet, DocumentStatus, User, UserPatch,
};
use crate::models::verification::decision_paths;
use firestore::FirestoreTimestamp;
use futures_util::{stream, StreamExt};
use serde::Serialize;

const MAX_CONCURRENT_MIGRATIONS: usize = 10;

/// The verification engine. Stateless over Firestore.
#[derive(Clone)]
pub struct VerificationService {
    db: FirestoreDb,
}

impl VerificationService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Fetch an account and require it to be a driver.
    async fn get_driver(&self, uid: &str) -> Result<User> {
        let user = self
            .db
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;

        if !user.is_driver() {
            return Err(AppError::InvalidArgument(format!(
                "User {} is not a driver account",
                uid
            )));
        }

        Ok(user)
    }

    // ─── Per-Document Decisions ──────────────────────────────────

    /// Approve one document: status approved, verified-at stamped, reason
    /// cleared. Idempotent; re-approving only re-stamps the timestamp.
    /// Never touches account-level `status` or `isActive`.
    pub async fn approve_document(&self, uid: &str, kind: DocumentKind) -> Result<()> {
        let user = self.get_driver(uid).await?;

        self.write_decision(&user, kind, DocumentStatus::Approved, None)
            .await?;

        tracing::info!(uid, kind = %kind, "Document approved");
        Ok(())
    }

    /// Reject one document with a mandatory reason.
    ///
    /// A blank reason is an input-contract violation and fails before any
    /// I/O, leaving stored state untouched.
    pub async fn reject_document(&self, uid: &str, kind: DocumentKind, reason: &str) -> Result<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::InvalidArgument(
                "Rejection reason must not be empty".to_string(),
            ));
        }

        let user = self.get_driver(uid).await?;

        self.write_decision(&user, kind, DocumentStatus::Rejected, Some(reason.to_string()))
            .await?;

        tracing::info!(uid, kind = %kind, reason, "Document rejected");
        Ok(())
    }

    /// Land one decision as a single masked write.
    async fn write_decision(
        &self,
        user: &User,
        kind: DocumentKind,
        status: DocumentStatus,
        reason: Option<String>,
    ) -> Result<()> {
        let (patch, paths) = decision_patch(
            user.documents_status.is_some(),
            kind,
            status,
            FirestoreTimestamp(chrono::Utc::now()),
            reason,
        );
        self.db.update_user_fields(&user.uid, &patch, paths).await
    }

    /// Approve all three documents and activate the account, atomically.
    ///
    /// Unconditional: already-approved documents are re-stamped and prior
    /// rejections are overridden (deliberate administrative override). This
    /// is the only operation that links document state to account state.
    pub async fn approve_all_documents(&self, uid: &str) -> Result<()> {
        self.get_driver(uid).await?;

        let now = FirestoreTimestamp(chrono::Utc::now());
        let patch = UserPatch {
            documents_status: Some(DocumentSet::filled(DocumentStatus::Approved)),
            documents_verified_at: Some(DocumentSet::filled(Some(now))),
            documents_rejection_reasons: Some(DocumentSet::filled(None)),
            status: Some(AccountStatus::Approved),
            is_active: Some(true),
            ..Default::default()
        };

        // The key set of the nested maps is closed, so replacing the whole
        // maps is exactly equivalent to listing all nine dotted paths.
        let paths = vec![
            "documentsStatus".to_string(),
            "documentsVerifiedAt".to_string(),
            "documentsRejectionReasons".to_string(),
            "status".to_string(),
            "isActive".to_string(),
        ];

        self.db.update_user_fields(uid, &patch, paths).await?;

        tracing::info!(uid, "All documents approved, account activated");
        Ok(())
    }

    // ─── Account-Level Operations ────────────────────────────────

    /// Approve a driver account without touching document statuses.
    pub async fn approve_driver(&self, uid: &str) -> Result<()> {
        self.get_driver(uid).await?;
        self.set_account_state(uid, AccountStatus::Approved, true)
            .await
    }

    /// Reject a driver account and deactivate it.
    pub async fn reject_driver(&self, uid: &str) -> Result<()> {
        self.get_driver(uid).await?;
        self.set_account_state(uid, AccountStatus::Rejected, false)
            .await
    }

    async fn set_account_state(
        &self,
        uid: &str,
        status: AccountStatus,
        is_active: bool,
    ) -> Result<()> {
        let patch = UserPatch {
            status: Some(status),
            is_active: Some(is_active),
            ..Default::default()
        };
        self.db
            .update_user_fields(
                uid,
                &patch,
                vec!["status".to_string(), "isActive".to_string()],
            )
            .await?;

        tracing::info!(uid, status = ?status, is_active, "Account status updated");
        Ok(())
    }

    /// Flip whether the user may currently receive job assignments.
    /// Returns the new value.
    pub async fn toggle_active(&self, uid: &str) -> Result<bool> {
        let user = self
            .db
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;

        let new_value = !user.is_active.unwrap_or(false);
        let patch = UserPatch {
            is_active: Some(new_value),
            ..Default::default()
        };
        self.db
            .update_user_fields(uid, &patch, vec!["isActive".to_string()])
            .await?;

        Ok(new_value)
    }

    /// Flip the phone verification flag. Returns the new value.
    pub async fn toggle_phone_verified(&self, uid: &str) -> Result<bool> {
        let user = self
            .db
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;

        let new_value = !user.phone_verified.unwrap_or(false);
        let patch = UserPatch {
            phone_verified: Some(new_value),
            ..Default::default()
        };
        self.db
            .update_user_fields(uid, &patch, vec!["phoneVerified".to_string()])
            .await?;

        Ok(new_value)
    }

    // ─── Migration ───────────────────────────────────────────────

    /// Backfill document fields for legacy driver accounts.
    ///
    /// Drivers missing `documentsStatus` get the three maps initialized to
    /// all-pending/all-null, plus defaults for `phoneVerified`, `isActive`
    /// and `status` where those are absent. Non-drivers and already
    /// migrated drivers are untouched, which makes the whole scan safe to
    /// re-run. A failure on one account is recorded and never aborts the
    /// rest.
    pub async fn migrate(&self) -> Result<MigrationReport> {
        let users = self.db.list_users().await?;
        let mut report = MigrationReport {
            processed: users.len() as u32,
            ..Default::default()
        };

        let candidates: Vec<User> = users
            .into_iter()
            .filter(|user| user.is_driver() && user.documents_status.is_none())
            .collect();

        let outcomes: Vec<(String, Result<()>)> = stream::iter(candidates)
            .map(|user| async move {
                let outcome = self.migrate_user(&user).await;
                (user.uid, outcome)
            })
            .buffer_unordered(MAX_CONCURRENT_MIGRATIONS)
            .collect()
            .await;

        for (uid, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    report.updated += 1;
                    tracing::debug!(uid = %uid, "Migrated driver account");
                }
                Err(e) => {
                    tracing::warn!(uid = %uid, error = %e, "Migration failed for user, continuing");
                    report.errors.push(MigrationFailure {
                        uid,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            updated = report.updated,
            failed = report.errors.len(),
            "Migration complete"
        );

        Ok(report)
    }

    async fn migrate_user(&self, user: &User) -> Result<()> {
        let mut paths = vec![
            "documentsStatus".to_string(),
            "documentsVerifiedAt".to_string(),
            "documentsRejectionReasons".to_string(),
        ];

        let mut patch = UserPatch {
            documents_status: Some(DocumentSet::filled(DocumentStatus::Pending)),
            documents_verified_at: Some(DocumentSet::filled(None)),
            documents_rejection_reasons: Some(DocumentSet::filled(None)),
            ..Default::default()
        };

        if user.phone_verified.is_none() {
            patch.phone_verified = Some(false);
            paths.push("phoneVerified".to_string());
        }
        // Pre-existing drivers were vetted manually before this schema
        // existed, so they stay active.
        if user.is_active.is_none() {
            patch.is_active = Some(true);
            paths.push("isActive".to_string());
        }
        if user.status.is_none() {
            patch.status = Some(AccountStatus::Pending);
            paths.push("status".to_string());
        }

        self.db.update_user_fields(&user.uid, &patch, paths).await
    }
}

/// Build the patch and field mask for a single-document decision.
///
/// A migrated driver gets a dotted three-path mask touching only the
/// decided key. A driver whose nested maps are still absent gets the full
/// three-key maps written under top-level paths, with the decision applied
/// on top of all-pending: a masked dotted write against a missing map
/// would create a one-key map, which no stored record is allowed to have.
fn decision_patch(
    maps_exist: bool,
    kind: DocumentKind,
    status: DocumentStatus,
    verified_at: FirestoreTimestamp,
    reason: Option<String>,
) -> (UserPatch, Vec<String>) {
    if maps_exist {
        let patch = UserPatch {
            documents_status: Some(DocumentSet::filled(status)),
            documents_verified_at: Some(DocumentSet::filled(Some(verified_at))),
            documents_rejection_reasons: Some(DocumentSet::filled(reason)),
            ..Default::default()
        };
        return (patch, decision_paths(kind).to_vec());
    }

    let mut statuses = DocumentSet::filled(DocumentStatus::Pending);
    *statuses.get_mut(kind) = status;
    let mut verified = DocumentSet::filled(None);
    *verified.get_mut(kind) = Some(verified_at);
    let mut reasons = DocumentSet::filled(None);
    *reasons.get_mut(kind) = reason;

    let patch = UserPatch {
        documents_status: Some(statuses),
        documents_verified_at: Some(verified),
        documents_rejection_reasons: Some(reasons),
        ..Default::default()
    };
    let paths = vec![
        "documentsStatus".to_string(),
        "documentsVerifiedAt".to_string(),
        "documentsRejectionReasons".to_string(),
    ];
    (patch, paths)
}

/// Outcome of a migration scan.
#[derive(Debug, Default, Serialize)]
pub struct MigrationReport {
    pub processed: u32,
    pub updated: u32,
    pub errors: Vec<MigrationFailure>,
}

/// One account the migration could not update.
#[derive(Debug, Serialize)]
pub struct MigrationFailure {
    pub uid: String,
    pub error: String,
}
