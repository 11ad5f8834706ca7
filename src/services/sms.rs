// SPDX-License-Identifier: MIT

//! SMS phone verification codes.
//!
//! Short-lived, single-use codes keyed by normalized phone number. The
//! store is constructed once and passed through `AppState`; nothing here is
//! process-global. In demo mode the code is logged instead of sent.
//
// TODO: integrate a real SMS provider (SMS.bg) behind `issue`.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;

/// Why a code was not accepted.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("No verification code was sent to this number")]
    NotIssued,
    #[error("Verification code has expired")]
    Expired,
    #[error("Invalid verification code")]
    Mismatch,
}

#[derive(Debug, Clone)]
struct PendingCode {
    code: String,
    issued_at: DateTime<Utc>,
}

/// Expiring, single-use verification code store.
#[derive(Clone)]
pub struct VerificationCodeStore {
    codes: Arc<DashMap<String, PendingCode>>,
    ttl: Duration,
}

impl VerificationCodeStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            codes: Arc::new(DashMap::new()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Generate and store a fresh code for a phone number.
    ///
    /// Returns the normalized phone and the code. A second issue for the
    /// same number replaces the first.
    pub fn issue(&self, phone: &str) -> (String, String) {
        let normalized = normalize_bg_phone(phone);
        let code = generate_code();
        self.put(&normalized, &code, Utc::now());
        (normalized, code)
    }

    fn put(&self, normalized_phone: &str, code: &str, now: DateTime<Utc>) {
        self.codes.insert(
            normalized_phone.to_string(),
            PendingCode {
                code: code.to_string(),
                issued_at: now,
            },
        );
    }

    /// Check a candidate code. Consumes the stored code on success and on
    /// expiry; a mismatch leaves it in place for another attempt.
    pub fn consume(&self, phone: &str, candidate: &str) -> Result<(), CodeError> {
        self.consume_at(phone, candidate, Utc::now())
    }

    fn consume_at(
        &self,
        phone: &str,
        candidate: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CodeError> {
        let normalized = normalize_bg_phone(phone);

        let pending = self
            .codes
            .get(&normalized)
            .map(|entry| entry.value().clone())
            .ok_or(CodeError::NotIssued)?;

        if now - pending.issued_at > self.ttl {
            self.codes.remove(&normalized);
            return Err(CodeError::Expired);
        }

        if pending.code != candidate {
            return Err(CodeError::Mismatch);
        }

        self.codes.remove(&normalized);
        Ok(())
    }
}

/// Random 6-digit code.
fn generate_code() -> String {
    rand::rng().random_range(100_000..1_000_000).to_string()
}

/// Normalize a Bulgarian phone number to +359 form.
pub fn normalize_bg_phone(phone: &str) -> String {
    if phone.starts_with("+359") {
        return phone.to_string();
    }

    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if let Some(rest) = digits.strip_prefix('0') {
        format!("+359{}", rest)
    } else if digits.starts_with("359") {
        format!("+{}", digits)
    } else {
        format!("+359{}", digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_consume() {
        let store = VerificationCodeStore::new(5);
        let (phone, code) = store.issue("0881234567");

        assert_eq!(phone, "+359881234567");
        assert_eq!(code.len(), 6);
        assert!(store.consume(&phone, &code).is_ok());

        // Single use
        assert_eq!(store.consume(&phone, &code), Err(CodeError::NotIssued));
    }

    #[test]
    fn test_mismatch_keeps_code_for_retry() {
        let store = VerificationCodeStore::new(5);
        let (phone, code) = store.issue("0881234567");

        assert_eq!(store.consume(&phone, "000000"), Err(CodeError::Mismatch));
        assert!(store.consume(&phone, &code).is_ok());
    }

    #[test]
    fn test_expiry_with_fake_clock() {
        let store = VerificationCodeStore::new(5);
        let issued = Utc::now();
        store.put("+359881234567", "123456", issued);

        // Just inside the window
        let almost = issued + Duration::minutes(5);
        assert!(store
            .consume_at("+359881234567", "123456", almost)
            .is_ok());

        // Past the window
        store.put("+359881234567", "123456", issued);
        let late = issued + Duration::minutes(5) + Duration::seconds(1);
        assert_eq!(
            store.consume_at("+359881234567", "123456", late),
            Err(CodeError::Expired)
        );

        // Expiry consumed the code
        assert_eq!(
            store.consume_at("+359881234567", "123456", late),
            Err(CodeError::NotIssued)
        );
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(normalize_bg_phone("0881234567"), "+359881234567");
        assert_eq!(normalize_bg_phone("+359881234567"), "+359881234567");
        assert_eq!(normalize_bg_phone("359881234567"), "+359881234567");
        assert_eq!(normalize_bg_phone("881234567"), "+359881234567");
        assert_eq!(normalize_bg_phone("088 123 4567"), "+359881234567");
    }
}
