// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod user;
pub mod verification;

pub use user::{
    AccountStatus, CompanyInfo, DocumentKind, DocumentSet, DocumentStatus, User, UserPatch,
    UserType,
};
pub use verification::{summarize, VerificationSummary};
