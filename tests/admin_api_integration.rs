// SPDX-License-Identifier: MIT

//! Admin API integration tests against the Firestore emulator.
//!
//! These exercise the HTTP surface end to end: listing with summaries,
//! whitelisted profile updates, and document decisions through the router.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use firestore::FirestoreTimestamp;
use roadside_admin::models::user::{
    AccountStatus, DocumentSet, DocumentStatus, User, UserType,
};
use tower::ServiceExt;

mod common;
use common::{create_test_app_with_db, create_test_jwt, test_db};

fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

fn pending_driver(uid: &str) -> User {
    User {
        uid: uid.to_string(),
        email: format!("{}@test.bg", uid),
        full_name: "Ivan Petrov".to_string(),
        phone: "+359881234567".to_string(),
        phone_verified: Some(false),
        user_type: UserType::Driver,
        created_at: Some(FirestoreTimestamp(chrono::Utc::now())),
        company_info: None,
        documents: None,
        documents_status: Some(DocumentSet::filled(DocumentStatus::Pending)),
        documents_verified_at: Some(DocumentSet::filled(None)),
        documents_rejection_reasons: Some(DocumentSet::filled(None)),
        status: Some(AccountStatus::Pending),
        is_active: Some(false),
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_list_users_includes_summary() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("list");
    db.upsert_user(&pending_driver(&uid)).await.unwrap();

    let (app, _) = create_test_app_with_db(db);
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/users")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", create_test_jwt()),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    let entry = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["uid"] == uid.as_str())
        .expect("created user should be listed");

    assert_eq!(entry["verification"]["allApproved"], false);
    assert_eq!(entry["verification"]["pendingCount"], 3);
}

#[tokio::test]
async fn test_reject_endpoint_returns_refreshed_summary() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("http-reject");
    db.upsert_user(&pending_driver(&uid)).await.unwrap();

    let (app, _) = create_test_app_with_db(db);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/api/users/{}/documents/driverPhoto/reject",
                    uid
                ))
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", create_test_jwt()),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"reason": "Photo is blurry"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["verification"]["rejectedCount"], 1);
    assert_eq!(body["verification"]["pendingCount"], 2);
}

#[tokio::test]
async fn test_approve_all_endpoint_activates_account() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("http-approve-all");
    db.upsert_user(&pending_driver(&uid)).await.unwrap();

    let (app, state) = create_test_app_with_db(db);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/users/{}/documents/approve-all", uid))
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", create_test_jwt()),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["verification"]["allApproved"], true);
    assert_eq!(body["verification"]["approvedCount"], 3);

    let user = state.db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(user.status, Some(AccountStatus::Approved));
    assert_eq!(user.is_active, Some(true));
}

#[tokio::test]
async fn test_patch_updates_whitelisted_fields() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("http-patch");
    db.upsert_user(&pending_driver(&uid)).await.unwrap();

    let (app, state) = create_test_app_with_db(db);
    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/users/{}", uid))
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", create_test_jwt()),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"fullName": "Petar Ivanov", "phoneVerified": true}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let user = state.db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(user.full_name, "Petar Ivanov");
    assert_eq!(user.phone_verified, Some(true));
    // Untouched fields survive the masked write
    assert_eq!(user.phone, "+359881234567");
    assert_eq!(user.status, Some(AccountStatus::Pending));
}

#[tokio::test]
async fn test_delete_user_removes_document() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("http-delete");
    db.upsert_user(&pending_driver(&uid)).await.unwrap();

    let (app, state) = create_test_app_with_db(db);
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/users/{}", uid))
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", create_test_jwt()),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.db.get_user(&uid).await.unwrap().is_none());
}

#[tokio::test]
async fn test_decision_on_missing_user_is_404() {
    require_emulator!();

    let db = test_db().await;
    let (app, _) = create_test_app_with_db(db);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/users/no-such-user/documents/driverPhoto/approve")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", create_test_jwt()),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
