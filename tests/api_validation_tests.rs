// SPDX-License-Identifier: MIT

//! Input validation tests.
//!
//! Every rejection here must happen before any write: these run against
//! the offline mock DB, so reaching Firestore would turn into a 500
//! instead of the expected 400/401.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;
use common::{create_test_app, create_test_jwt};

fn authed(builder: axum::http::request::Builder) -> axum::http::request::Builder {
    builder.header(
        header::AUTHORIZATION,
        format!("Bearer {}", create_test_jwt()),
    )
}

async fn error_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_document_kind_is_rejected() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/api/users/driver-1/documents/passport/approve"),
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(response).await;
    assert_eq!(body["error"], "invalid_argument");
    assert!(body["details"].as_str().unwrap().contains("passport"));
}

#[tokio::test]
async fn test_blank_rejection_reason_is_rejected() {
    let (app, _) = create_test_app();

    for reason in [r#"{"reason": ""}"#, r#"{"reason": "   "}"#] {
        let response = app
            .clone()
            .oneshot(
                authed(
                    Request::builder()
                        .method("POST")
                        .uri("/api/users/driver-1/documents/driverPhoto/reject")
                        .header(header::CONTENT_TYPE, "application/json"),
                )
                .body(Body::from(reason))
                .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "reason {} should be rejected before any write",
            reason
        );
    }
}

#[tokio::test]
async fn test_update_rejects_non_whitelisted_field() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/users/driver-1")
                    .header(header::CONTENT_TYPE, "application/json"),
            )
            .body(Body::from(
                r#"{"documentsStatus": {"driverPhoto": "approved"}}"#,
            ))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(response).await;
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("documentsStatus"));
}

#[tokio::test]
async fn test_update_rejects_wrongly_typed_values() {
    let (app, _) = create_test_app();

    // A wrongly-typed field written through would make the stored record
    // undeserializable, so it must die here with a 400.
    for body in [
        r#"{"isActive": "yes"}"#,
        r#"{"phoneVerified": 1}"#,
        r#"{"fullName": 42}"#,
        r#"{"companyInfo": "Patna Pomosht"}"#,
    ] {
        let response = app
            .clone()
            .oneshot(
                authed(
                    Request::builder()
                        .method("PATCH")
                        .uri("/api/users/driver-1")
                        .header(header::CONTENT_TYPE, "application/json"),
                )
                .body(Body::from(body))
                .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "body {} should be rejected before any write",
            body
        );
    }
}

#[tokio::test]
async fn test_update_rejects_invalid_status_value() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/users/driver-1")
                    .header(header::CONTENT_TYPE, "application/json"),
            )
            .body(Body::from(r#"{"status": "banned"}"#))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_rejects_empty_body() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/users/driver-1")
                    .header(header::CONTENT_TYPE, "application/json"),
            )
            .body(Body::from("{}"))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_proxy_requires_bearer_token() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/proxy/documents/requests")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title": "flat tire"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_proxy_rejects_bad_collection_name() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/proxy/documents/bad-name!")
                .header(header::AUTHORIZATION, "Bearer some-firebase-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_document_url_requires_file_param() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("GET")
                    .uri("/api/documents/url?file="),
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_check_without_issued_code() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/verify/check")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"phone": "0881234567", "code": "123456"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_image_rejects_empty_payload() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/save-image")
                .header(header::AUTHORIZATION, "Bearer some-firebase-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"image": "  "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
