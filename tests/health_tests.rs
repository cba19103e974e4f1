//! Health and fallback routing
//!
//! Covers:
//! - GET /api/health liveness probe
//! - unknown paths and unsupported methods reported through the envelope

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

mod common;
use common::{build_app_state, create_test_db, send};

use aiminder::endpoints::create_router;

#[tokio::test]
async fn test_health_check_returns_ok_without_auth() {
    let db = create_test_db().await;
    let app = create_router(build_app_state(db));

    let request = Request::builder()
        .uri("/api/health")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(String::from_utf8_lossy(&body_bytes).trim(), "OK");
}

#[tokio::test]
async fn test_unknown_path_returns_no_resource_found() {
    let db = create_test_db().await;
    let app = create_router(build_app_state(db));

    let request = Request::builder()
        .uri("/api/does-not-exist")
        .body(Body::empty())
        .unwrap();

    let (response, body) = send(app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["errorCode"], "COMMON:NORESOURCEFOUND");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_wrong_method_returns_invalid_method() {
    let db = create_test_db().await;
    let app = create_router(build_app_state(db));

    let request = Request::builder()
        .uri("/api/health")
        .method("DELETE")
        .body(Body::empty())
        .unwrap();

    let (response, body) = send(app, request).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["errorCode"], "COMMON:INVALIDMETHOD");
}
