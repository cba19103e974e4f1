//! OAuth2 authorization redirect and callback failure handling
//!
//! The provider token exchange needs network access and is not exercised here.

use axum::{
    body::Body,
    http::{
        header::{LOCATION, SET_COOKIE},
        Request, StatusCode,
    },
};

mod common;
use common::{app, build_app_state, create_test_db, send};

fn cookies(response: &axum::http::Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_authorize_redirects_to_provider() {
    let db = create_test_db().await;
    let router = app(build_app_state(db));

    let request = Request::builder()
        .uri("/api/oauth2/authorization/google?return_to=http%3A%2F%2Flocalhost%3A3000%2Fgoals")
        .body(Body::empty())
        .unwrap();

    let (response, _) = send(router, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let location = response.headers().get(LOCATION).unwrap().to_str().unwrap();
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(location.contains("client_id=test-client"));
    assert!(location.contains("state="));

    let set = cookies(&response);
    assert!(set.iter().any(|c| c.starts_with("OAUTH2_STATE=")));
    assert!(set.iter().any(|c| c.starts_with("OAUTH2_RETURN_TO=")));
}

#[tokio::test]
async fn test_authorize_ignores_foreign_return_to() {
    let db = create_test_db().await;
    let router = app(build_app_state(db));

    let request = Request::builder()
        .uri("/api/oauth2/authorization/google?return_to=https%3A%2F%2Fevil.example%2F")
        .body(Body::empty())
        .unwrap();

    let (response, _) = send(router, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let set = cookies(&response);
    assert!(set.iter().any(|c| c.starts_with("OAUTH2_STATE=")));
    assert!(!set.iter().any(|c| c.starts_with("OAUTH2_RETURN_TO=")));
}

#[tokio::test]
async fn test_authorize_rejects_unconfigured_provider() {
    let db = create_test_db().await;
    let router = app(build_app_state(db));

    let request = Request::builder()
        .uri("/api/oauth2/authorization/kakao")
        .body(Body::empty())
        .unwrap();

    let (response, body) = send(router, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], "COMMON:INVALIDREQUEST");
}

#[tokio::test]
async fn test_callback_with_state_mismatch_goes_to_error_page() {
    let db = create_test_db().await;
    let router = app(build_app_state(db));

    let request = Request::builder()
        .uri("/api/login/oauth2/code/google?code=abc&state=forged")
        .header("Cookie", "OAUTH2_STATE=expected")
        .body(Body::empty())
        .unwrap();

    let (response, _) = send(router, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "http://localhost:3000/login?error=oauth"
    );

    let set = cookies(&response);
    assert!(set.iter().any(|c| c.starts_with("OAUTH2_STATE=;")));
    assert!(set.iter().any(|c| c.starts_with("OAUTH2_RETURN_TO=;")));
    assert!(!set.iter().any(|c| c.starts_with("ACCESS_TOKEN=")));
}

#[tokio::test]
async fn test_malformed_authorize_query_uses_envelope() {
    let db = create_test_db().await;
    let router = app(build_app_state(db));

    let request = Request::builder()
        .uri("/api/oauth2/authorization/google?return_to=a&return_to=b")
        .body(Body::empty())
        .unwrap();

    let (response, body) = send(router, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], "COMMON:INVALIDREQUEST");
}
