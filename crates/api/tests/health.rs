//! Integration tests for the health endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_test_app, get, get_anonymous};
use tower::ServiceExt;

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let response = get_anonymous(build_test_app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(build_test_app(), "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let response = get_anonymous(build_test_app(), "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/lockers")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "authorization")
        .body(Body::empty())
        .unwrap();

    let response = build_test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routes_require_a_token() {
    let response = get_anonymous(build_test_app(), "/api/v1/lockers").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/lockers")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = build_test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn websocket_upgrade_without_token_is_rejected() {
    let response = get_anonymous(build_test_app(), "/api/v1/ws").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
