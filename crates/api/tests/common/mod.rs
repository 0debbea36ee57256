#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use locker_core::store::memory::MemoryStore;
use locker_core::store::Store;
use tower::ServiceExt;

use locker_api::auth::jwt::{generate_access_token, JwtConfig};
use locker_api::config::{ServerConfig, StoreBackend};
use locker_api::router::build_app_router;
use locker_api::state::AppState;
use locker_api::ws::WsManager;
use locker_events::EventBus;

pub const TEST_PUBLIC_BASE_URL: &str = "https://lockers.example.test";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 60,
    }
}

/// A test `ServerConfig` over the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        store_backend: StoreBackend::Memory,
        database_url: None,
        db_max_connections: 1,
        public_base_url: TEST_PUBLIC_BASE_URL.to_string(),
        jwt: test_jwt_config(),
    }
}

pub fn test_state(store: Arc<dyn Store>) -> AppState {
    AppState {
        store,
        config: Arc::new(test_config()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(EventBus::default()),
    }
}

/// Build the full application router over `state`, with the same middleware
/// stack production uses.
pub fn build_test_app_from(state: AppState) -> Router {
    let config = test_config();
    build_app_router(state, &config)
}

pub fn build_test_app_with(store: Arc<dyn Store>) -> Router {
    build_test_app_from(test_state(store))
}

/// Build the application over a fresh, empty in-memory store.
pub fn build_test_app() -> Router {
    build_test_app_with(Arc::new(MemoryStore::new()))
}

pub fn admin_token() -> String {
    generate_access_token("admin@school.example", "admin", &test_jwt_config())
        .expect("token generation should succeed")
}

fn authed(builder: axum::http::request::Builder) -> axum::http::request::Builder {
    builder.header("authorization", format!("Bearer {}", admin_token()))
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

/// Authenticated GET.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = authed(Request::builder().method(Method::GET).uri(uri))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// GET without an `Authorization` header.
pub async fn get_anonymous(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn with_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response {
    let request = authed(Request::builder().method(method).uri(uri))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Authenticated POST with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    with_json(app, Method::POST, uri, body).await
}

/// Authenticated PUT with a JSON body.
pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    with_json(app, Method::PUT, uri, body).await
}

/// Authenticated POST with no body.
pub async fn post(app: Router, uri: &str) -> Response {
    let request = authed(Request::builder().method(Method::POST).uri(uri))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Authenticated DELETE.
pub async fn delete(app: Router, uri: &str) -> Response {
    let request = authed(Request::builder().method(Method::DELETE).uri(uri))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Public POST with a JSON body (no token).
pub async fn post_json_anonymous(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Register a student through the public default form and return the
/// response id.
pub async fn register_student(app: &Router, name: &str, school_number: &str, class: &str) -> String {
    let response = post_json_anonymous(
        app.clone(),
        "/api/v1/register/default",
        serde_json::json!({
            "name": name,
            "schoolNumber": school_number,
            "class": class,
            "contactNumber": "+60 12-345 6789",
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Seed the initial 6 + 10 locker grid.
pub async fn initialize_lockers(app: &Router) {
    let response = post(app.clone(), "/api/v1/lockers/initialize").await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
}
