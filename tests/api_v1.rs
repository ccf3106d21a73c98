//! Drives the HTTP boundary end to end over the in-memory backends.

use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use warden::api;
use warden::application_impl::{JwtConfig, JwtTokenAuthority, RealSessionService};
use warden::application_port::SessionService;
use warden::domain_model::KeyPrefix;
use warden::infra_memory::{MemoryRevocationStore, MemoryUserDirectory, SeedUser};
use warp::http::StatusCode;

fn session_service() -> Arc<dyn SessionService> {
    let refresh_ttl = Duration::from_secs(7 * 24 * 60 * 60);
    let directory = Arc::new(MemoryUserDirectory::new(vec![SeedUser {
        id: 42,
        username: "alice".to_string(),
        password: "pw".to_string(),
        role: "client".to_string(),
    }]));
    let store = Arc::new(MemoryRevocationStore::new());
    let authority = Arc::new(JwtTokenAuthority::new(JwtConfig {
        signing_key: b"integration-secret".to_vec(),
        access_ttl: Duration::from_secs(15 * 60),
        refresh_ttl,
        key_prefix: KeyPrefix::new("auth:"),
    }));
    Arc::new(RealSessionService::new(
        directory.clone(),
        authority,
        store.clone(),
        directory,
        store,
        refresh_ttl,
    ))
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

async fn login(service: &Arc<dyn SessionService>, username: &str, password: &str) -> (StatusCode, Value) {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/login")
        .json(&json!({"username": username, "password": password}))
        .reply(&api::api_v1(service.clone()))
        .await;
    (response.status(), body_json(response.body()))
}

async fn get_self(service: &Arc<dyn SessionService>, access_token: &str) -> (StatusCode, Value) {
    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/user/self")
        .header("authorization", format!("Bearer {}", access_token))
        .reply(&api::api_v1(service.clone()))
        .await;
    (response.status(), body_json(response.body()))
}

#[tokio::test]
async fn health_reports_backends() {
    let service = session_service();
    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/health")
        .reply(&api::api_v1(service))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.body());
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["storage"], true);
    assert_eq!(body["data"]["security"], true);
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn login_then_fetch_self() {
    let service = session_service();
    let (status, body) = login(&service, "alice", "pw").await;
    assert_eq!(status, StatusCode::OK);
    let access_token = body["data"]["accessToken"].as_str().unwrap().to_string();
    assert!(body["data"]["refreshToken"].as_str().is_some());
    assert!(body["data"]["expiresAt"].as_i64().is_some());

    let (status, body) = get_self(&service, &access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 42);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "client");
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let service = session_service();
    let (status, body) = login(&service, "alice", "wrong").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "InvalidCredentials");
    assert_eq!(body["error"]["status"], 4011);
    assert!(body["error"]["requestId"].as_str().is_some());
}

#[tokio::test]
async fn empty_credentials_are_bad_request() {
    let service = session_service();
    let (status, body) = login(&service, "", "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BadRequest");
}

#[tokio::test]
async fn logout_revokes_access_token() {
    let service = session_service();
    let (_, body) = login(&service, "alice", "pw").await;
    let access_token = body["data"]["accessToken"].as_str().unwrap().to_string();

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/user/logout")
        .header("authorization", format!("Bearer {}", access_token))
        .reply(&api::api_v1(service.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, body) = get_self(&service, &access_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "InvalidAccessToken");
    assert_eq!(body["error"]["status"], 4012);
}

#[tokio::test]
async fn refresh_supersedes_old_access_token() {
    let service = session_service();
    let (_, body) = login(&service, "alice", "pw").await;
    let old_access = body["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh_token = body["data"]["refreshToken"].as_str().unwrap().to_string();

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .json(&json!({"refreshToken": refresh_token}))
        .reply(&api::api_v1(service.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.body());
    let new_access = body["data"]["accessToken"].as_str().unwrap().to_string();
    assert_ne!(new_access, old_access);

    let (status, _) = get_self(&service, &old_access).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = get_self(&service, &new_access).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_refresh_token_is_bad_request() {
    let service = session_service();
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .json(&json!({"refreshToken": "not-a-token"}))
        .reply(&api::api_v1(service))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.body());
    assert_eq!(body["error"]["code"], "InvalidRefreshToken");
    assert_eq!(body["error"]["status"], 4013);
}

#[tokio::test]
async fn missing_bearer_is_unauthorized() {
    let service = session_service();
    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/user/self")
        .reply(&api::api_v1(service.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/user/self")
        .header("authorization", "Basic YWxpY2U6cHc=")
        .reply(&api::api_v1(service))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let service = session_service();
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/login")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&api::api_v1(service))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.body());
    assert_eq!(body["error"]["code"], "BadRequest");
    assert!(body["error"]["requestId"].is_string());
}

#[tokio::test]
async fn refresh_body_without_token_is_bad_request_with_request_id() {
    let service = session_service();
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .json(&json!({"nope": 1}))
        .reply(&api::api_v1(service))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.body());
    assert_eq!(body["error"]["code"], "BadRequest");
    assert_eq!(body["error"]["status"], 4000);
    assert!(!body["error"]["requestId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_body_is_bad_request() {
    let service = session_service();
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/login")
        .header("content-type", "application/json")
        .body(vec![b' '; 64 * 1024])
        .reply(&api::api_v1(service))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.body());
    assert_eq!(body["error"]["code"], "BadRequest");
    assert!(body["error"]["requestId"].is_string());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let service = session_service();
    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/nowhere")
        .reply(&api::api_v1(service))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
