use admin_console::{
    AuthApi, AuthError, HttpAuthApi,
    models::{Credentials, Role},
};
use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpListener;

// --- Fake Backend ---

const GOOD_TOKEN: &str = "backend-token";

fn user_json() -> Value {
    json!({
        "id": "00000000-0000-0000-0000-000000000042",
        "email": "owner@store.test",
        "firstName": "Olga",
        "lastName": "Owner",
        "role": "STORE_OWNER",
        "permissions": ["order:read", "product:read"],
        "storeId": "00000000-0000-0000-0000-000000000500"
    })
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match body["password"].as_str() {
        Some("secret") => (
            StatusCode::OK,
            Json(json!({ "accessToken": GOOD_TOKEN, "user": user_json() })),
        ),
        Some("explode") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "database down" })),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "bad credentials" })),
        ),
    }
}

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bearer(&headers) == Some(GOOD_TOKEN) {
        (StatusCode::OK, Json(user_json()))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "expired" })))
    }
}

async fn logout(headers: HeaderMap) -> StatusCode {
    if bearer(&headers) == Some(GOOD_TOKEN) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Serves the fake backend under `/api` and returns its base URL.
async fn spawn_backend() -> String {
    let router = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}/api/", port)
}

fn credentials(password: &str) -> Credentials {
    Credentials {
        email: "owner@store.test".to_string(),
        password: password.to_string(),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_login_returns_token_and_profile() {
    let api = HttpAuthApi::new(&spawn_backend().await, Duration::from_secs(5)).unwrap();

    let response = api.login(&credentials("secret")).await.unwrap();

    assert_eq!(response.access_token, GOOD_TOKEN);
    assert_eq!(response.user.role, Role::StoreOwner);
    assert_eq!(response.user.permissions.as_ref().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_login_rejection_maps_to_invalid_credentials() {
    let api = HttpAuthApi::new(&spawn_backend().await, Duration::from_secs(5)).unwrap();

    let result = api.login(&credentials("wrong")).await;

    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_server_error_maps_to_backend() {
    let api = HttpAuthApi::new(&spawn_backend().await, Duration::from_secs(5)).unwrap();

    let result = api.login(&credentials("explode")).await;

    match result {
        Err(AuthError::Backend { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("database down"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_me_with_valid_and_expired_token() {
    let api = HttpAuthApi::new(&spawn_backend().await, Duration::from_secs(5)).unwrap();

    let profile = api.me(GOOD_TOKEN).await.unwrap();
    assert_eq!(profile.email, "owner@store.test");

    assert!(matches!(
        api.me("stale").await,
        Err(AuthError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_logout_failure_is_reported() {
    let api = HttpAuthApi::new(&spawn_backend().await, Duration::from_secs(5)).unwrap();

    assert!(api.logout(GOOD_TOKEN).await.is_ok());
    assert!(matches!(
        api.logout("stale").await,
        Err(AuthError::Backend { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    // Bind and immediately drop a listener to get a port nobody is serving.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let api = HttpAuthApi::new(
        &format!("http://127.0.0.1:{}/api", port),
        Duration::from_secs(2),
    )
    .unwrap();

    assert!(matches!(api.me(GOOD_TOKEN).await, Err(AuthError::Transport(_))));
}
