use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// API Router Module
///
/// The `/api` surface. The edge gate lets every request through here, so handlers that
/// need a session take the `AuthSession` extractor, which answers 401 rather than
/// redirecting.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // POST /api/auth/login
        // Proxies the backend login and sets the session cookies.
        .route("/api/auth/login", post(handlers::login))
        // POST /api/auth/logout
        // Best-effort backend logout; always expires the cookies.
        .route("/api/auth/logout", post(handlers::logout))
        // GET /api/auth/me
        .route("/api/auth/me", get(handlers::me))
        // GET /api/navigation
        // Menu entries for the current session.
        .route("/api/navigation", get(handlers::navigation))
}
