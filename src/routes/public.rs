use crate::{
    AppState, handlers,
    route_table::{SIGN_IN_PATH, SIGN_UP_PATH},
};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that never require a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Load balancer probe. Exempt from the edge gate.
        .route("/health", get(|| async { "ok" }))
        // GET /signin, GET /signup
        // Auth page shells. The edge gate sends anyone holding a session cookie to `/`.
        .route(SIGN_IN_PATH, get(|| handlers::auth_page("signin")))
        .route(SIGN_UP_PATH, get(|| handlers::auth_page("signup")))
}
