use axum::{
    Json, Router,
    extract::FromRef,
    http::{HeaderName, StatusCode},
    middleware,
    response::IntoResponse,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access-control core, usable without the HTTP host.
pub mod guards;
pub mod models;
pub mod permissions;
pub mod route_table;
pub mod session;

// Backend access and the dashboard host.
pub mod auth;
pub mod auth_api;
pub mod config;
pub mod edge_gate;
pub mod error;
pub mod handlers;

// Routing segregation (Public, API, Pages).
pub mod routes;
use routes::{api, pages, public};

// --- Public Re-exports ---

pub use auth_api::{AuthApi, AuthApiState, HttpAuthApi, MockAuthApi};
pub use config::AppConfig;
pub use error::{AuthError, StorageError};
pub use guards::{GuardDecision, ProtectedRoute, RoleGuard, RouteOutcome};
pub use models::{Permission, Role, Session};
pub use session::{SessionSnapshot, SessionStore};

/// ApiDoc
///
/// OpenAPI document for the `/api` surface, served at `/api/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::login, handlers::logout, handlers::me, handlers::navigation),
    components(
        schemas(
            models::Session, models::Role, models::Permission, models::Credentials,
            models::NavItem, models::PageView, models::ErrorBody,
        )
    ),
    tags(
        (name = "admin-console", description = "Admin dashboard session and access control")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state of the dashboard host.
#[derive(Clone)]
pub struct AppState {
    /// Backend authentication endpoints.
    pub api: AuthApiState,
    pub config: AppConfig,
}

impl FromRef<AppState> for AuthApiState {
    fn from_ref(app_state: &AppState) -> AuthApiState {
        app_state.api.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(models::ErrorBody {
            error: "not found".to_string(),
        }),
    )
}

/// create_router
///
/// Assembles the dashboard host: routes, the edge gate in front of all of them, and the
/// observability layers outermost.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(api::api_routes())
        .merge(pages::page_routes())
        .fallback(not_found)
        // The gate sees every request and skips the ones it classifies as exempt.
        .layer(middleware::from_fn(edge_gate::edge_gate))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, tagged with its `x-request-id`. Only the path is recorded:
/// query strings and cookies stay out of the logs.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
    )
}
