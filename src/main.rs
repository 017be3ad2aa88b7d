use admin_console::{
    AppState,
    auth_api::{AuthApiState, HttpAuthApi},
    config::{AppConfig, Env},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, installs logging, builds the backend client and serves the
/// dashboard host.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast in production)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins; guard diagnostics stay off under the default filter.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "admin_console=info,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Backend client
    let api = HttpAuthApi::new(&config.api_base_url, config.http_timeout())
        .expect("FATAL: failed to build the backend HTTP client");
    let api = Arc::new(api) as AuthApiState;
    tracing::info!(api_base_url = %config.api_base_url, "auth backend configured");

    // 4. Router and server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState { api, config });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: failed to bind listen address. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API documentation available at http://{}/api/docs", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
