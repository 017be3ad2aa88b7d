use std::{env, time::Duration};

use crate::session::cookies::CookieSettings;

const LOCAL_API_BASE_URL: &str = "http://localhost:4000/api";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// AppConfig
///
/// Immutable configuration of the dashboard host, loaded once at startup and shared
/// through the application state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Production hardens cookies and requires explicit settings.
    pub env: Env,
    // Base URL of the backend REST API, without a trailing slash.
    pub api_base_url: String,
    pub bind_addr: String,
    // Lifetime of the `token` and `userRole` cookies.
    pub session_ttl_secs: i64,
    // Request and connect timeout for calls to the backend.
    pub http_timeout_secs: u64,
}

/// Env
///
/// Local development or production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Local settings that need no environment, for tests and state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: LOCAL_API_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// A numeric setting that must be strictly positive. Anything else falls back to `default`.
fn positive_var<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match env::var(name) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) if value > T::default() => value,
            _ => {
                tracing::warn!(name, value = %raw, "ignoring invalid setting");
                default
            }
        },
        Err(_) => default,
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `API_BASE_URL` is missing, so the host never starts
    /// pointed at a development backend.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| LOCAL_API_BASE_URL.to_string())
            }
        };

        Self {
            env,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            session_ttl_secs: positive_var("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS),
            http_timeout_secs: positive_var("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }

    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            ttl: time::Duration::seconds(self.session_ttl_secs),
            secure: self.secure_cookies(),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
