//! Edge route gate.
//!
//! Runs before any page handler and looks at one thing only: whether the request carries
//! a session cookie. It never decodes or validates the token; a stale or forged cookie
//! passes here and is rejected later when the page validates it against the backend.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    route_table::{HOME_PATH, SIGN_IN_PATH, SIGN_UP_PATH},
    session::cookies::has_session_cookie,
};

const AUTH_PAGES: [&str; 2] = [SIGN_IN_PATH, SIGN_UP_PATH];
const EXEMPT_PREFIXES: [&str; 3] = ["/api/", "/_next/", "/static/"];
const EXEMPT_PATHS: [&str; 3] = ["/api", "/health", "/favicon.ico"];

/// How the gate classifies a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// API routes and static assets: never gated.
    Exempt,
    AuthPage,
    ProtectedPage,
}

/// What the gate does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(&'static str),
}

pub fn classify(path: &str) -> PathClass {
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        other => other,
    };

    if EXEMPT_PATHS.contains(&trimmed)
        || EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
    {
        return PathClass::Exempt;
    }

    let last_segment = trimmed.rsplit('/').next().unwrap_or_default();
    if last_segment.contains('.') {
        return PathClass::Exempt;
    }

    if AUTH_PAGES.contains(&trimmed) {
        PathClass::AuthPage
    } else {
        PathClass::ProtectedPage
    }
}

/// The gate's state machine: path class × cookie presence.
pub fn decide(class: PathClass, has_cookie: bool) -> GateDecision {
    match (class, has_cookie) {
        (PathClass::Exempt, _) => GateDecision::Allow,
        (PathClass::AuthPage, true) => GateDecision::Redirect(HOME_PATH),
        (PathClass::AuthPage, false) => GateDecision::Allow,
        (PathClass::ProtectedPage, false) => GateDecision::Redirect(SIGN_IN_PATH),
        (PathClass::ProtectedPage, true) => GateDecision::Allow,
    }
}

/// edge_gate
///
/// Middleware applied to the whole router. Redirects are `307 Temporary Redirect`.
pub async fn edge_gate(jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let class = classify(&path);

    match decide(class, has_session_cookie(&jar)) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(target) => {
            tracing::debug!(%path, ?class, target, "edge gate redirect");
            Redirect::temporary(target).into_response()
        }
    }
}
