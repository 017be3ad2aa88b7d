use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth::AuthSession,
    auth_api::AuthApiState,
    config::AppConfig,
    error::AuthError,
    guards::{ProtectedRoute, RouteOutcome},
    models::{AuthPageView, Credentials, ErrorBody, NavItem, PageView, Session},
    route_table::{RouteDescriptor, SIGN_IN_PATH, navigation_for},
    session::{
        SessionSnapshot,
        cookies::{add_session_cookies, clear_session_cookies, session_token},
    },
};

// --- Auth API Handlers ---

/// login
///
/// [Public API] Forwards the credentials to the backend and, on success, sets the
/// `token` and `userRole` cookies the edge gate keys off.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed in; session cookies set", body = Session),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 502, description = "Backend unavailable", body = ErrorBody)
    )
)]
pub async fn login(
    State(api): State<AuthApiState>,
    State(config): State<AppConfig>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<(CookieJar, Json<Session>), AuthError> {
    let response = api.login(&credentials).await?;
    let session = Session::from_profile(response.user);

    let jar = add_session_cookies(
        jar,
        &response.access_token,
        session.role,
        &config.cookie_settings(),
    );

    tracing::info!(user_id = %session.user_id, role = %session.role, "signed in");
    Ok((jar, Json(session)))
}

/// logout
///
/// [Public API] Tells the backend to drop the token when one is present, then expires
/// the session cookies and sends the browser to sign-in. A backend failure is logged
/// and does not stop the local sign-out.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 303, description = "Signed out; redirect to /signin"))
)]
pub async fn logout(State(api): State<AuthApiState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(token) = session_token(&jar) {
        if let Err(error) = api.logout(&token).await {
            tracing::warn!(%error, "backend logout failed; clearing cookies anyway");
        }
    }

    (clear_session_cookies(jar), Redirect::to(SIGN_IN_PATH))
}

/// me
///
/// [Authenticated API] The current session, revalidated against the backend.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current session", body = Session),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn me(AuthSession { session, .. }: AuthSession) -> Json<Session> {
    Json(session)
}

/// navigation
///
/// [Authenticated API] The routes the current session may see, in menu order.
#[utoipa::path(
    get,
    path = "/api/navigation",
    responses(
        (status = 200, description = "Navigation menu", body = [NavItem]),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn navigation(AuthSession { session, .. }: AuthSession) -> Json<Vec<NavItem>> {
    Json(navigation_for(session.role, &session.permissions))
}

// --- Page Handlers ---

pub async fn auth_page(page: &'static str) -> Json<AuthPageView> {
    Json(AuthPageView {
        page: page.to_string(),
    })
}

/// render_page
///
/// Serves the shell of one dashboard route after the same check the navigation uses.
///
/// A user turned away is sent to their role's landing page. Sending them to sign-in also
/// expires their cookies, otherwise the edge gate would bounce them straight back to `/`.
/// A user turned away from their own landing page gets a 403 instead of a redirect loop.
pub async fn render_page(
    route: &'static RouteDescriptor,
    AuthSession { session, .. }: AuthSession,
    jar: CookieJar,
) -> Response {
    let snapshot = SessionSnapshot::resolved(Some(session.clone()));

    match ProtectedRoute::for_route(route).resolve(&snapshot) {
        RouteOutcome::Render => Json(PageView {
            path: route.path.to_string(),
            title: route.title.to_string(),
            navigation: navigation_for(session.role, &session.permissions),
            user: session,
        })
        .into_response(),
        RouteOutcome::Redirect(target) if target == route.path => {
            tracing::info!(role = %session.role, path = route.path, "page forbidden for role");
            (
                StatusCode::FORBIDDEN,
                Json(ErrorBody {
                    error: "insufficient permissions".to_string(),
                }),
            )
                .into_response()
        }
        RouteOutcome::Redirect(target) if target != SIGN_IN_PATH => {
            Redirect::temporary(&target).into_response()
        }
        RouteOutcome::Redirect(_) | RouteOutcome::Loading | RouteOutcome::Unauthenticated => (
            clear_session_cookies(jar),
            Redirect::temporary(SIGN_IN_PATH),
        )
            .into_response(),
    }
}
