use crate::{
    AppState,
    auth::AuthSession,
    handlers,
    route_table::{ROUTES, RouteDescriptor},
};
use axum::{Router, routing::get};
use axum_extra::extract::cookie::CookieJar;

/// Pages Router Module
///
/// Registers one GET route per route descriptor. The edge gate has already required a
/// session cookie; each page then validates the session and applies the descriptor's
/// requirement through `ProtectedRoute`.
pub fn page_routes() -> Router<AppState> {
    ROUTES.iter().fold(Router::new(), |router, route| {
        let route: &'static RouteDescriptor = route;
        router.route(
            route.path,
            get(move |auth: AuthSession, jar: CookieJar| handlers::render_page(route, auth, jar)),
        )
    })
}
