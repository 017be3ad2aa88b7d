use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth_api::AuthApiState,
    models::{ErrorBody, Session},
    route_table::SIGN_IN_PATH,
    session::cookies::{clear_session_cookies, session_token},
};

/// AuthSession
///
/// The validated session behind a request. This is the fine-grained check that sits
/// behind the edge gate: the gate only saw that a cookie exists, this extractor asks the
/// backend whether the token in it is still good.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub session: Session,
}

/// AuthRejection
///
/// Pages answer a missing or rejected session with a redirect to sign-in that also
/// expires the session cookies; the `/api` surface answers with a plain 401.
#[derive(Debug)]
pub struct AuthRejection {
    api_request: bool,
    jar: CookieJar,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        if self.api_request {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    error: "not signed in".to_string(),
                }),
            )
                .into_response()
        } else {
            (
                clear_session_cookies(self.jar),
                Redirect::temporary(SIGN_IN_PATH),
            )
                .into_response()
        }
    }
}

/// Token from the `token` cookie, falling back to an `Authorization: Bearer` header for
/// non-browser API clients.
fn request_token(parts: &Parts, jar: &CookieJar) -> Option<String> {
    session_token(jar).or_else(|| {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    AuthApiState: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let api = AuthApiState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let api_request = parts.uri.path().starts_with("/api");

        let Some(token) = request_token(parts, &jar) else {
            return Err(AuthRejection { api_request, jar });
        };

        match api.me(&token).await {
            Ok(profile) => Ok(AuthSession {
                token,
                session: Session::from_profile(profile),
            }),
            Err(error) => {
                tracing::info!(%error, "session token rejected");
                Err(AuthRejection { api_request, jar })
            }
        }
    }
}
