//! Session cookies.
//!
//! The `token` cookie is the session-existence marker the edge gate reads; `userRole` is
//! a coarse role hint. Both live at path `/` with an explicit expiry. They are readable
//! by client code, so they are not marked `HttpOnly`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::{Arc, Mutex, PoisonError};
use time::{Duration, OffsetDateTime};

use crate::models::Role;

pub const TOKEN_COOKIE: &str = "token";
pub const ROLE_COOKIE: &str = "userRole";

/// CookieSettings
///
/// Lifetime and transport flags applied to both session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub ttl: Duration,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::days(7),
            secure: false,
        }
    }
}

fn session_cookie(name: &'static str, value: String, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .max_age(settings.ttl)
        .expires(OffsetDateTime::now_utc() + settings.ttl)
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .build()
}

/// Adds both session cookies to `jar`.
pub fn add_session_cookies(
    jar: CookieJar,
    token: &str,
    role: Role,
    settings: &CookieSettings,
) -> CookieJar {
    jar.add(session_cookie(TOKEN_COOKIE, token.to_string(), settings))
        .add(session_cookie(ROLE_COOKIE, role.as_str().to_string(), settings))
}

/// Removes both session cookies from `jar`; in a response this emits expired `Set-Cookie` headers.
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(ROLE_COOKIE).path("/"))
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
    cookie
        .expires_datetime()
        .is_some_and(|at| at <= OffsetDateTime::now_utc())
        || cookie.max_age().is_some_and(|age| age <= Duration::ZERO)
}

/// The session token, if the jar carries a live, non-empty `token` cookie.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(TOKEN_COOKIE)
        .filter(|cookie| !cookie.value().is_empty() && !is_expired(cookie))
        .map(|cookie| cookie.value().to_string())
}

pub fn has_session_cookie(jar: &CookieJar) -> bool {
    session_token(jar).is_some()
}

/// CookieStore
///
/// The cookie location of the session write-through.
pub trait CookieStore: Send + Sync {
    fn write_session(&self, token: &str, role: Role, settings: &CookieSettings);

    fn clear_session(&self);

    /// Value of a live cookie by name.
    fn get(&self, name: &str) -> Option<String>;
}

pub type CookieStoreState = Arc<dyn CookieStore>;

/// MemoryCookieStore
///
/// A cookie jar held in process memory, with expiry honored on read.
#[derive(Default)]
pub struct MemoryCookieStore {
    jar: Mutex<CookieJar>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current jar.
    pub fn jar(&self) -> CookieJar {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CookieStore for MemoryCookieStore {
    fn write_session(&self, token: &str, role: Role, settings: &CookieSettings) {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        *jar = add_session_cookies(jar.clone(), token, role, settings);
    }

    fn clear_session(&self) {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        *jar = clear_session_cookies(jar.clone());
    }

    fn get(&self, name: &str) -> Option<String> {
        let jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        jar.get(name)
            .filter(|cookie| !is_expired(cookie))
            .map(|cookie| cookie.value().to_string())
    }
}
