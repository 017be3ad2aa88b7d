//! Client-side session lifecycle.
//!
//! `SessionStore` is the single source of truth for the signed-in user. Every change is
//! written through to three places in one step: process memory, durable storage and the
//! cookie store that the edge gate reads.
//!
//! Operations race freely on the async runtime. Each one takes a ticket from a shared
//! epoch when it starts and may only commit its result while that ticket is still the
//! newest, so a slow revalidation cannot resurrect a session that was logged out while it
//! was in flight.

pub mod cookies;
pub mod storage;

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    auth_api::AuthApiState,
    error::{AuthError, StorageError},
    models::{Credentials, LoginResponse, Permission, Session, StoredSession},
    route_table::SIGN_IN_PATH,
};
use cookies::{CookieSettings, CookieStoreState};
use storage::{
    LEGACY_TOKEN_KEY, ROLE_KEY, SESSION_KEYS, StorageChange, StorageState, TOKEN_KEY, USER_KEY,
};

/// SessionSnapshot
///
/// What guards see: the current session, if any, and whether it is still being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn resolved(session: Option<Session>) -> Self {
        Self {
            session,
            loading: false,
        }
    }

    pub fn loading() -> Self {
        Self {
            session: None,
            loading: true,
        }
    }
}

struct SessionState {
    current: Option<StoredSession>,
    loading: bool,
}

/// SessionStore
///
/// Built once at application start and shared by handle. Starts in the loading state
/// until `check_auth_status` (or any other operation) resolves it.
pub struct SessionStore {
    api: AuthApiState,
    storage: StorageState,
    cookies: CookieStoreState,
    cookie_settings: CookieSettings,
    state: Mutex<SessionState>,
    epoch: AtomicU64,
}

impl SessionStore {
    pub fn new(
        api: AuthApiState,
        storage: StorageState,
        cookies: CookieStoreState,
        cookie_settings: CookieSettings,
    ) -> Self {
        Self {
            api,
            storage,
            cookies,
            cookie_settings,
            state: Mutex::new(SessionState {
                current: None,
                loading: true,
            }),
            epoch: AtomicU64::new(0),
        }
    }

    // --- Accessors ---

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            session: state.current.as_ref().map(|stored| stored.session.clone()),
            loading: state.loading,
        }
    }

    pub async fn session(&self) -> Option<Session> {
        let state = self.state.lock().await;
        state.current.as_ref().map(|stored| stored.session.clone())
    }

    pub async fn token(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.current.as_ref().map(|stored| stored.token.clone())
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    /// False without a session.
    pub async fn has_permission(&self, permission: Permission) -> bool {
        let state = self.state.lock().await;
        state
            .current
            .as_ref()
            .is_some_and(|stored| stored.session.has_permission(permission))
    }

    pub async fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        let state = self.state.lock().await;
        state
            .current
            .as_ref()
            .is_some_and(|stored| stored.session.has_any_permission(permissions))
    }

    pub async fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        let state = self.state.lock().await;
        state
            .current
            .as_ref()
            .is_some_and(|stored| stored.session.has_all_permissions(permissions))
    }

    // --- Operations ---

    /// Signs in. On failure the session is left unset and the error is returned.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let ticket = self.begin();

        match self.api.login(credentials).await {
            Ok(LoginResponse { access_token, user }) => {
                let session = Session::from_profile(user);
                let stored = StoredSession {
                    token: access_token,
                    session: session.clone(),
                };
                if self.commit(ticket, Some(stored)).await? {
                    tracing::info!(user_id = %session.user_id, role = %session.role, "signed in");
                    Ok(session)
                } else {
                    Err(AuthError::Superseded)
                }
            }
            Err(error) => {
                tracing::warn!(%error, "sign-in failed");
                self.commit_logged(ticket, None).await;
                Err(error)
            }
        }
    }

    /// Signs out and returns the path to navigate to.
    ///
    /// Local state is cleared before the backend is told, and regardless of what the
    /// backend answers. Calling this twice leaves the same state as calling it once.
    pub async fn logout(&self) -> &'static str {
        let token = {
            let mut state = self.state.lock().await;
            self.begin();
            let token = match state.current.as_ref() {
                Some(stored) => Some(stored.token.clone()),
                None => self.stored_token(),
            };
            if let Err(error) = self.persist_locked(&mut state, None) {
                tracing::error!(%error, "failed to clear durable session storage");
            }
            token
        };

        if let Some(token) = token {
            if let Err(error) = self.api.logout(&token).await {
                tracing::warn!(%error, "backend logout failed; local session already cleared");
            }
        }

        tracing::info!("signed out");
        SIGN_IN_PATH
    }

    /// Revalidates the current token. Any failure clears the session locally.
    pub async fn refresh_user(&self) -> Option<Session> {
        let ticket = self.begin();
        let token = {
            let state = self.state.lock().await;
            match state.current.as_ref() {
                Some(stored) => Some(stored.token.clone()),
                None => self.stored_token(),
            }
        };
        self.revalidate(ticket, token).await
    }

    /// Mount-time check: restores the session from durable storage if the backend still
    /// accepts its token. No stored token simply means no session.
    pub async fn check_auth_status(&self) -> Option<Session> {
        let ticket = self.begin();
        let token = {
            let mut state = self.state.lock().await;
            state.loading = true;
            self.stored_token()
        };
        self.revalidate(ticket, token).await
    }

    /// Writes `next` to memory, durable storage and the cookie store as one step and
    /// invalidates every operation still in flight.
    ///
    /// A failed durable write leaves the other two locations untouched. Clearing always
    /// clears memory and cookies, then reports a durable-storage failure if there was one.
    pub async fn persist_session(&self, next: Option<StoredSession>) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        self.begin();
        self.persist_locked(&mut state, next)
    }

    // --- Internals ---

    fn begin(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn lock_if_current(&self, ticket: u64) -> Option<MutexGuard<'_, SessionState>> {
        let state = self.state.lock().await;
        if self.epoch.load(Ordering::SeqCst) == ticket {
            Some(state)
        } else {
            tracing::debug!(ticket, "discarding stale session result");
            None
        }
    }

    /// Persists `next` if `ticket` is still the newest operation. Returns whether it did.
    async fn commit(&self, ticket: u64, next: Option<StoredSession>) -> Result<bool, StorageError> {
        match self.lock_if_current(ticket).await {
            Some(mut state) => self.persist_locked(&mut state, next).map(|_| true),
            None => Ok(false),
        }
    }

    async fn commit_logged(&self, ticket: u64, next: Option<StoredSession>) -> bool {
        match self.commit(ticket, next).await {
            Ok(committed) => committed,
            Err(error) => {
                tracing::error!(%error, "failed to persist session");
                false
            }
        }
    }

    async fn revalidate(&self, ticket: u64, token: Option<String>) -> Option<Session> {
        let Some(token) = token else {
            self.commit_logged(ticket, None).await;
            return None;
        };

        match self.api.me(&token).await {
            Ok(profile) => {
                let session = Session::from_profile(profile);
                let stored = StoredSession {
                    token,
                    session: session.clone(),
                };
                if self.commit_logged(ticket, Some(stored)).await {
                    return Some(session);
                }
            }
            Err(error) => {
                tracing::info!(%error, "session revalidation failed; treating as signed out");
                self.commit_logged(ticket, None).await;
            }
        }

        self.session().await
    }

    fn stored_token(&self) -> Option<String> {
        for key in [TOKEN_KEY, LEGACY_TOKEN_KEY] {
            match self.storage.get(key) {
                Ok(Some(token)) if !token.is_empty() => return Some(token),
                Ok(_) => {}
                Err(error) => tracing::warn!(%error, key, "failed to read stored token"),
            }
        }
        None
    }

    fn persist_locked(
        &self,
        state: &mut SessionState,
        next: Option<StoredSession>,
    ) -> Result<(), StorageError> {
        state.loading = false;

        match next {
            Some(stored) => {
                let user = serde_json::to_string(&stored.session)?;
                self.storage.apply(&[
                    StorageChange::Set(TOKEN_KEY, stored.token.clone()),
                    StorageChange::Set(LEGACY_TOKEN_KEY, stored.token.clone()),
                    StorageChange::Set(USER_KEY, user),
                    StorageChange::Set(ROLE_KEY, stored.session.role.as_str().to_string()),
                ])?;
                self.cookies
                    .write_session(&stored.token, stored.session.role, &self.cookie_settings);
                state.current = Some(stored);
                Ok(())
            }
            None => {
                state.current = None;
                self.cookies.clear_session();
                let removals = SESSION_KEYS.map(StorageChange::Remove);
                self.storage.apply(&removals)
            }
        }
    }
}
