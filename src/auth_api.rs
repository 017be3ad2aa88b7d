use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    error::AuthError,
    models::{Credentials, LoginResponse, UserProfile},
};

// 1. AuthApi Contract
/// AuthApi
///
/// The backend authentication endpoints the dashboard depends on. The session store and
/// the dashboard host only ever talk to the backend through this trait, so the real HTTP
/// client can be swapped for `MockAuthApi` in tests and offline runs.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`. Rejected credentials map to `AuthError::InvalidCredentials`.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError>;

    /// `POST /auth/logout` with the bearer token. Callers treat failure as non-fatal.
    async fn logout(&self, token: &str) -> Result<(), AuthError>;

    /// `GET /auth/me` with the bearer token. A rejected token maps to `AuthError::Unauthorized`.
    async fn me(&self, token: &str) -> Result<UserProfile, AuthError>;
}

/// AuthApiState
///
/// Shared handle to whichever `AuthApi` implementation the process was built with.
pub type AuthApiState = Arc<dyn AuthApi>;

// 2. The Real Implementation
/// HttpAuthApi
///
/// `reqwest` client for the backend's `/auth` endpoints. Timeouts are enforced by the
/// client; nothing here retries.
#[derive(Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let client = ClientBuilder::new()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(concat!("admin-console/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turns a non-success response into `AuthError::Backend`, keeping a short excerpt of the body.
async fn backend_error(status: StatusCode, response: reqwest::Response) -> AuthError {
    let mut message = response.text().await.unwrap_or_default();
    if message.len() > 200 {
        let cut = (0..=200).rev().find(|i| message.is_char_boundary(*i)).unwrap_or(0);
        message.truncate(cut);
    }
    AuthError::Backend {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => response
                .json::<LoginResponse>()
                .await
                .map_err(|e| AuthError::InvalidProfile(e.to_string())),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AuthError::InvalidCredentials)
            }
            status => Err(backend_error(status, response).await),
        }
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(backend_error(status, response).await),
        }
    }

    async fn me(&self, token: &str) -> Result<UserProfile, AuthError> {
        let response = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => response
                .json::<UserProfile>()
                .await
                .map_err(|e| AuthError::InvalidProfile(e.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::Unauthorized),
            status => Err(backend_error(status, response).await),
        }
    }
}

// 3. The Mock Implementation
/// MockAuthApi
///
/// In-memory stand-in for the backend: one account, one valid token. Logout can be made
/// to fail to exercise the best-effort path.
pub struct MockAuthApi {
    profile: UserProfile,
    password: String,
    token: String,
    fail_logout: bool,
    logout_calls: AtomicUsize,
}

impl MockAuthApi {
    pub fn new(profile: UserProfile, password: impl Into<String>) -> Self {
        let token = format!("mock-token-{}", profile.id.simple());
        Self {
            profile,
            password: password.into(),
            token,
            fail_logout: false,
            logout_calls: AtomicUsize::new(0),
        }
    }

    /// Every logout call answers with a simulated 500.
    pub fn with_failing_logout(mut self) -> Self {
        self.fail_logout = true;
        self
    }

    /// The only token `me` accepts.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        if credentials.email != self.profile.email || credentials.password != self.password {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(LoginResponse {
            access_token: self.token.clone(),
            user: self.profile.clone(),
        })
    }

    async fn logout(&self, _token: &str) -> Result<(), AuthError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout {
            return Err(AuthError::Backend {
                status: 500,
                message: "Mock Auth Error: Simulation requested".to_string(),
            });
        }
        Ok(())
    }

    async fn me(&self, token: &str) -> Result<UserProfile, AuthError> {
        if token == self.token {
            Ok(self.profile.clone())
        } else {
            Err(AuthError::Unauthorized)
        }
    }
}
