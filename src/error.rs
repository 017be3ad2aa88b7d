use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::ErrorBody;

/// StorageError
///
/// Failures of the durable client storage backing the session.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contents are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// AuthError
///
/// Everything that can go wrong while establishing or revalidating a session.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("session token rejected")]
    Unauthorized,

    #[error("auth backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("auth backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("auth backend sent an unusable profile: {0}")]
    InvalidProfile(String),

    #[error("a newer session operation superseded this one")]
    Superseded,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Backend { .. } | AuthError::Transport(_) | AuthError::InvalidProfile(_) => {
                StatusCode::BAD_GATEWAY
            }
            AuthError::Superseded => StatusCode::CONFLICT,
            AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "auth request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
