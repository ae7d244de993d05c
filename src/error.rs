use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failure taxonomy for every service operation. No automatic retries
/// anywhere: each variant is terminal for the calling request.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A precondition on the current state failed (self-action, wrong
    /// status, already blocked, not connected, ...).
    #[error("{0}")]
    InvalidState(String),

    /// A concurrent writer got there first (canonical-pair uniqueness,
    /// duplicate email/username). Distinct from InvalidState so clients
    /// can retry-as-read.
    #[error("{0}")]
    Conflict(String),

    /// Acting on a resource in a role the caller does not hold.
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("invalid credentials")]
    Unauthorized,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// True when the underlying sqlite error is a UNIQUE constraint violation,
/// which is how a lost check-then-insert race surfaces.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.message().contains("UNIQUE constraint failed"),
        _ => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Database(e) => {
                tracing::error!("database error: {}", e);
                json!({ "error": "internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
