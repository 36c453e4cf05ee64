use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Domain error taxonomy. Every failure is terminal for the action that
/// produced it; callers surface it once at their boundary and never retry
/// automatically.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Permission(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Account is suspended")]
    SuspendedAccount,

    #[error("{0}")]
    Conflict(String),

    #[error("Upstream failure: {0}")]
    Upstream(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

impl From<rusqlite::Error> for TrackerError {
    fn from(err: rusqlite::Error) -> Self {
        TrackerError::Upstream(Box::new(err))
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Upstream(Box::new(err))
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = match self {
            TrackerError::Validation(_) | TrackerError::Conflict(_) => StatusCode::BAD_REQUEST,
            TrackerError::Permission(_) | TrackerError::SuspendedAccount => StatusCode::FORBIDDEN,
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Collaborator failures are not echoed to clients verbatim.
        let message = match &self {
            TrackerError::Upstream(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
