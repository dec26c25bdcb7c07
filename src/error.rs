use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::services::llm::CompletionError;

/// Service-wide error type.
///
/// Logging failures are deliberately absent: the activity log is
/// best-effort and its errors are downgraded to warnings at the call site
/// instead of failing the request.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration or environment issue detected at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A required form field was missing or unusable.
    #[error("{0}")]
    InputValidation(String),

    /// The remote completion service failed the request.
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// The uploaded template was not a readable document.
    #[error("failed to parse uploaded template: {0}")]
    Parse(String),

    /// Template blocks and generated sections could not be paired.
    #[error("assembly failed: {0}")]
    Assembly(String),

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InputValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Parse(_) => StatusCode::BAD_REQUEST,
            AppError::Completion(err) => match err {
                CompletionError::Auth { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                CompletionError::Quota
                | CompletionError::Service { .. }
                | CompletionError::Network(_)
                | CompletionError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            },
            AppError::Configuration(_) | AppError::Assembly(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
