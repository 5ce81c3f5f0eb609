//! Error answers of the mock server

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failure returned by a mock endpoint, rendered as a plain-text body
/// the way NiFi reports errors
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

impl MockError {
    pub fn status(&self) -> StatusCode {
        match self {
            MockError::NotFound(_) => StatusCode::NOT_FOUND,
            MockError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MockError::Conflict(_) => StatusCode::CONFLICT,
            MockError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            MockError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

pub type MockResult<T> = Result<T, MockError>;
