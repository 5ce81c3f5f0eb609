//! Error types for the REST API client

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when using the REST API client
#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("Authentication failed: {status} - {body}")]
    Authentication { status: StatusCode, body: String },

    #[error("Invalid bearer token: {0}")]
    InvalidToken(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned error status {status}: {body}")]
    ServerError { status: StatusCode, body: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("API contract error: {0}")]
    ApiContract(#[from] nf_rest_api_contract::ApiContractError),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Coarse classification of [`RestClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The token endpoint refused the credentials
    Authentication,
    /// Transport failure or non-success answer from a resource endpoint
    Api,
    /// The client was misconfigured before any request was sent
    Configuration,
}

impl RestClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RestClientError::Authentication { .. } | RestClientError::InvalidToken(_) => {
                ErrorKind::Authentication
            }
            RestClientError::Url(_) | RestClientError::Config(_) => ErrorKind::Configuration,
            RestClientError::Http(_)
            | RestClientError::ServerError { .. }
            | RestClientError::Json(_)
            | RestClientError::ApiContract(_) => ErrorKind::Api,
        }
    }

    pub fn is_authentication(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RestClientError::Authentication { status, .. }
            | RestClientError::ServerError { status, .. } => Some(*status),
            RestClientError::Http(e) => e.status(),
            _ => None,
        }
    }
}

/// Result type alias for REST client operations
pub type RestClientResult<T> = Result<T, RestClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let auth = RestClientError::Authentication {
            status: StatusCode::FORBIDDEN,
            body: "bad credentials".into(),
        };
        assert!(auth.is_authentication());
        assert_eq!(auth.status(), Some(StatusCode::FORBIDDEN));

        let server = RestClientError::ServerError {
            status: StatusCode::CONFLICT,
            body: "stale revision".into(),
        };
        assert_eq!(server.kind(), ErrorKind::Api);

        assert_eq!(
            RestClientError::Config("no scheme".into()).kind(),
            ErrorKind::Configuration
        );
    }
}
