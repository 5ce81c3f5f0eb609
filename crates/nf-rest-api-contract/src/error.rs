//! Error types for API contract validation

use thiserror::Error;

/// Errors raised while validating outgoing components or parsing enum values
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Relationship names cannot be blank")]
    BlankRelationship,

    #[error("Invalid processor state: {0}")]
    InvalidProcessorState(String),
}
