//! Domain-level errors.
//!
//! These errors represent rule violations detected before any request is
//! issued. They are independent of transport concerns (HTTP, auth backend).

use thiserror::Error;
use validator::ValidationErrors;

/// Domain-specific errors for client-side rule violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required field was empty
    #[error("{0} is required")]
    MissingField(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a missing-field error
    pub fn missing(field: impl Into<String>) -> Self {
        DomainError::MissingField(field.into())
    }

    /// Message without the variant prefix, suitable for showing to a user.
    pub fn message(&self) -> String {
        match self {
            DomainError::Validation(msg) => msg.clone(),
            DomainError::MissingField(_) => self.to_string(),
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        // Surface the first field message, the way a form shows one error at a time
        let message = errors
            .field_errors()
            .values()
            .next()
            .and_then(|errors| errors.first())
            .and_then(|error| error.message.as_ref())
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| "Validation failed".to_string());
        DomainError::Validation(message)
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
