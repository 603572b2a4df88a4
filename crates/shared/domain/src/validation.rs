//! Client-side validation applied before any request leaves the device.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidateEmail};

use crate::error::{DomainError, DomainResult};

/// Validate any `validator`-annotated input and hand it back on success.
pub trait Validated: Validate + Sized {
    fn validated(self) -> DomainResult<Self> {
        self.validate()?;
        Ok(self)
    }
}

impl<T: Validate> Validated for T {}

/// Email/password pair used for sign-in.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }
}

/// Registration input: credentials plus free-form user metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl SignUpRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
            metadata: Map::new(),
        }
    }

    /// Attach a metadata entry (e.g. the display name) to the new identity.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Check a bare email address, e.g. for password reset.
pub fn validate_email_address(email: &str) -> DomainResult<()> {
    let email = email.trim().to_string();
    if email.is_empty() {
        return Err(DomainError::missing("Email"));
    }
    if !email.validate_email() {
        return Err(DomainError::validation("Please enter a valid email address"));
    }
    Ok(())
}

/// Reject empty or whitespace-only required text.
pub fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::missing(field));
    }
    Ok(())
}
