//! Unified error handling for the client layer.
//!
//! Three families reach callers:
//! - `AuthError` from the auth backend and session lifecycle
//! - `BackendError` from table operations
//! - validation failures caught before a request is issued

use domain::DomainError;
use thiserror::Error;

// =============================================================================
// Auth
// =============================================================================

/// Failures reported by the auth backend or the session store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    #[error("Email address is invalid or unknown")]
    InvalidEmail,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid or revoked token")]
    InvalidToken,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Auth error {code}: {message}")]
    Rejected { code: String, message: String },
}

impl AuthError {
    /// Stable code for client
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::EmailTaken => "EMAIL_TAKEN",
            AuthError::WeakPassword(_) => "WEAK_PASSWORD",
            AuthError::InvalidEmail => "INVALID_EMAIL",
            AuthError::SessionExpired => "SESSION_EXPIRED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::NotAuthenticated => "NOT_AUTHENTICATED",
            AuthError::Network(_) => "NETWORK_ERROR",
            AuthError::Rejected { .. } => "AUTH_ERROR",
        }
    }

    /// Check if the failure means the current session can no longer be used
    pub fn ends_session(&self) -> bool {
        matches!(self, AuthError::SessionExpired | AuthError::InvalidToken)
    }

    /// Map an auth backend error code (e.g. `invalid_credentials`) and message.
    pub fn from_backend_code(status: u16, code: &str, message: &str) -> Self {
        match code {
            "invalid_credentials" | "invalid_grant"
                if message.to_lowercase().contains("refresh") =>
            {
                AuthError::InvalidToken
            }
            "invalid_credentials" | "invalid_grant" => AuthError::InvalidCredentials,
            "user_already_exists" | "email_exists" => AuthError::EmailTaken,
            "weak_password" => AuthError::WeakPassword(message.to_string()),
            "email_address_invalid" | "validation_failed" => AuthError::InvalidEmail,
            "refresh_token_not_found" | "refresh_token_already_used" | "bad_jwt" => {
                AuthError::InvalidToken
            }
            "session_expired" | "session_not_found" => AuthError::SessionExpired,
            _ if status == 401 => AuthError::InvalidToken,
            _ => AuthError::Rejected {
                code: if code.is_empty() {
                    status.to_string()
                } else {
                    code.to_string()
                },
                message: message.to_string(),
            },
        }
    }
}

// =============================================================================
// Backend
// =============================================================================

/// PostgREST code for "zero rows where exactly one was expected"
pub const CODE_NO_ROWS: &str = "PGRST116";

/// PostgreSQL insufficient_privilege (row-level security rejection)
pub const CODE_INSUFFICIENT_PRIVILEGE: &str = "42501";

/// PostgreSQL unique_violation
pub const CODE_UNIQUE_VIOLATION: &str = "23505";

/// Failures reported by table operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {message}")]
    Unauthorized { code: String, message: String },

    #[error("Constraint violation: {message}")]
    Constraint { code: String, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Backend error {code}: {message}")]
    Rejected { code: String, message: String },
}

impl BackendError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        BackendError::NotFound(entity.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        BackendError::InvalidResponse(msg.into())
    }

    pub fn constraint(code: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Constraint {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Classify an error response from the REST endpoint.
    pub fn from_response(status: u16, code: Option<&str>, message: impl Into<String>) -> Self {
        let message = message.into();
        let code = code.unwrap_or_default();

        if code == CODE_NO_ROWS {
            return BackendError::NotFound(message);
        }
        if status == 401
            || status == 403
            || code == CODE_INSUFFICIENT_PRIVILEGE
            || code.starts_with("PGRST30")
        {
            return BackendError::Unauthorized {
                code: non_empty_code(code, status),
                message,
            };
        }
        // SQLSTATE class 23: integrity constraint violation
        if status == 409 || (code.len() == 5 && code.starts_with("23")) {
            return BackendError::Constraint {
                code: non_empty_code(code, status),
                message,
            };
        }
        if status == 404 {
            return BackendError::NotFound(message);
        }

        BackendError::Rejected {
            code: non_empty_code(code, status),
            message,
        }
    }

    /// Backend-supplied code, or a synthetic one for client-side failures
    pub fn code(&self) -> &str {
        match self {
            BackendError::Network(_) => "NETWORK_ERROR",
            BackendError::NotFound(_) => CODE_NO_ROWS,
            BackendError::Unauthorized { code, .. }
            | BackendError::Constraint { code, .. }
            | BackendError::Rejected { code, .. } => code,
            BackendError::InvalidResponse(_) => "INVALID_RESPONSE",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BackendError::Network(msg)
            | BackendError::NotFound(msg)
            | BackendError::InvalidResponse(msg) => msg,
            BackendError::Unauthorized { message, .. }
            | BackendError::Constraint { message, .. }
            | BackendError::Rejected { message, .. } => message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}

fn non_empty_code(code: &str, status: u16) -> String {
    if code.is_empty() {
        status.to_string()
    } else {
        code.to_string()
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::InvalidResponse(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err.to_string())
    }
}

// =============================================================================
// Application error
// =============================================================================

/// Error surfaced by every client-layer operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Local storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Auth(e) => e.code(),
            AppError::Backend(BackendError::Network(_)) => "NETWORK_ERROR",
            AppError::Backend(BackendError::NotFound(_)) => "NOT_FOUND",
            AppError::Backend(BackendError::Unauthorized { .. }) => "UNAUTHORIZED",
            AppError::Backend(BackendError::Constraint { .. }) => "CONFLICT",
            AppError::Backend(BackendError::InvalidResponse(_)) => "INVALID_RESPONSE",
            AppError::Backend(BackendError::Rejected { .. }) => "BACKEND_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),
            AppError::Auth(AuthError::Network(msg))
            | AppError::Backend(BackendError::Network(msg)) => {
                tracing::error!("Network error: {}", msg);
                "Unable to reach the server. Check your connection and try again".to_string()
            }
            AppError::Backend(BackendError::InvalidResponse(msg)) => {
                tracing::error!("Invalid backend response: {}", msg);
                "The server returned an unexpected response".to_string()
            }
            AppError::Backend(BackendError::Rejected { code, message }) => {
                tracing::error!("Backend error {}: {}", code, message);
                "Something went wrong. Please try again".to_string()
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                "The app is not configured correctly".to_string()
            }
            AppError::Storage(msg) => {
                tracing::error!("Local storage error: {}", msg);
                "Could not save your session on this device".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }

    /// Check if the error is a backend not-found
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Backend(e) if e.is_not_found())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::Validation(err.message())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::Backend(BackendError::not_found(entity)))
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        AppError::Storage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_no_rows() {
        let err = BackendError::from_response(406, Some("PGRST116"), "0 rows");
        assert!(err.is_not_found());
        assert_eq!(err.code(), "PGRST116");
    }

    #[test]
    fn test_classify_unauthorized() {
        let err = BackendError::from_response(401, Some("PGRST301"), "JWT expired");
        assert!(matches!(err, BackendError::Unauthorized { .. }));

        let err = BackendError::from_response(400, Some("42501"), "row-level security");
        assert!(matches!(err, BackendError::Unauthorized { .. }));
    }

    #[test]
    fn test_classify_constraint() {
        let err = BackendError::from_response(409, Some("23505"), "duplicate key");
        assert_eq!(err, BackendError::constraint("23505", "duplicate key"));

        let err = BackendError::from_response(400, Some("23503"), "foreign key");
        assert!(matches!(err, BackendError::Constraint { .. }));
    }

    #[test]
    fn test_classify_other() {
        let err = BackendError::from_response(500, None, "boom");
        assert_eq!(err.code(), "500");
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn test_auth_codes() {
        assert_eq!(
            AuthError::from_backend_code(400, "invalid_credentials", "Invalid login credentials"),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            AuthError::from_backend_code(400, "invalid_grant", "Invalid Refresh Token: Not Found"),
            AuthError::InvalidToken
        );
        assert_eq!(
            AuthError::from_backend_code(422, "user_already_exists", "User already registered"),
            AuthError::EmailTaken
        );
        assert!(matches!(
            AuthError::from_backend_code(422, "weak_password", "too short"),
            AuthError::WeakPassword(_)
        ));
        assert!(AuthError::from_backend_code(401, "", "bad").ends_session());
    }

    #[test]
    fn test_app_error_codes() {
        let err = AppError::from(BackendError::not_found("services"));
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.is_not_found());

        let err = AppError::from(DomainError::missing("Email"));
        assert_eq!(err, AppError::Validation("Email is required".to_string()));
        assert_eq!(err.user_message(), "Email is required");
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::from(BackendError::Rejected {
            code: "XX000".to_string(),
            message: "internal stack".to_string(),
        });
        assert!(!err.user_message().contains("stack"));
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u8> = None;
        assert!(missing.ok_or_not_found("bookings").unwrap_err().is_not_found());
        assert_eq!(Some(1).ok_or_not_found("bookings").unwrap(), 1);
    }
}
