//! Auth backend client.

mod gotrue;

use async_trait::async_trait;
use uuid::Uuid;

use common::AuthError;
use domain::{Credentials, Session, SignUpRequest};

pub use gotrue::GoTrueClient;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

pub type AuthResult<T> = Result<T, AuthError>;

/// Result of a registration.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The backend issued tokens straight away
    SignedIn(Session),
    /// The identity exists but the email must be confirmed before sign-in
    ConfirmationPending { identity_id: Uuid, email: String },
}

/// Operations the session store needs from the auth backend.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Session>;

    async fn sign_up(&self, request: &SignUpRequest) -> AuthResult<SignUpOutcome>;

    /// Revoke the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> AuthResult<()>;

    /// Ask the backend to email a password reset link
    async fn reset_password(&self, email: &str) -> AuthResult<()>;

    /// Exchange a refresh token for a new session
    async fn refresh(&self, refresh_token: &str) -> AuthResult<Session>;
}
