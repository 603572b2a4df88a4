//! Auth Service Library
//!
//! Session lifecycle for the storefront client: sign-in, sign-up,
//! sign-out, password reset, background token refresh and session
//! persistence between runs.

pub mod client;
pub mod config;
pub mod service;
pub mod storage;

pub use client::{AuthApi, AuthResult, GoTrueClient, SignUpOutcome};
pub use config::SessionConfig;
pub use service::{AuthState, SessionStore};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};

#[cfg(any(test, feature = "test-utils"))]
pub use client::MockAuthApi;
#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockSessionStorage;
