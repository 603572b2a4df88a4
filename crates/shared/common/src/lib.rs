//! Common utilities shared across the client crates.
//!
//! This crate provides:
//! - Unified error handling for auth and table operations
//! - Application configuration

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, AuthError, BackendError, OptionExt};
