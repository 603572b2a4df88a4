//! Fabtech command-line client.
//!
//! A thin shell over the storefront libraries: session lifecycle from
//! `auth-service`, catalog and bookings from `marketplace-service`.

pub mod cli;
pub mod commands;
pub mod context;
pub mod output;

pub use context::AppContext;
pub use output::Output;
