//! CLI module - Command-line interface for the storefront.
//!
//! Provides commands for:
//! - `login`, `signup`, `logout`, `reset-password` - Session lifecycle
//! - `profile` - Signed-in user's profile
//! - `services`, `reviews`, `subscriptions` - Catalog browsing
//! - `bookings` - Booking management

pub mod args;

pub use args::{Cli, Commands};
