//! Command handlers. Each is a thin caller over the library crates.

pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod profile;

use common::AppResult;

use crate::cli::Commands;
use crate::context::AppContext;

/// Execute a parsed command
pub async fn execute(command: Commands, ctx: &AppContext) -> AppResult<()> {
    match command {
        Commands::Login(args) => auth::login(args, ctx).await,
        Commands::Signup(args) => auth::signup(args, ctx).await,
        Commands::Logout => auth::logout(ctx).await,
        Commands::ResetPassword { email } => auth::reset_password(&email, ctx).await,
        Commands::Profile { action } => profile::execute(action, ctx).await,
        Commands::Services { action } => catalog::services(action, ctx).await,
        Commands::Reviews { action } => catalog::reviews(action, ctx).await,
        Commands::Subscriptions { action } => catalog::subscriptions(action, ctx).await,
        Commands::Bookings { action } => bookings::execute(action, ctx).await,
    }
}
