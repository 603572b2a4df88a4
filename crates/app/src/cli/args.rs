//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use domain::BookingStatus;

/// Fabtech - manufacturing services marketplace client
#[derive(Parser, Debug)]
#[command(name = "fabtech")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Serve data from the built-in sample dataset instead of the backend
    #[arg(long, global = true, env = "FABTECH_OFFLINE")]
    pub offline: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login(LoginArgs),

    /// Create an account
    Signup(SignupArgs),

    /// Sign out and forget the stored session
    Logout,

    /// Email a password reset link
    ResetPassword {
        email: String,
    },

    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Browse the service catalog
    Services {
        #[command(subcommand)]
        action: ServicesAction,
    },

    /// Manage your bookings
    Bookings {
        #[command(subcommand)]
        action: BookingsAction,
    },

    /// Read or write service reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewsAction,
    },

    /// Subscription plans
    Subscriptions {
        #[command(subcommand)]
        action: SubscriptionsAction,
    },
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    pub email: String,

    #[arg(short, long, env = "FABTECH_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    pub email: String,

    #[arg(short, long, env = "FABTECH_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Display name stored with the account
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Show the signed-in user's profile
    Show,
    /// Change profile fields; omitted fields are kept
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServicesAction {
    /// List services, newest first
    List,
    /// Search title, description and category
    Search { query: String },
    /// Show one service with its reviews
    Show { id: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum BookingsAction {
    /// List current bookings and history
    List,
    /// Book a service
    Create {
        /// Service id
        #[arg(long)]
        service: Uuid,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Time slot, e.g. "2:00 PM"
        #[arg(long)]
        time: String,
        /// Agreed price; defaults to the service's listed price
        #[arg(long)]
        price: Option<f64>,
    },
    /// Move a booking to another status
    Status {
        id: Uuid,
        /// confirmed, in-progress, completed or cancelled
        status: BookingStatus,
    },
    /// Delete a booking
    Delete { id: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum ReviewsAction {
    /// Reviews for a service, newest first
    List { service: Uuid },
    /// Review a service
    Add {
        service: Uuid,
        /// 1 to 5
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubscriptionsAction {
    /// Plans, cheapest first
    List,
}
