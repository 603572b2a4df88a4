//! Fabtech - Application entry point
//!
//! CLI-based entry point that dispatches to the storefront commands.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::AppConfig;
use fabtech::{cli::Cli, commands, AppContext, Output};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose);

    let config = AppConfig::from_env();
    tracing::debug!("Configuration loaded: {:?}", config);

    let output = Output::new(cli.json);
    let result = match AppContext::connect(config, cli.offline, output).await {
        Ok(ctx) => commands::execute(cli.command, &ctx).await,
        Err(e) => Err(e),
    };

    // Handle errors
    if let Err(e) = result {
        tracing::debug!("Command failed: {} ({})", e, e.code());
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber; logs go to stderr so stdout stays parseable
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
