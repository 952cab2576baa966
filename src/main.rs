//! Game panel file explorer
//!
//! Entry point: loads configuration, initializes logging, and runs one
//! explorer command against the configured server directory.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use explorer_cli::Cli;
use explorer_core::config::{AppConfig, LoggingConfig};
use explorer_core::error::AppError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = cli.execute(&config).await {
        tracing::debug!(kind = %e.kind, "Command failed");
        eprintln!("Error: {}", e.message);
        std::process::exit(1);
    }
}

/// Load configuration from file, environment overlay, and `EXPLORER__*` variables
fn load_configuration(cli: &Cli) -> Result<AppConfig, AppError> {
    let env = std::env::var("EXPLORER_ENV").unwrap_or_else(|_| cli.env.clone());
    AppConfig::load_from(&cli.config, &env)
}

/// Initialize tracing/logging on stderr so command output stays clean
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
