//! Veil CLI - keep a single file encrypted under a passphrase
//!
//! This is the command-line interface for Veil. It stores one payload in a
//! container file through the `veil-core` overlay.

mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod passphrase;

use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::Cli;
use errors::CliError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    if let Err(err) = commands::run(cli).await {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            cli_err.exit();
        }
        return Err(err);
    }
    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}
