//! CLI command definitions and dispatch.

pub mod lock;
pub mod run;

use clap::{Parser, Subcommand};

use booking_core::config::AppConfig;
use booking_core::error::AppError;

/// Conference booking: seat reservations with a FIFO waitlist
#[derive(Debug, Parser)]
#[command(name = "booking", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to apply on top of default.toml
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Process JSON-line commands from stdin, one reply per line on stdout
    Run(run::RunArgs),
    /// Inspect and administer the lock backend
    Lock(lock::LockArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Run(args) => run::execute(args, config).await,
            Commands::Lock(args) => lock::execute(args, config).await,
        }
    }
}
