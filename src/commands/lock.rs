//! Lock administration commands.
//!
//! Useful against a shared backend such as Redis; the memory backend starts
//! empty in every process.

use clap::{Args, Subcommand};

use booking_core::config::AppConfig;
use booking_core::error::AppError;
use booking_lock::LockToken;

use crate::{app, output};

/// Arguments for lock commands
#[derive(Debug, Args)]
pub struct LockArgs {
    /// Lock subcommand
    #[command(subcommand)]
    pub command: LockCommand,
}

/// Lock subcommands
#[derive(Debug, Subcommand)]
pub enum LockCommand {
    /// Show who holds a resource key
    Status {
        /// Resource key without the backend prefix, e.g. `Session:session:<id>`
        key: String,
    },
    /// Delete a lock regardless of its owner
    ForceRelease {
        /// Resource key without the backend prefix
        key: String,
    },
    /// Release a lock with its serialized token
    Release {
        /// Token in compact form: {"resourceKey":..,"lockValue":..}
        token: String,
    },
    /// Check that the backend is reachable
    Health,
}

/// Execute lock commands
pub async fn execute(args: &LockArgs, config: &AppConfig) -> Result<(), AppError> {
    let lock = app::build_lock(config).await?;

    match &args.command {
        LockCommand::Status { key } => match lock.holder(key).await? {
            Some(value) => {
                println!("Lock status:");
                output::print_kv("Key", key);
                output::print_kv("Holder", &value);
            }
            None => output::print_warning(&format!("{key} is not locked")),
        },
        LockCommand::ForceRelease { key } => {
            if lock.force_release(key).await? {
                output::print_success(&format!("Released {key}"));
            } else {
                output::print_warning(&format!("{key} was not locked"));
            }
        }
        LockCommand::Release { token } => {
            let token = LockToken::parse(token)?;
            if lock.release(&token).await? {
                output::print_success(&format!("Released {}", token.resource_key));
            } else {
                output::print_warning("Token does not own the lock; nothing released");
            }
        }
        LockCommand::Health => {
            if !lock.health_check().await? {
                return Err(AppError::lock_backend("Lock backend is unhealthy"));
            }
            output::print_success(&format!("Lock backend '{}' is healthy", config.lock.backend));
        }
    }

    Ok(())
}
