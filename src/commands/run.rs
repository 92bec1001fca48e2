//! JSON-lines command loop.

use std::path::PathBuf;

use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use booking_core::config::AppConfig;
use booking_core::error::AppError;
use booking_service::commands;

use crate::{app, output};

/// Arguments for the run command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Read commands from this file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

/// Execute the run command
pub async fn execute(args: &RunArgs, config: &AppConfig) -> Result<(), AppError> {
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown requested");
                cancel.cancel();
            }
        }
    });

    let service = app::build_service(config, cancel.clone()).await?;

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    let mut lines = reader.lines();
    let mut stdout = tokio::io::stdout();
    let mut processed = 0usize;

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match commands::parse_request(&line) {
            Ok(request) => commands::handle(&service, request).await?,
            Err(reply) => reply,
        };
        output::write_reply(&mut stdout, &reply).await?;
        processed += 1;
    }

    tracing::info!(processed, "Command loop finished");
    Ok(())
}
