//! Output helpers for CLI commands.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use booking_core::result::AppResult;
use booking_service::CommandReply;

/// Write one reply as a JSON line and flush it.
pub async fn write_reply<W>(out: &mut W, reply: &CommandReply) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(reply)?;
    line.push(b'\n');
    out.write_all(&line).await?;
    out.flush().await?;
    Ok(())
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}
