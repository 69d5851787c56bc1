// Tracing setup for the binaries
//
// RUST_LOG wins over the configured filter. The TUI logs to a file because
// the terminal is in raw mode while it runs.

use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Log to stderr (CLI and server)
pub fn init_stderr(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Installing log subscriber: {}", e))
}

/// Append logs to `path` (TUI)
pub fn init_file(default_filter: &str, path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!("Installing log subscriber: {}", e))
}
