//! Tracing setup. Events go to `imadl.log` under the XDG state dir; the CLI
//! falls back to stderr when that file cannot be opened.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,imadl=debug,imadl_core=debug";
const LOG_FILE: &str = "imadl.log";

/// Installs the global subscriber writing to `~/.local/state/imadl/imadl.log`.
/// Returns the log path so the CLI can point the user at it.
pub fn init_logging() -> Result<PathBuf> {
    let state_dir = xdg::BaseDirectories::with_prefix("imadl")?.get_state_home();
    let (path, file) = open_log_file(&state_dir)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(path)
}

/// Stderr-only subscriber, for when the log file is unavailable.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Creates `dir` if needed and opens the log file inside it for appending.
fn open_log_file(dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(dir).with_context(|| format!("creating log dir {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    Ok((path, file))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
