//! Diagnostic log setup.
//!
//! Events go to an append-only file (`RENT_LOG`, default
//! `/var/log/rent/rent.log`) filtered by `RUST_LOG` (default `info`). When the
//! file cannot be opened the log falls back to stderr.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_PATH: &str = "/var/log/rent/rent.log";

/// Log file location from `RENT_LOG`, or the default.
pub fn log_path() -> PathBuf {
    log_path_from(std::env::var("RENT_LOG").ok())
}

fn log_path_from(value: Option<String>) -> PathBuf {
    value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH))
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_line_number(true);

    match open_log(path) {
        Ok(file) => builder.with_writer(Mutex::new(file)).init(),
        Err(e) => {
            builder.with_writer(io::stderr).init();
            tracing::warn!(path = %path.display(), error = %e, "cannot open log file, logging to stderr");
        }
    }
}
