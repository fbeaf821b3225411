use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "couch-iptv.log";

/// Route tracing output to a log file so it never draws over the TUI.
/// An explicit `level` wins over `RUST_LOG`; without either, `info`.
pub fn init(dir: &Path, level: Option<&str>) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let log_path = dir.join(LOG_FILE);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    Ok(log_path)
}
