//! Logging bootstrap for the command line (tracing + env filter).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::Error;

pub const DEFAULT_FILTER: &str = "warn,hateful_strike=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Logs go to stderr, or are appended to `log_file` when given.
pub fn init_logging(log_file: Option<&Path>) -> Result<(), Error> {
    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| Error::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init(),
    };
    installed.map_err(|err| Error::Telemetry(err.to_string()))?;
    tracing::debug!(log_file = ?log_file, "logging initialized");
    Ok(())
}
