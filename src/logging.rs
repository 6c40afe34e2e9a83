//! Tracing setup.
//!
//! Commands log to stderr. The TUI owns the terminal, so it logs to a file in
//! the data directory instead.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "MEWFOCUS_LOG";
pub const DEFAULT_FILTER: &str = "warn";
pub const LOG_FILE: &str = "mewfocus.log";

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

fn filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Safe to call once; later calls are ignored.
pub fn init(directives: &str, target: LogTarget, data_dir: &Path) {
    let result = match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter(directives))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
        LogTarget::File => {
            let path = data_dir.join(LOG_FILE);
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => tracing_subscriber::fmt()
                    .with_env_filter(filter(directives))
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .try_init(),
                Err(e) => {
                    eprintln!("Could not open log file {}: {e}", path.display());
                    return;
                }
            }
        }
    };
    // A subscriber is already installed (tests, or a second init).
    let _ = result;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_target_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        init("debug", LogTarget::File, dir.path());
        assert!(dir.path().join(LOG_FILE).exists());
    }
}
