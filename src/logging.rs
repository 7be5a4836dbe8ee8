//! Logging setup
//!
//! Two `tracing-subscriber` fmt layers share one `EnvFilter`: the console, and a plain-text copy written to
//! `[LogPath]` so a CI job keeps the full transcript of a run.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over `verbose`. A log file that cannot be created is reported on stderr and skipped; logging
/// setup never fails the run.
pub fn init(verbose: bool, log_file: Option<&Path>) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            eprintln!("warning: cannot open log file '{}': {}", path.display(), e);
            None
        }
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// Log a section heading for a build phase.
pub fn heading(title: &str) {
    tracing::info!("");
    tracing::info!("=================== {} ===================", title);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_file_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("samplebuild_log_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("Log.txt");

        open_log_file(&path).unwrap();
        assert!(path.is_file());

        let _ = fs::remove_dir_all(&dir);
    }
}
