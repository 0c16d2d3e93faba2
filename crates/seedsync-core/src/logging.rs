//! Logging init: append to `<working_dir>/log` and echo to stdout, or fall back to stderr.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Name of the log file inside the working directory.
pub const LOG_FILE_NAME: &str = "log";

const DEFAULT_FILTER: &str = "info,seedsync_core=debug,seedsync=debug";

/// Writer that copies every line to the log file (when the clone succeeded) and stdout.
struct TeeWriter {
    file: Option<fs::File>,
}

impl io::Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(f) = self.file.as_mut() {
            f.write_all(buf)?;
        }
        io::stdout().lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(f) = self.file.as_mut() {
            f.flush()?;
        }
        io::stdout().lock().flush()
    }
}

struct FileMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TeeWriter {
            file: self.0.try_clone().ok(),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Path of the log file for a working directory.
pub fn log_path(working_dir: &Path) -> PathBuf {
    working_dir.join(LOG_FILE_NAME)
}

/// Initialize structured logging to `<working_dir>/log` (append) plus stdout.
/// On failure (e.g. working dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging(working_dir: &Path) -> Result<()> {
    fs::create_dir_all(working_dir)
        .with_context(|| format!("create working dir {}", working_dir.display()))?;
    let log_file_path = log_path(working_dir);

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("open log file {}", log_file_path.display()))?;

    let writer: BoxMakeWriter = BoxMakeWriter::new(FileMakeWriter(file));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::debug!("logging initialized at {}", log_file_path.display());

    Ok(())
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails so the CLI doesn't crash.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
