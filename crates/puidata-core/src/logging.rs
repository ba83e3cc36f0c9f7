//! Logging init driven by the `[logging]` config section.
//!
//! Filter precedence: `RUST_LOG`, then `logging.filter`, then a built-in
//! default. Events go to `logging.file` (or `puidata.log` under the XDG state
//! dir); `init_logging_stderr` is the fallback when that file cannot be opened.

use crate::config::LoggingSettings;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,puidata=debug,puidata_core=debug";

/// Picks the filter directives; an empty value counts as unset.
fn directives(settings: &LoggingSettings, from_env: Option<String>) -> String {
    from_env
        .filter(|s| !s.trim().is_empty())
        .or_else(|| settings.filter.clone().filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    let wanted = directives(settings, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    EnvFilter::try_new(&wanted).unwrap_or_else(|err| {
        eprintln!("puidata: ignoring log filter {:?}: {}", wanted, err);
        EnvFilter::new(DEFAULT_FILTER)
    })
}

fn log_file_path(settings: &LoggingSettings) -> Result<PathBuf> {
    if let Some(path) = &settings.file {
        return Ok(path.clone());
    }
    let dirs = xdg::BaseDirectories::with_prefix("puidata")?;
    Ok(dirs.get_state_home().join("puidata.log"))
}

/// Hands each event a clone of the log file handle.
struct SharedLogFile(File);

/// Clone of the log file, or stderr when the handle cannot be duplicated.
enum LogSink {
    File(File),
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.0.try_clone().map(LogSink::File).unwrap_or(LogSink::Stderr)
    }
}

/// Installs the global subscriber writing to the configured log file.
///
/// Returns Err when the file cannot be opened so the caller can fall back
/// to `init_logging_stderr`.
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let path = log_file_path(settings)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings))
        .with_writer(SharedLogFile(file))
        .with_ansi(false)
        .init();

    tracing::info!(log_file = %path.display(), "puidata logging initialized");
    Ok(())
}

/// Installs the global subscriber on stderr.
pub fn init_logging_stderr(settings: &LoggingSettings) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings))
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}
