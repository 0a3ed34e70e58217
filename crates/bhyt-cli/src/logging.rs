//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Settlement rows carry patient identifiers, so row-level values never
//! reach the logs unless the operator explicitly passes `--log-data`;
//! everything else goes through the usual leveled, env-filterable
//! subscriber with pretty / compact / json output.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when row-level logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Returns the input value when row-level logging is enabled, otherwise a
/// redacted token.
pub fn redact_value(value: &str) -> &str {
    if LOG_DATA_ENABLED.load(Ordering::Relaxed) {
        value
    } else {
        REDACTED_VALUE
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override the level when no explicit flag was given.
    pub use_env_filter: bool,
    pub format: LogFormat,
    /// When set, logs go to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    pub with_ansi: bool,
    /// Whether row-level (patient) values may be logged.
    pub log_data: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            format: LogFormat::default(),
            log_file: None,
            with_ansi: true,
            log_data: false,
        }
    }
}

/// Initialize the global tracing subscriber. Call once at startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        init_logging_with_writer(config, SharedFileWriter::new(file));
    } else {
        init_logging_with_writer(config, io::stderr);
    }
    Ok(())
}

/// Initialize logging with a custom writer (useful for testing).
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Release);
    let filter = build_env_filter(config);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(writer).with_target(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl SharedFileWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<std::fs::File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

/// Build an `EnvFilter` for our crates at the configured level, keeping
/// external crates at warn to reduce noise.
fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let level = config.level_filter.to_string().to_lowercase();
    let default_directives = format!(
        "warn,bhyt={level},bhyt_core={level},bhyt_ingest={level},\
         bhyt_model={level},bhyt_report={level},bhyt_store={level}"
    );
    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
    } else {
        EnvFilter::new(default_directives)
    }
}
