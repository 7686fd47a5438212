//! Structured Logger
//!
//! Wraps `tracing` with environment-based level control, a console layer
//! (plain or JSON) and an optional daily-rotated NDJSON file.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// File name prefix for rotated logs (`cardread.log.YYYY-MM-DD`).
const LOG_FILE_PREFIX: &str = "cardread.log";

/// How the global subscriber should be assembled.
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for the rolling file; no file output when `None`.
    pub dir: Option<PathBuf>,
    /// JSON console output instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            json: false,
        }
    }
}

/// Build the filter: `RUST_LOG` wins, then the configured level, then `info`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global structured logger.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger(options: &LoggerOptions) {
    let console_layer = if options.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
            .boxed()
    };

    let file_layer = options.dir.as_ref().map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer()
            .json()
            .with_writer(appender)
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(build_filter(&options.level))
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
