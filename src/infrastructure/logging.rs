//! Logging initialization.
//!
//! Console output goes to stderr so report text and JSON results on stdout
//! stay machine-readable. File logging, when configured, is always JSON
//! with daily rotation.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::models::LoggingConfig;

/// Keeps the non-blocking file writer alive for the process lifetime.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    let level = parse_level(&config.level)?;
    let filter = || {
        EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy()
    };

    let guard = if let Some(log_dir) = &config.log_dir {
        let appender = rolling::daily(log_dir, "fixpoint.log");
        let (file_writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_target(true)
            .with_filter(filter());

        match config.format.as_str() {
            "json" => {
                let console = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_filter(filter());
                tracing_subscriber::registry()
                    .with(file_layer)
                    .with(console)
                    .init();
            }
            _ => {
                let console = tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(filter());
                tracing_subscriber::registry()
                    .with(file_layer)
                    .with(console)
                    .init();
            }
        }
        Some(guard)
    } else {
        match config.format.as_str() {
            "json" => {
                let console = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_filter(filter());
                tracing_subscriber::registry().with(console).init();
            }
            _ => {
                let console = tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(filter());
                tracing_subscriber::registry().with(console).init();
            }
        }
        None
    };

    Ok(LogGuard { _guard: guard })
}

fn parse_level(level: &str) -> Result<Level> {
    match level {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(anyhow!("invalid log level: {other}")),
    }
}
