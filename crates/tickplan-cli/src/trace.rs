//! Tracing setup for the tickplan CLI.
//!
//! Logs go to stderr so the schedule printout on stdout stays clean.
//! `RUST_LOG` takes precedence over the `--level` flag when set.

use clap::ValueEnum;
use std::io;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log level options for the CLI.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Show all logs (trace level)
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above
    Info,
    /// Show warnings and above (default)
    Warn,
    /// Show errors only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Initialize the tracing subscriber.
///
/// # Errors
///
/// Fails if the level filter cannot be constructed.
pub fn init(level: LogLevel) -> miette::Result<()> {
    let level = match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(format!(
                "tickplan_cli={level},tickplan_core={level},tickplan_task_graph={level}"
            ))
        })
        .map_err(|e| miette::miette!("failed to create tracing filter: {e}"))?;

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry().with(filter).with(layer).init();
    Ok(())
}
