//! Tracing initialization.
//!
//! - Level comes from `RUST_LOG` when set, otherwise `info` (`debug` when verbose).
//! - Events go to stderr in a compact format with a local timestamp.
//! - With a log file, a second non-blocking layer appends the same events to it.

use anyhow::{Context, Result};
use chrono::Local;
use std::fmt as stdfmt;
use std::fs::OpenOptions;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

/// Local timestamp formatter (YYYY-MM-DD HH:MM:SS).
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

/// Installs the global subscriber.
///
/// Returns the file writer's guard when `log_file` is given; it must be held
/// until exit so buffered lines are flushed.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let stderr_layer = tsfmt::layer()
        .with_timer(LocalTime)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    let Some(path) = log_file else {
        registry()
            .with(env_filter(verbose))
            .with(stderr_layer)
            .try_init()
            .context("failed to install tracing subscriber")?;
        return Ok(None);
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let file_layer = tsfmt::layer()
        .with_timer(LocalTime)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer);

    registry()
        .with(env_filter(verbose))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(Some(guard))
}
