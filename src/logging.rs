//! Logging setup: append-mode run log plus progress on stdout.

use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

/// Initialize tracing.
///
/// Everything at DEBUG and above is appended to `log_file`; stdout gets
/// progress lines filtered by `RUST_LOG` (default `info`).
pub fn init(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(LevelFilter::DEBUG);

    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_filter(stdout_filter);

    Registry::default()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;
    Ok(())
}
