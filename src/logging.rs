//! Console + rolling file logging
//!
//! Logs go to the terminal and to daily files `<log_dir>/spectre.log.YYYY-MM-DD`.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,spectre=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn console_layer<S>() -> fmt::Layer<S> {
    fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
}

/// Install the global subscriber.
///
/// If `log_dir` cannot be created, only the console layer is installed.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging(log_dir: &Path) {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        let installed = tracing_subscriber::registry()
            .with(env_filter())
            .with(console_layer())
            .try_init()
            .is_ok();
        if installed {
            tracing::warn!("Log directory {:?} unavailable ({}); logging to console only", log_dir, e);
        }
        return;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "spectre.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    let installed = tracing_subscriber::registry()
        .with(env_filter())
        .with(console_layer())
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        // The writer must outlive every log call, so the guard lives until exit
        std::mem::forget(guard);
        tracing::info!("Logging initialized. Log directory: {:?}", log_dir);
    }
}
