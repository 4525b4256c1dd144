use crate::shared::paths::{ensure_dir, get_log_dir};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Keeps the non-blocking writers alive; drop flushes pending lines.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

/// Install the global subscriber writing to `{log_dir}/tasks.log.YYYY-MM-DD`.
///
/// Level defaults to `info` and honours `RUST_LOG`. Returns `None` when a
/// subscriber is already installed or the log directory can't be created; the
/// app keeps running without file logs in that case.
pub fn init_logging() -> Option<LoggingGuards> {
    let log_dir = get_log_dir();

    if let Err(e) = ensure_dir(&log_dir) {
        eprintln!("[TODO] Failed to create logs directory {:?}: {}", log_dir, e);
        return None;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "tasks.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false),
    );

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[TODO] Logging already initialized: {}", e);
        return None;
    }

    tracing::info!(target: "system", "Logging initialized at {:?}", log_dir);

    Some(LoggingGuards {
        _guards: vec![guard],
    })
}
