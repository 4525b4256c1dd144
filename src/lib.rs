pub mod console;
pub mod core;
pub mod plugins;
pub mod shared;

use crate::core::settings::load_settings;
use crate::plugins::tasks::init_task_session;

pub fn run() {
    // Initialize logging first (before any other initialization)
    let logging_guards = core::logging::init_logging();

    let settings = load_settings();
    tracing::info!(
        target: "system",
        timestamp_format = ?settings.timestamp_format,
        delete_persistence = ?settings.delete_persistence,
        undo_window_ms = settings.undo_window_ms,
        "Settings loaded"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    let result = runtime.block_on(async move {
        let session = init_task_session(settings)?;
        console::run_console(session).await
    });

    if let Err(e) = result {
        tracing::error!(target: "system", "Exiting after error: {}", e);
        eprintln!("[TODO] {}", e);
        drop(logging_guards);
        std::process::exit(1);
    }
}
