pub mod errors;
pub mod helpers;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;
pub mod undo;

pub use errors::TaskError;
pub use preferences::{FilePreferences, KeyValueStore, MemoryPreferences};
pub use session::TaskSession;
pub use storage::{PersistenceGateway, TASKS_KEY};
pub use store::TaskStore;
pub use types::{ListChange, Task, TaskDraft};

use crate::core::settings::AppSettings;
use crate::shared::paths::get_preferences_path;
use std::sync::Arc;

/// Start a session backed by the app's preferences file.
pub fn init_task_session(settings: AppSettings) -> Result<TaskSession, TaskError> {
    let prefs = FilePreferences::open(get_preferences_path(&settings.preferences_name))?;
    tracing::info!(target: "tasks", "Using preferences at {:?}", prefs.path());
    TaskSession::start(settings, Arc::new(prefs))
}
