use crate::shared::errors::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    /// Rejected user input; the store was not touched.
    #[error("Task title cannot be empty")]
    Validation,

    /// The id did not come from this store, or was already removed.
    #[error("Task not found: {0}")]
    NotFound(u32),

    #[error("No task ids left to assign")]
    IdsExhausted,

    #[error("Stored tasks are corrupt: {0}")]
    CorruptData(#[source] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TaskError {
    /// Errors the user can fix by re-entering input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TaskError::Validation)
    }
}
