use super::errors::TaskError;
use super::preferences::KeyValueStore;
use super::types::Task;
use crate::shared::errors::StorageError;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Preference key holding the serialized task list.
pub const TASKS_KEY: &str = "tasks";

// ============================================================================
// Serialization
// ============================================================================

pub fn serialize_tasks(tasks: &[Task]) -> Result<String, TaskError> {
    serde_json::to_string(tasks).map_err(|e| TaskError::Storage(StorageError::Parse(e)))
}

pub fn parse_tasks(json: &str) -> Result<Vec<Task>, TaskError> {
    serde_json::from_str(json).map_err(TaskError::CorruptData)
}

// ============================================================================
// Ordered Writer
// ============================================================================

enum WriteCommand {
    /// `None` removes the key.
    Write(Option<String>),
    Flush(Sender<()>),
}

fn writer_loop(rx: Receiver<WriteCommand>, store: Arc<dyn KeyValueStore>) {
    let mut queued: Option<WriteCommand> = None;

    loop {
        let command = match queued.take() {
            Some(command) => command,
            None => match rx.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        match command {
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
            }
            WriteCommand::Write(value) => {
                // Newer snapshots already queued supersede this one
                let mut latest = value;
                let mut skipped = 0usize;
                loop {
                    match rx.try_recv() {
                        Ok(WriteCommand::Write(next)) => {
                            latest = next;
                            skipped += 1;
                        }
                        Ok(flush) => {
                            queued = Some(flush);
                            break;
                        }
                        Err(_) => break,
                    }
                }

                if skipped > 0 {
                    tracing::trace!(target: "tasks::storage", skipped, "Coalesced queued saves");
                }
                apply_write(store.as_ref(), latest);
            }
        }
    }

    tracing::debug!(target: "tasks::storage", "Writer stopped");
}

fn apply_write(store: &dyn KeyValueStore, value: Option<String>) {
    let result = match &value {
        Some(json) => store.put_string(TASKS_KEY, json),
        None => store.remove(TASKS_KEY),
    };

    match result {
        Ok(()) => tracing::debug!(
            target: "tasks::storage",
            cleared = value.is_none(),
            "Tasks persisted"
        ),
        Err(e) => tracing::error!(target: "tasks::storage", "Failed to persist tasks: {}", e),
    }
}

// ============================================================================
// Gateway
// ============================================================================

/// Load and save the whole task list under [`TASKS_KEY`].
///
/// Saves are handed to a single writer thread, so they land in the order they
/// were invoked and a stale snapshot can never overwrite a newer one.
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
    tx: Option<Sender<WriteCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let (tx, rx) = mpsc::channel::<WriteCommand>();
        let writer_store = Arc::clone(&store);

        let handle = thread::Builder::new()
            .name("tasks-writer".to_string())
            .spawn(move || writer_loop(rx, writer_store))?;

        Ok(Self {
            store,
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    fn send(&self, command: WriteCommand) -> bool {
        match &self.tx {
            Some(tx) => tx.send(command).is_ok(),
            None => false,
        }
    }

    /// Snapshot `tasks` now and persist it in the background.
    pub fn save(&self, tasks: &[Task]) -> Result<(), TaskError> {
        let json = serialize_tasks(tasks)?;
        tracing::debug!(target: "tasks::storage", count = tasks.len(), "Save queued");

        if !self.send(WriteCommand::Write(Some(json))) {
            tracing::error!(target: "tasks::storage", "Writer is gone, save dropped");
        }
        Ok(())
    }

    /// Drop the stored list entirely.
    pub fn clear(&self) {
        if !self.send(WriteCommand::Write(None)) {
            tracing::error!(target: "tasks::storage", "Writer is gone, clear dropped");
        }
    }

    /// Block until every save queued before this call has been written.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.send(WriteCommand::Flush(ack_tx)) {
            let _ = ack_rx.recv();
        }
    }

    /// Read the stored list. Absent key means no tasks yet.
    pub fn load(&self) -> Result<Vec<Task>, TaskError> {
        self.flush();

        let stored = match self.store.get_string(TASKS_KEY) {
            Ok(stored) => stored,
            // The container itself is unreadable, same outcome as a bad value
            Err(StorageError::Parse(e)) => return Err(TaskError::CorruptData(e)),
            Err(e) => return Err(e.into()),
        };

        match stored {
            Some(json) => {
                let tasks = parse_tasks(&json)?;
                tracing::info!(target: "tasks", "Loaded {} tasks", tasks.len());
                Ok(tasks)
            }
            None => Ok(Vec::new()),
        }
    }
}

impl Drop for PersistenceGateway {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain and exit
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
