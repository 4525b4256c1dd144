use super::errors::TaskError;
use super::preferences::KeyValueStore;
use super::storage::PersistenceGateway;
use super::store::TaskStore;
use super::types::{Task, TaskDraft};
use super::undo::{transition, UndoEffect, UndoEvent, UndoState};
use crate::core::settings::{AppSettings, DeletePersistence};
use std::sync::Arc;
use std::time::Instant;

/// One running app session: the task list, its persistence and the undo
/// window, wired together.
pub struct TaskSession {
    store: TaskStore,
    gateway: PersistenceGateway,
    undo: UndoState,
    settings: AppSettings,
    /// Set by [`TaskSession::stop`], cleared by any later change.
    stopped: bool,
}

impl TaskSession {
    /// Open the gateway over `prefs` and load the saved list.
    ///
    /// Corrupt saved data is logged and the session starts empty; the bad
    /// value stays on disk until the next save replaces it.
    pub fn start(settings: AppSettings, prefs: Arc<dyn KeyValueStore>) -> Result<Self, TaskError> {
        let gateway = PersistenceGateway::new(prefs)?;
        let mut store = TaskStore::new(settings.timestamp_format);

        match gateway.load() {
            Ok(tasks) => store.replace_all(tasks),
            Err(TaskError::CorruptData(e)) => {
                tracing::warn!(target: "tasks", "Saved tasks unreadable, starting empty: {}", e);
            }
            Err(e) => return Err(e),
        }

        tracing::info!(target: "tasks", "Session started with {} tasks", store.len());
        Ok(Self {
            store,
            gateway,
            undo: UndoState::Idle,
            settings,
            stopped: false,
        })
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore {
        self.stopped = false;
        &mut self.store
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// When [`TaskSession::tick`] next has work to do.
    pub fn undo_deadline(&self) -> Option<Instant> {
        self.undo.deadline()
    }

    pub fn add(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        self.stopped = false;
        self.store.add(draft)
    }

    pub fn edit(&mut self, id: u32, draft: TaskDraft) -> Result<Task, TaskError> {
        self.stopped = false;
        self.store.update(id, draft)
    }

    pub fn toggle_important(&mut self, id: u32) -> Result<Task, TaskError> {
        self.stopped = false;
        let task = self.store.get(id).ok_or(TaskError::NotFound(id))?;
        let draft = TaskDraft::from_task(task).important(!task.is_important);
        self.store.update(id, draft)
    }

    pub fn set_image(&mut self, id: u32, image_uri: Option<String>) -> Result<Task, TaskError> {
        self.stopped = false;
        let task = self.store.get(id).ok_or(TaskError::NotFound(id))?;
        let draft = TaskDraft::from_task(task).image(image_uri);
        self.store.update(id, draft)
    }

    /// Remove a task and open the undo window for it.
    pub fn delete(&mut self, id: u32, now: Instant) -> Result<Vec<UndoEffect>, TaskError> {
        self.stopped = false;
        let (task, position) = self.store.remove(id)?;

        if self.settings.delete_persistence == DeletePersistence::Immediate {
            self.gateway.save(self.store.tasks())?;
        }

        self.dispatch(UndoEvent::Deleted {
            task,
            position,
            at: now,
            window: self.settings.undo_window(),
        })
    }

    /// Put back the task removed last, if its window is still open.
    pub fn undo(&mut self) -> Result<Option<Task>, TaskError> {
        self.stopped = false;
        let effects = self.dispatch(UndoEvent::UndoRequested)?;
        let restored = effects.into_iter().find_map(|effect| match effect {
            UndoEffect::Restore { task, .. } => Some(task),
            _ => None,
        });
        Ok(restored)
    }

    pub fn tick(&mut self, now: Instant) -> Result<Vec<UndoEffect>, TaskError> {
        self.stopped = false;
        self.dispatch(UndoEvent::Tick { now })
    }

    /// App going to the background: settle any pending delete and save.
    pub fn stop(&mut self) -> Result<(), TaskError> {
        self.dispatch(UndoEvent::Dismissed)?;
        self.gateway.save(self.store.tasks())?;
        self.gateway.flush();
        self.stopped = true;
        tracing::info!(target: "tasks", "Session stopped with {} tasks", self.store.len());
        Ok(())
    }

    /// Remove every task, persisted right away. Not undoable.
    pub fn clear(&mut self) {
        self.stopped = false;
        self.undo = UndoState::Idle;
        self.store.replace_all(Vec::new());
        self.gateway.clear();
        tracing::info!(target: "tasks", "All tasks cleared");
    }

    fn dispatch(&mut self, event: UndoEvent) -> Result<Vec<UndoEffect>, TaskError> {
        let state = std::mem::take(&mut self.undo);
        let (state, effects) = transition(state, event);
        self.undo = state;

        for effect in &effects {
            match effect {
                UndoEffect::Restore { task, position } => {
                    self.store.restore(task.clone(), *position);
                }
                UndoEffect::CommitRemoval { task_id } => {
                    tracing::debug!(target: "tasks", task_id, "Removal committed");
                    self.gateway.save(self.store.tasks())?;
                }
                UndoEffect::ShowUndoPrompt { .. } | UndoEffect::HideUndoPrompt => {}
            }
        }

        Ok(effects)
    }
}

impl Drop for TaskSession {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        if let Err(e) = self.stop() {
            tracing::error!(target: "tasks", "Failed to save on shutdown: {}", e);
        }
    }
}
