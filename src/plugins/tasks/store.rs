use super::errors::TaskError;
use super::helpers::{find_task, find_task_mut, normalize_title, position_of};
use super::types::{ListChange, Task, TaskDraft};
use crate::core::settings::TimestampFormat;
use chrono::{DateTime, Local};
use std::collections::HashSet;

/// Source of "now" for `addedTime`.
pub type Clock = fn() -> DateTime<Local>;

type Observer = Box<dyn FnMut(ListChange)>;

/// Ordered in-memory task list. All mutations go through here.
///
/// Single-threaded by construction: one instance per session, owned by the
/// session controller and lent to whatever renders it.
pub struct TaskStore {
    tasks: Vec<Task>,
    highest_assigned: u32,
    timestamp_format: TimestampFormat,
    clock: Clock,
    observers: Vec<Observer>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(TimestampFormat::default())
    }
}

impl TaskStore {
    pub fn new(timestamp_format: TimestampFormat) -> Self {
        Self {
            tasks: Vec::new(),
            highest_assigned: 0,
            timestamp_format,
            clock: Local::now,
            observers: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Register a listener for list deltas.
    pub fn subscribe(&mut self, observer: impl FnMut(ListChange) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, change: ListChange) {
        for observer in &mut self.observers {
            observer(change);
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        find_task(&self.tasks, id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// `count + 1`, bumped past any id still in the list or handed out before.
    fn next_id(&self) -> Result<u32, TaskError> {
        let by_count = u32::try_from(self.tasks.len())
            .ok()
            .and_then(|count| count.checked_add(1));
        let in_list = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        let past_highest = in_list.max(self.highest_assigned).checked_add(1);

        match (by_count, past_highest) {
            (Some(by_count), Some(past_highest)) => Ok(by_count.max(past_highest)),
            _ => Err(TaskError::IdsExhausted),
        }
    }

    pub fn add(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        let title = normalize_title(&draft.title).ok_or(TaskError::Validation)?;

        let id = self.next_id()?;
        let task = Task {
            id,
            title,
            description: draft.description,
            added_time: self.timestamp_format.format(&(self.clock)()),
            is_important: draft.is_important,
            image_uri: draft.image_uri,
        };

        self.highest_assigned = id;
        self.tasks.push(task.clone());
        tracing::debug!(target: "tasks", id, "Task added");
        self.notify(ListChange::Inserted(self.tasks.len() - 1));

        Ok(task)
    }

    /// Overwrite the editable fields. `id` and `added_time` never change.
    pub fn update(&mut self, id: u32, draft: TaskDraft) -> Result<Task, TaskError> {
        if find_task(&self.tasks, id).is_none() {
            return Err(TaskError::NotFound(id));
        }
        let title = normalize_title(&draft.title).ok_or(TaskError::Validation)?;

        let task = find_task_mut(&mut self.tasks, id).ok_or(TaskError::NotFound(id))?;
        task.title = title;
        task.description = draft.description;
        task.is_important = draft.is_important;
        task.image_uri = draft.image_uri;
        let updated = task.clone();

        tracing::debug!(target: "tasks", id, "Task updated");
        self.notify(ListChange::Reset);

        Ok(updated)
    }

    /// Take a task out of the list, returning it with the index it occupied.
    pub fn remove(&mut self, id: u32) -> Result<(Task, usize), TaskError> {
        let position = position_of(&self.tasks, id).ok_or(TaskError::NotFound(id))?;
        let task = self.tasks.remove(position);

        tracing::debug!(target: "tasks", id, position, "Task removed");
        self.notify(ListChange::Removed(position));

        Ok((task, position))
    }

    /// Put back a task returned by [`TaskStore::remove`].
    ///
    /// The index is clamped to the current length. Does nothing when a task
    /// with the same id is already present.
    pub fn restore(&mut self, task: Task, position: usize) {
        if find_task(&self.tasks, task.id).is_some() {
            tracing::debug!(target: "tasks", id = task.id, "Restore skipped, id already present");
            return;
        }

        let index = position.min(self.tasks.len());
        self.highest_assigned = self.highest_assigned.max(task.id);
        tracing::debug!(target: "tasks", id = task.id, index, "Task restored");
        self.tasks.insert(index, task);
        self.notify(ListChange::Inserted(index));
    }

    /// Swap in a freshly loaded list.
    ///
    /// Older data may carry repeated ids; repeats after the first keep their
    /// place but get fresh ids so every id in the store stays unique. When the
    /// stored ids leave no room above them, the whole list is renumbered from 1.
    pub fn replace_all(&mut self, mut tasks: Vec<Task>) {
        match dedupe_ids(&mut tasks) {
            Some(0) => {}
            Some(renumbered) => {
                tracing::warn!(target: "tasks", renumbered, "Loaded tasks had repeated ids");
            }
            None => {
                for (index, task) in tasks.iter_mut().enumerate() {
                    task.id = u32::try_from(index + 1).unwrap_or(u32::MAX);
                }
                tracing::warn!(
                    target: "tasks",
                    count = tasks.len(),
                    "Loaded ids reached the top of the id range, renumbered"
                );
            }
        }

        self.highest_assigned = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        self.tasks = tasks;
        self.notify(ListChange::Reset);
    }
}

/// Give repeated ids fresh values above the maximum.
///
/// Returns how many were changed, or `None` when that would run past
/// `u32::MAX` or leave no id free for the next add.
fn dedupe_ids(tasks: &mut [Task]) -> Option<usize> {
    let mut seen = HashSet::new();
    let mut next = tasks.iter().map(|t| t.id).max().unwrap_or(0);
    let mut renumbered = 0usize;

    for task in tasks.iter_mut() {
        if !seen.insert(task.id) {
            next = next.checked_add(1)?;
            task.id = next;
            seen.insert(next);
            renumbered += 1;
        }
    }

    next.checked_add(1)?;
    Some(renumbered)
}
