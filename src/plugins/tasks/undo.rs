//! Soft-delete grace period as a pure state machine.
//!
//! `transition(state, event) -> (state, effects)`; the caller runs the
//! effects against the store and the persistence gateway. Invalid transitions
//! return the current state with no effects.

use super::types::Task;
use std::time::{Duration, Instant};

/// A removed task waiting out its undo window.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRemoval {
    pub task: Task,
    pub position: usize,
    pub deadline: Instant,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum UndoState {
    #[default]
    Idle,
    Pending(PendingRemoval),
}

impl UndoState {
    pub fn is_pending(&self) -> bool {
        matches!(self, UndoState::Pending(_))
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self {
            UndoState::Pending(pending) => Some(pending.deadline),
            UndoState::Idle => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum UndoEvent {
    /// A task was just taken out of the store.
    Deleted {
        task: Task,
        position: usize,
        at: Instant,
        window: Duration,
    },
    UndoRequested,
    /// Timer check; closes the window once `now` reaches the deadline.
    Tick { now: Instant },
    /// The prompt went away without an undo (replaced, swiped, app stopping).
    Dismissed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UndoEffect {
    ShowUndoPrompt { task_id: u32, deadline: Instant },
    HideUndoPrompt,
    /// Put the task back into the store.
    Restore { task: Task, position: usize },
    /// The removal is final; persist the current list.
    CommitRemoval { task_id: u32 },
}

pub fn transition(state: UndoState, event: UndoEvent) -> (UndoState, Vec<UndoEffect>) {
    match (state, event) {
        // Idle + Deleted -> Pending
        (
            UndoState::Idle,
            UndoEvent::Deleted {
                task,
                position,
                at,
                window,
            },
        ) => open_window(task, position, at + window, Vec::new()),

        // Pending + Deleted -> Pending (newer one), the older removal is final
        (
            UndoState::Pending(previous),
            UndoEvent::Deleted {
                task,
                position,
                at,
                window,
            },
        ) => {
            let effects = vec![UndoEffect::CommitRemoval {
                task_id: previous.task.id,
            }];
            open_window(task, position, at + window, effects)
        }

        // Pending + UndoRequested -> Idle
        (UndoState::Pending(pending), UndoEvent::UndoRequested) => (
            UndoState::Idle,
            vec![
                UndoEffect::HideUndoPrompt,
                UndoEffect::Restore {
                    task: pending.task,
                    position: pending.position,
                },
            ],
        ),

        // Pending + Tick past deadline -> Idle
        (UndoState::Pending(pending), UndoEvent::Tick { now }) if now >= pending.deadline => {
            commit(pending)
        }

        // Pending + Dismissed -> Idle
        (UndoState::Pending(pending), UndoEvent::Dismissed) => commit(pending),

        (state, _) => (state, vec![]),
    }
}

fn open_window(
    task: Task,
    position: usize,
    deadline: Instant,
    mut effects: Vec<UndoEffect>,
) -> (UndoState, Vec<UndoEffect>) {
    effects.push(UndoEffect::ShowUndoPrompt {
        task_id: task.id,
        deadline,
    });
    let state = UndoState::Pending(PendingRemoval {
        task,
        position,
        deadline,
    });
    (state, effects)
}

fn commit(pending: PendingRemoval) -> (UndoState, Vec<UndoEffect>) {
    (
        UndoState::Idle,
        vec![
            UndoEffect::HideUndoPrompt,
            UndoEffect::CommitRemoval {
                task_id: pending.task.id,
            },
        ],
    )
}
