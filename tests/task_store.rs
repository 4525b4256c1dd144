//! Integration tests for the task list model.
//!
//! Covers id assignment, title validation, the remove/restore pair and the
//! fields `update` is never allowed to touch.

use todo_lib::core::settings::TimestampFormat;
use todo_lib::plugins::tasks::{TaskDraft, TaskError, TaskStore};

/// Helper to build a store holding tasks with ids 1..=titles.len().
fn store_with(titles: &[&str]) -> TaskStore {
    let mut store = TaskStore::new(TimestampFormat::DateTime);
    for title in titles {
        store
            .add(TaskDraft::new(*title, format!("about {}", title)))
            .expect("valid title");
    }
    store
}

fn ids(store: &TaskStore) -> Vec<u32> {
    store.tasks().iter().map(|t| t.id).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_first_task_in_empty_store() {
    let mut store = TaskStore::new(TimestampFormat::DateTime);

    store.add(TaskDraft::new("Buy milk", "2%")).unwrap();

    let tasks = store.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, 1);
    assert_eq!(tasks[0].title, "Buy milk");
    assert_eq!(tasks[0].description, "2%");
    assert!(!tasks[0].is_important);
    assert_eq!(tasks[0].image_uri, None);
    assert!(!tasks[0].added_time.is_empty());
}

#[test]
fn test_remove_middle_then_restore() {
    let mut store = store_with(&["a", "b", "c"]);
    assert_eq!(ids(&store), vec![1, 2, 3]);

    let (task, position) = store.remove(2).unwrap();
    assert_eq!(task.id, 2);
    assert_eq!(position, 1);
    assert_eq!(ids(&store), vec![1, 3]);

    store.restore(task, position);
    assert_eq!(ids(&store), vec![1, 2, 3]);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_add_grows_by_one_with_greater_id() {
    let mut store = TaskStore::new(TimestampFormat::DateOnly);
    let mut highest = 0;

    for n in 0..25 {
        // Mix in deletes so ids and length drift apart
        if n % 4 == 3 {
            let first = store.tasks()[0].id;
            store.remove(first).unwrap();
        }

        let before = store.len();
        let task = store.add(TaskDraft::new(format!("task {}", n), "")).unwrap();

        assert_eq!(store.len(), before + 1);
        assert!(task.id > highest, "id {} not above {}", task.id, highest);
        highest = task.id;
    }

    let mut unique = ids(&store);
    unique.dedup();
    assert_eq!(unique.len(), store.len());
}

#[test]
fn test_blank_titles_rejected_without_mutation() {
    let mut store = store_with(&["a", "b"]);
    let before = store.tasks().to_vec();

    for title in ["", " ", "   \t", "\n"] {
        let err = store
            .add(TaskDraft::new(title, "desc").important(true))
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation));
        assert!(err.is_recoverable());
    }

    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn test_remove_restore_is_left_inverse_everywhere() {
    let titles = ["a", "b", "c", "d", "e"];
    for id in 1..=titles.len() as u32 {
        let mut store = store_with(&titles);
        let original = store.tasks().to_vec();

        let (task, position) = store.remove(id).unwrap();
        store.restore(task, position);

        assert_eq!(store.tasks(), original.as_slice(), "after removing {}", id);
    }
}

#[test]
fn test_update_never_touches_id_or_time() {
    let mut store = store_with(&["a", "b", "c"]);
    let drafts = [
        TaskDraft::new("x", ""),
        TaskDraft::new("y", "desc").important(true),
        TaskDraft::new("z", "").image(Some("content://media/external/images/media/9".into())),
        TaskDraft::new("w", "d").important(false).image(None),
    ];

    for draft in drafts {
        for id in 1..=3 {
            let before = store.get(id).unwrap().clone();
            let after = store.update(id, draft.clone()).unwrap();

            assert_eq!(after.id, before.id);
            assert_eq!(after.added_time, before.added_time);
            assert_eq!(after.title, draft.title);
            assert_eq!(after.description, draft.description);
            assert_eq!(after.is_important, draft.is_important);
            assert_eq!(after.image_uri, draft.image_uri);
        }
    }
    assert_eq!(ids(&store), vec![1, 2, 3]);
}

#[test]
fn test_stale_id_is_not_found() {
    let mut store = store_with(&["a"]);
    store.remove(1).unwrap();

    assert!(matches!(store.remove(1), Err(TaskError::NotFound(1))));
    assert!(matches!(
        store.update(1, TaskDraft::new("a", "")),
        Err(TaskError::NotFound(1))
    ));
    assert!(store.is_empty());
}
