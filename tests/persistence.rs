//! Integration tests for task persistence.
//!
//! Exercises the gateway against both preference backends, the stored JSON
//! layout, and data written by the first revisions of the app.

use std::sync::Arc;
use todo_lib::plugins::tasks::storage::{parse_tasks, serialize_tasks};
use todo_lib::plugins::tasks::{
    FilePreferences, KeyValueStore, MemoryPreferences, PersistenceGateway, Task, TaskError,
    TASKS_KEY,
};

/// Helper to create a Task with every field set.
fn create_test_task(id: u32, title: &str, important: bool, image: Option<&str>) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: format!("{} description", title),
        added_time: "19-October-2026  14:05".to_string(),
        is_important: important,
        image_uri: image.map(str::to_string),
    }
}

fn sample_tasks() -> Vec<Task> {
    vec![
        create_test_task(4, "Water plants", false, None),
        create_test_task(1, "Buy milk", true, Some("content://media/external/images/media/12")),
        create_test_task(2, "Ünïcödé ✓", false, Some("file:///sdcard/DCIM/a b.jpg")),
        Task {
            description: String::new(),
            ..create_test_task(3, "Quote \"this\"", true, None)
        },
    ]
}

#[test]
fn test_round_trip_through_memory() {
    let gateway = PersistenceGateway::new(Arc::new(MemoryPreferences::new())).unwrap();
    let tasks = sample_tasks();

    gateway.save(&tasks).unwrap();
    assert_eq!(gateway.load().unwrap(), tasks);

    gateway.save(&[]).unwrap();
    assert!(gateway.load().unwrap().is_empty());
}

#[test]
fn test_round_trip_through_file_across_restarts() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("tasks_prefs.json");
    let tasks = sample_tasks();

    {
        let prefs = Arc::new(FilePreferences::open(&path).unwrap());
        let gateway = PersistenceGateway::new(prefs).unwrap();
        gateway.save(&tasks[..2]).unwrap();
        gateway.save(&tasks).unwrap();
    }

    let prefs = Arc::new(FilePreferences::open(&path).unwrap());
    let gateway = PersistenceGateway::new(prefs).unwrap();
    assert_eq!(gateway.load().unwrap(), tasks);
}

#[test]
fn test_missing_key_loads_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let prefs = Arc::new(FilePreferences::open(tmp.path().join("never-written.json")).unwrap());
    let gateway = PersistenceGateway::new(prefs).unwrap();

    assert_eq!(gateway.load().unwrap(), Vec::<Task>::new());
}

#[test]
fn test_stored_value_is_json_array_under_tasks_key() {
    let prefs = Arc::new(MemoryPreferences::new());
    let gateway = PersistenceGateway::new(prefs.clone()).unwrap();
    gateway
        .save(&[create_test_task(1, "Buy milk", false, None)])
        .unwrap();
    gateway.flush();

    let raw = prefs.get_string(TASKS_KEY).unwrap().expect("value written");
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value.as_array().expect("array")[0];

    let mut keys: Vec<&str> = record
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["addedTime", "description", "id", "isImportant", "title"]
    );
}

#[test]
fn test_reads_records_from_earlier_revisions() {
    // First revision: no importance flag, no image
    let json = r#"[
        {"id":1,"title":"Buy milk","description":"2%","addedTime":"01-May-2024"},
        {"id":2,"title":"Call mom","description":"","addedTime":"02-May-2024  18:00","isImportant":true},
        {"id":3,"title":"Photo","description":"","addedTime":"03-May-2024  09:00","isImportant":false,"imageUri":"content://media/3"}
    ]"#;

    let tasks = parse_tasks(json).unwrap();
    assert_eq!(tasks.len(), 3);
    assert!(!tasks[0].is_important);
    assert_eq!(tasks[0].image_uri, None);
    assert!(tasks[1].is_important);
    assert_eq!(tasks[1].image_uri, None);
    assert_eq!(tasks[2].image_uri.as_deref(), Some("content://media/3"));
}

#[test]
fn test_corrupt_data_surfaces_as_error() {
    let prefs = Arc::new(MemoryPreferences::new());
    prefs.put_string(TASKS_KEY, "[{\"id\":1,").unwrap();
    let gateway = PersistenceGateway::new(prefs).unwrap();

    let err = gateway.load().unwrap_err();
    assert!(matches!(err, TaskError::CorruptData(_)));
    assert!(!err.is_recoverable());
}

#[test]
fn test_serialize_matches_parse() {
    let tasks = sample_tasks();
    let json = serialize_tasks(&tasks).unwrap();
    assert_eq!(parse_tasks(&json).unwrap(), tasks);
}
