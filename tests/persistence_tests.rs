//! Persistence integration tests
//!
//! Tests for saving and restoring the session timeline:
//! - Round trip through file storage
//! - Recovery from missing, corrupted and inconsistent saves
//! - Tolerance of failing storage backends

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use session_timeline::persistence::FORMAT_VERSION;
use session_timeline::{
    EventType, HistoryConfig, KeyValueStorage, MemoryStorage, SessionHistory, StorageError,
};

fn file_config(dir: &TempDir) -> HistoryConfig {
    HistoryConfig::new(dir.path())
}

#[test]
fn test_round_trip_through_files() {
    let temp_dir = TempDir::new().unwrap();
    let config = file_config(&temp_dir);

    let history = SessionHistory::new(config.clone());
    let first = history.track_choice("c1", "Start Game", Some("intro"));
    history.track_editor_change(
        "Add Player",
        &json!({"sprite": "player.png", "pos": {"x": 3, "y": [1, 2]}}),
    );
    history.track_navigation("/intro", "/editor");
    history.add_event(EventType::Component, "Added component: Timer", json!(null), true);
    history.jump_to_event(first.id).unwrap();
    let saved = history.get_state();
    history.dispose();

    let reopened = SessionHistory::new(config);
    let restored = reopened.get_state();

    assert_eq!(restored.events.len(), 4);
    assert_eq!(restored.current_position, Some(0));
    for (a, b) in saved.events.iter().zip(&restored.events) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.event_type, b.event_type);
        assert_eq!(a.description, b.description);
        assert_eq!(a.data, b.data);
        assert_eq!(a.can_revert, b.can_revert);
        assert_eq!(a.timestamp, b.timestamp);
    }
    assert!(reopened.can_redo());
}

#[test]
fn test_saved_file_layout() {
    let temp_dir = TempDir::new().unwrap();
    let history = SessionHistory::new(file_config(&temp_dir));
    history.track_lesson("l1", "Movement Basics", None);

    let path = temp_dir.path().join("session-history.json");
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(value["version"], FORMAT_VERSION);
    assert_eq!(value["currentPosition"], 0);
    assert_eq!(value["events"][0]["type"], "lesson");
    assert!(value["events"][0]["timestamp"].as_str().unwrap().contains('T'));
}

#[test]
fn test_missing_storage_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    let history = SessionHistory::new(HistoryConfig::new(temp_dir.path().join("not-created")));

    assert!(history.is_empty());
    assert_eq!(history.current_position(), -1);
}

#[test]
fn test_corrupted_storage_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("session-history.json"),
        "\u{0}\u{1}garbage{{[not json",
    )
    .unwrap();

    let history = SessionHistory::new(file_config(&temp_dir));
    assert!(history.is_empty());
    assert!(!history.can_revert());

    // The engine keeps working and overwrites the bad save.
    history.track_choice("c1", "Retry", None);
    let reopened = SessionHistory::new(file_config(&temp_dir));
    assert_eq!(reopened.len(), 1);
}

#[test]
fn test_inconsistent_cursor_starts_empty() {
    let storage = MemoryStorage::new();
    storage
        .set(
            "session-history",
            r#"{"version":1,"events":[],"currentPosition":4,"nextEventId":9}"#,
        )
        .unwrap();

    let history = SessionHistory::with_storage(storage, &HistoryConfig::default());
    assert!(history.is_empty());
}

#[test]
fn test_max_event_id_starts_empty() {
    let storage = MemoryStorage::new();
    storage
        .set(
            "session-history",
            r#"{"version":1,"events":[{"id":18446744073709551615,"timestamp":"2024-03-01T10:00:00.000Z","type":"choice","description":"Selected: A","data":null,"canRevert":true}],"currentPosition":0,"nextEventId":18446744073709551615}"#,
        )
        .unwrap();

    let history = SessionHistory::with_storage(storage, &HistoryConfig::default());
    assert!(history.is_empty());

    let first = history.track_choice("c1", "Start Game", None);
    let second = history.track_choice("c2", "Continue", None);
    assert!(first.id < second.id);
}

#[test]
fn test_ids_not_reused_across_reload() {
    let storage = MemoryStorage::new();
    let config = HistoryConfig::default();

    let history = SessionHistory::with_storage(storage.clone(), &config);
    let a = history.track_choice("c1", "A", None);
    let b = history.track_choice("c2", "B", None);
    history.revert_to_event(a.id).unwrap();
    drop(history);

    let reopened = SessionHistory::with_storage(storage, &config);
    let c = reopened.track_choice("c3", "C", None);
    assert!(c.id > b.id);
}

#[test]
fn test_custom_storage_key() {
    let storage = MemoryStorage::new();
    let config = HistoryConfig::default().with_storage_key("learner-7");
    let history = SessionHistory::with_storage(storage.clone(), &config);
    history.track_component_selection("Timer", "HUD");

    assert_eq!(history.storage_key(), "learner-7");
    assert!(storage.get("learner-7").unwrap().is_some());
    assert!(storage.get("session-history").unwrap().is_none());
}

struct QuotaExceeded;

impl KeyValueStorage for QuotaExceeded {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

#[test]
fn test_storage_failure_does_not_affect_recording() {
    let history = SessionHistory::with_storage(QuotaExceeded, &HistoryConfig::default());

    let a = history.track_choice("c1", "Start Game", None);
    history.track_lesson("l1", "Movement Basics", None);
    history.jump_to_event(a.id).unwrap();
    history.clear_history();
    history.track_editor_change("Add Player", &json!({"sprite": "player.png"}));

    assert_eq!(history.len(), 1);
    assert!(!history.flush());
}

#[test]
fn test_unreadable_storage_starts_empty() {
    struct Disabled;

    impl KeyValueStorage for Disabled {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("storage disabled".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("storage disabled".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    let history = SessionHistory::with_storage(Disabled, &HistoryConfig::default());
    assert!(history.is_empty());
    history.track_navigation("/a", "/b");
    assert_eq!(history.len(), 1);
}
