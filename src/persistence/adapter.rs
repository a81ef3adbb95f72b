//! Persistence adapter
//!
//! Saves the timeline as one JSON document under a fixed key and restores it
//! at startup. Failures here are logged by the caller and never reach the
//! recording API.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::storage::KeyValueStorage;
use crate::error::{PersistenceError, PersistenceResult};
use crate::types::{cursor, Event, TimelineState};

/// Current saved-session format version
pub const FORMAT_VERSION: u32 = 1;

/// Borrowed view written to storage
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedSessionRef<'a> {
    version: u32,
    events: &'a [Event],
    #[serde(with = "cursor")]
    current_position: Option<usize>,
    next_event_id: u64,
}

/// Owned document read back from storage. Documents without a `version`
/// field predate versioning and load as version 0.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedSession {
    #[serde(default)]
    version: u32,
    events: Vec<Event>,
    #[serde(with = "cursor")]
    current_position: Option<usize>,
    #[serde(default)]
    next_event_id: u64,
}

/// A timeline restored from storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoredTimeline {
    pub state: TimelineState,
    /// Next identifier to hand out; above every restored id
    pub next_event_id: u64,
}

/// Reads and writes the timeline under one storage key
pub struct PersistenceAdapter {
    storage: Box<dyn KeyValueStorage>,
    key: String,
}

impl PersistenceAdapter {
    pub fn new(storage: Box<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Storage key in use
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serialize and write the timeline (single attempt)
    pub fn save(
        &self,
        events: &[Event],
        current_position: Option<usize>,
        next_event_id: u64,
    ) -> PersistenceResult<()> {
        let doc = SavedSessionRef {
            version: FORMAT_VERSION,
            events,
            current_position,
            next_event_id,
        };
        let json = serde_json::to_string(&doc)?;
        self.storage.set(&self.key, &json)?;
        Ok(())
    }

    /// Read the saved timeline; `Ok(None)` when nothing was saved
    pub fn load(&self) -> PersistenceResult<Option<RestoredTimeline>> {
        let Some(content) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        decode(&content).map(Some)
    }

    /// Read the saved timeline, falling back to an empty one on any failure
    pub fn load_or_default(&self) -> RestoredTimeline {
        match self.load() {
            Ok(Some(restored)) => {
                tracing::info!(
                    key = %self.key,
                    events = restored.state.events.len(),
                    position = restored.state.position(),
                    "restored session history"
                );
                restored
            }
            Ok(None) => {
                tracing::debug!(key = %self.key, "no saved session history");
                RestoredTimeline::default()
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding unreadable session history");
                RestoredTimeline::default()
            }
        }
    }

    /// Delete the saved timeline
    pub fn remove(&self) -> PersistenceResult<()> {
        self.storage.remove(&self.key)?;
        Ok(())
    }
}

fn decode(content: &str) -> PersistenceResult<RestoredTimeline> {
    let saved: SavedSession = serde_json::from_str(content)?;

    if saved.version > FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: saved.version,
            supported: FORMAT_VERSION,
        });
    }

    let state = TimelineState {
        events: saved.events,
        current_position: saved.current_position,
    };

    if !state.is_consistent() {
        return Err(PersistenceError::Inconsistent(format!(
            "currentPosition {} with {} events",
            state.position(),
            state.events.len()
        )));
    }

    let mut seen = HashSet::with_capacity(state.events.len());
    if let Some(dup) = state.events.iter().find(|e| !seen.insert(e.id)) {
        return Err(PersistenceError::Inconsistent(format!(
            "duplicate event id {}",
            dup.id
        )));
    }

    let max_id = state.events.iter().map(|e| e.id.get()).max().unwrap_or(0);
    // The counter must stay assignable: one more id has to fit in a u64.
    let next_event_id = max_id
        .checked_add(1)
        .map(|floor| saved.next_event_id.max(floor))
        .filter(|&next| next < u64::MAX)
        .ok_or_else(|| {
            PersistenceError::Inconsistent(format!(
                "event id space exhausted (max id {}, nextEventId {})",
                max_id, saved.next_event_id
            ))
        })?;

    Ok(RestoredTimeline {
        state,
        next_event_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::persistence::MemoryStorage;
    use crate::types::{EventId, EventType};
    use chrono::Utc;
    use serde_json::json;

    fn adapter() -> (PersistenceAdapter, MemoryStorage) {
        let storage = MemoryStorage::new();
        (
            PersistenceAdapter::new(Box::new(storage.clone()), "session-history"),
            storage,
        )
    }

    fn event(id: u64, event_type: EventType) -> Event {
        Event::new(
            EventId(id),
            Utc::now(),
            event_type,
            format!("event {}", id),
            json!({"n": id, "nested": {"list": [1, 2, 3]}}),
            true,
        )
    }

    #[test]
    fn test_missing_key_is_none() {
        let (adapter, _) = adapter();
        assert!(adapter.load().unwrap().is_none());
        assert_eq!(adapter.load_or_default(), RestoredTimeline::default());
    }

    #[test]
    fn test_save_writes_versioned_document() {
        let (adapter, storage) = adapter();
        let events = vec![event(1, EventType::Choice)];
        adapter.save(&events, Some(0), 2).unwrap();

        let raw = storage.get("session-history").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], FORMAT_VERSION);
        assert_eq!(value["currentPosition"], 0);
        assert_eq!(value["nextEventId"], 2);
        assert_eq!(value["events"][0]["type"], "choice");
    }

    #[test]
    fn test_roundtrip() {
        let (adapter, _) = adapter();
        let events = vec![event(1, EventType::Choice), event(2, EventType::Lesson)];
        adapter.save(&events, Some(0), 3).unwrap();

        let restored = adapter.load().unwrap().unwrap();
        assert_eq!(restored.state.events, events);
        assert_eq!(restored.state.current_position, Some(0));
        assert_eq!(restored.next_event_id, 3);
    }

    #[test]
    fn test_garbage_falls_back_to_empty() {
        let (adapter, storage) = adapter();
        storage.set("session-history", "not json {{{").unwrap();

        assert!(matches!(adapter.load(), Err(PersistenceError::Json(_))));
        assert_eq!(adapter.load_or_default(), RestoredTimeline::default());
    }

    #[test]
    fn test_out_of_range_cursor_rejected() {
        let (adapter, storage) = adapter();
        storage
            .set(
                "session-history",
                r#"{"version":1,"events":[],"currentPosition":3,"nextEventId":1}"#,
            )
            .unwrap();

        assert!(matches!(
            adapter.load(),
            Err(PersistenceError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let (adapter, _) = adapter();
        let events = vec![event(1, EventType::Choice), event(1, EventType::Editor)];
        adapter.save(&events, Some(1), 2).unwrap();

        assert!(matches!(
            adapter.load(),
            Err(PersistenceError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_newer_version_rejected() {
        let (adapter, storage) = adapter();
        storage
            .set(
                "session-history",
                r#"{"version":99,"events":[],"currentPosition":-1}"#,
            )
            .unwrap();

        assert!(matches!(
            adapter.load(),
            Err(PersistenceError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_legacy_unversioned_document_loads() {
        let (adapter, storage) = adapter();
        storage
            .set(
                "session-history",
                r#"{"events":[{"id":4,"timestamp":"2024-03-01T10:00:00.000Z","type":"navigation","description":"Navigated to /lessons","data":null,"canRevert":false}],"currentPosition":0}"#,
            )
            .unwrap();

        let restored = adapter.load().unwrap().unwrap();
        assert_eq!(restored.state.events.len(), 1);
        assert_eq!(restored.state.events[0].event_type, EventType::Navigation);
        assert_eq!(restored.next_event_id, 5);
    }

    #[test]
    fn test_exhausted_id_space_rejected() {
        let (adapter, storage) = adapter();
        storage
            .set(
                "session-history",
                r#"{"version":1,"events":[{"id":18446744073709551615,"timestamp":"2024-03-01T10:00:00.000Z","type":"choice","description":"Selected: A","data":null,"canRevert":true}],"currentPosition":0,"nextEventId":1}"#,
            )
            .unwrap();

        assert!(matches!(
            adapter.load(),
            Err(PersistenceError::Inconsistent(_))
        ));
        assert_eq!(adapter.load_or_default(), RestoredTimeline::default());

        storage
            .set(
                "session-history",
                r#"{"version":1,"events":[],"currentPosition":-1,"nextEventId":18446744073709551615}"#,
            )
            .unwrap();
        assert_eq!(adapter.load_or_default(), RestoredTimeline::default());
    }

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    #[test]
    fn test_storage_failures_surface_as_errors() {
        let adapter = PersistenceAdapter::new(Box::new(BrokenStorage), "session-history");

        assert!(matches!(
            adapter.save(&[], None, 1),
            Err(PersistenceError::Storage(_))
        ));
        assert_eq!(adapter.load_or_default(), RestoredTimeline::default());
    }
}
