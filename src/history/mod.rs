//! Session history - the timeline engine
//!
//! `SessionHistory` composes the in-memory [`EventLog`], the
//! [`PersistenceAdapter`] and the [`Notifier`]. One instance is created by the
//! application's composition root and shared (e.g. behind an `Arc`) with
//! every collaborator that records or plays back actions.
//!
//! Every mutation follows the same path:
//!
//! ```text
//! lock ─► mutate EventLog ─► save (best effort) ─► unlock ─► notify
//! ```
//!
//! Lookup misses in `jump_to_event` / `revert_to_event` skip everything
//! after the lock: no save, no notification.
//!
//! `can_revert` on an event is advisory. Neither jump nor revert refuses a
//! target whose flag is `false`; playback UIs decide what to offer.

mod query;
mod stats;
mod store;
mod track;

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::HistoryConfig;
use crate::notifier::{Notifier, Subscription};
use crate::persistence::{FileStorage, KeyValueStorage, MemoryStorage, PersistenceAdapter};
use crate::types::{Event, EventId, EventType, TimelineState};

pub use stats::TimelineStats;
pub use store::EventLog;

/// The session timeline: recording, time travel, queries and notification
pub struct SessionHistory {
    pub(crate) log: Mutex<EventLog>,
    persistence: PersistenceAdapter,
    notifier: Notifier,
    autosave: bool,
}

impl SessionHistory {
    /// Open the history saved under `config.data_dir`
    pub fn new(config: HistoryConfig) -> Self {
        let storage = FileStorage::open(&config.data_dir);
        Self::with_storage(storage, &config)
    }

    /// Open the history over any key-value backend
    pub fn with_storage<S>(storage: S, config: &HistoryConfig) -> Self
    where
        S: KeyValueStorage + 'static,
    {
        let persistence = PersistenceAdapter::new(Box::new(storage), config.storage_key.clone());
        let restored = persistence.load_or_default();

        Self {
            log: Mutex::new(EventLog::from_state(
                restored.state,
                restored.next_event_id,
            )),
            persistence,
            notifier: Notifier::new(),
            autosave: config.autosave,
        }
    }

    /// A history backed by fresh in-process storage
    pub fn in_memory() -> Self {
        Self::with_storage(MemoryStorage::new(), &HistoryConfig::default())
    }

    /// Run `mutation` under the lock, then save and notify
    fn commit<R>(&self, mutation: impl FnOnce(&mut EventLog) -> R) -> R {
        let result = {
            let mut log = self.log.lock();
            let result = mutation(&mut log);
            if self.autosave {
                self.save_locked(&log);
            }
            result
        };
        self.notifier.notify();
        result
    }

    /// Like `commit`, but a `None` from `mutation` skips save and notify
    fn try_commit<R>(&self, mutation: impl FnOnce(&mut EventLog) -> Option<R>) -> Option<R> {
        let result = {
            let mut log = self.log.lock();
            let result = mutation(&mut log)?;
            if self.autosave {
                self.save_locked(&log);
            }
            result
        };
        self.notifier.notify();
        Some(result)
    }

    /// Single save attempt; failures are logged and swallowed
    fn save_locked(&self, log: &EventLog) -> bool {
        match self
            .persistence
            .save(log.events(), log.cursor(), log.next_id())
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    key = %self.persistence.key(),
                    events = log.len(),
                    error = %e,
                    "failed to persist session history"
                );
                false
            }
        }
    }

    // ── Event store ───────────────────────────────────────────────────────

    /// Record a new event. Always succeeds; persistence is best effort.
    pub fn add_event(
        &self,
        event_type: EventType,
        description: impl Into<String>,
        data: serde_json::Value,
        can_revert: bool,
    ) -> Event {
        let description = description.into();
        let event =
            self.commit(|log| log.append(event_type, description, data, can_revert, Utc::now()));
        tracing::debug!(id = %event.id, event_type = %event.event_type, "recorded event");
        event
    }

    /// Record an event whose payload is any serializable value
    ///
    /// A payload that fails to serialize is logged and recorded as `null`;
    /// the event itself is never lost.
    pub fn add_event_with<T: Serialize + ?Sized>(
        &self,
        event_type: EventType,
        description: impl Into<String>,
        data: &T,
        can_revert: bool,
    ) -> Event {
        let description = description.into();
        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    event_type = %event_type,
                    description = %description,
                    error = %e,
                    "event payload is not serializable; recording without data"
                );
                serde_json::Value::Null
            }
        };
        self.add_event(event_type, description, value, can_revert)
    }

    /// Reset to an empty timeline
    pub fn clear_history(&self) {
        self.commit(EventLog::clear);
        tracing::debug!("cleared session history");
    }

    /// Non-destructive move of the cursor to `id`; `None` if unknown
    pub fn jump_to_event(&self, id: EventId) -> Option<Event> {
        let event = self.try_commit(|log| log.jump_to(id));
        match &event {
            Some(_) => tracing::debug!(%id, "jumped to event"),
            None => tracing::debug!(%id, "jump target not found"),
        }
        event
    }

    /// Destructive move of the cursor to `id`, deleting later events;
    /// `None` if unknown
    pub fn revert_to_event(&self, id: EventId) -> Option<Event> {
        let event = self.try_commit(|log| log.revert_to(id));
        match &event {
            Some(_) => tracing::debug!(%id, "reverted to event"),
            None => tracing::debug!(%id, "revert target not found"),
        }
        event
    }

    /// Step the cursor back one event without removing anything
    pub fn step_back(&self) -> Option<Event> {
        let target = {
            let log = self.log.lock();
            let pos = log.cursor()?.checked_sub(1)?;
            log.events()[pos].id
        };
        self.jump_to_event(target)
    }

    /// Step the cursor forward one event into the future, if any
    pub fn step_forward(&self) -> Option<Event> {
        let target = {
            let log = self.log.lock();
            log.future().first()?.id
        };
        self.jump_to_event(target)
    }

    // ── Notifier ──────────────────────────────────────────────────────────

    /// Register a callback run after every successful mutation
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Save the current timeline now. Returns whether the write succeeded.
    pub fn flush(&self) -> bool {
        let log = self.log.lock();
        self.save_locked(&log)
    }

    /// Flush and release subscribers; call from graceful shutdown
    pub fn dispose(self) {
        self.flush();
        self.notifier.clear();
        tracing::debug!("disposed session history");
    }

    /// Storage key this history persists under
    pub fn storage_key(&self) -> &str {
        self.persistence.key()
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::in_memory()
    }
}

// Query facade (from query.rs / stats.rs)
impl SessionHistory {
    pub fn get_events(&self) -> Vec<Event> {
        query::get_events(self)
    }

    pub fn get_state(&self) -> TimelineState {
        query::get_state(self)
    }

    pub fn get_events_by_type(&self, event_type: EventType) -> Vec<Event> {
        query::get_events_by_type(self, event_type)
    }

    pub fn get_event(&self, id: EventId) -> Option<Event> {
        query::get_event(self, id)
    }

    pub fn current_event(&self) -> Option<Event> {
        query::current_event(self)
    }

    pub fn current_position(&self) -> i64 {
        query::current_position(self)
    }

    pub fn active_events(&self) -> Vec<Event> {
        query::active_events(self)
    }

    pub fn future_events(&self) -> Vec<Event> {
        query::future_events(self)
    }

    pub fn can_revert(&self) -> bool {
        query::can_revert(self)
    }

    pub fn can_redo(&self) -> bool {
        query::can_redo(self)
    }

    pub fn len(&self) -> usize {
        query::len(self)
    }

    pub fn is_empty(&self) -> bool {
        query::is_empty(self)
    }

    pub fn stats(&self) -> TimelineStats {
        stats::collect(self)
    }
}

// Recording helpers (from track.rs)
impl SessionHistory {
    pub fn track_choice(&self, id: &str, label: &str, path: Option<&str>) -> Event {
        track::track_choice(self, id, label, path)
    }

    pub fn track_lesson(&self, lesson_id: &str, name: &str, completed: Option<bool>) -> Event {
        track::track_lesson(self, lesson_id, name, completed)
    }

    pub fn track_editor_change<T: Serialize + ?Sized>(&self, label: &str, data: &T) -> Event {
        track::track_editor_change(self, label, data)
    }

    pub fn track_component_selection(&self, name: &str, category: &str) -> Event {
        track::track_component_selection(self, name, category)
    }

    pub fn track_navigation(&self, from_path: &str, to_path: &str) -> Event {
        track::track_navigation(self, from_path, to_path)
    }
}
