//! Event log - the in-memory timeline and its cursor
//!
//! `EventLog` owns every ordering invariant:
//!
//! 1. `cursor` is `None` exactly when `events` is empty, else `< events.len()`
//! 2. `events[..=cursor]` is the active prefix, the rest is future
//! 3. appending at the tip grows the log by one and advances the cursor
//! 4. appending behind the tip first drops the future (branch cut)
//!
//! It performs no I/O; `SessionHistory` wraps it with persistence and
//! notification.

use chrono::{DateTime, Utc};

use crate::types::{Event, EventId, EventType, TimelineState};

/// Linear timeline of events with a cursor
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<Event>,
    cursor: Option<usize>,
    next_id: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            cursor: None,
            next_id: 1,
        }
    }

    /// Rebuild a log from a consistent state
    ///
    /// The caller guarantees `state.is_consistent()`; the id counter is
    /// raised above every existing id.
    pub fn from_state(state: TimelineState, next_id: u64) -> Self {
        debug_assert!(state.is_consistent());
        let max_id = state.events.iter().map(|e| e.id.get()).max().unwrap_or(0);
        Self {
            events: state.events,
            cursor: state.current_position,
            next_id: next_id.max(max_id.saturating_add(1)).max(1),
        }
    }

    /// All stored events, including future ones
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Cursor index, `None` when empty
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Next identifier that will be assigned
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Index of the last stored event
    pub fn tip(&self) -> Option<usize> {
        self.events.len().checked_sub(1)
    }

    /// True when the cursor sits on the last stored event (or the log is empty)
    pub fn is_at_tip(&self) -> bool {
        self.cursor == self.tip()
    }

    /// Events up to and including the cursor
    pub fn active(&self) -> &[Event] {
        match self.cursor {
            Some(pos) => &self.events[..=pos],
            None => &[],
        }
    }

    /// Events after the cursor, reachable only by jumping
    pub fn future(&self) -> &[Event] {
        match self.cursor {
            Some(pos) => &self.events[pos + 1..],
            None => &self.events,
        }
    }

    /// Event under the cursor
    pub fn current(&self) -> Option<&Event> {
        self.cursor.map(|pos| &self.events[pos])
    }

    /// Index of the event with `id`
    pub fn position_of(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|e| e.id == id)
    }

    /// Look up an event by id
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Snapshot of events and cursor
    pub fn state(&self) -> TimelineState {
        TimelineState {
            events: self.events.clone(),
            current_position: self.cursor,
        }
    }

    /// Record a new event at `now`, cutting off any future first
    pub fn append(
        &mut self,
        event_type: EventType,
        description: String,
        data: serde_json::Value,
        can_revert: bool,
        now: DateTime<Utc>,
    ) -> Event {
        let dropped = self.truncate_after_cursor();
        if dropped > 0 {
            tracing::debug!(dropped, "branch cut before append");
        }

        // Keep timestamps non-decreasing along the active sequence.
        let timestamp = match self.events.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };

        let id = EventId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let event = Event::new(id, timestamp, event_type, description, data, can_revert);
        self.events.push(event.clone());
        self.cursor = Some(self.events.len() - 1);
        event
    }

    /// Move the cursor to `id` without removing anything
    pub fn jump_to(&mut self, id: EventId) -> Option<Event> {
        let index = self.position_of(id)?;
        self.cursor = Some(index);
        Some(self.events[index].clone())
    }

    /// Move the cursor to `id` and delete everything after it
    pub fn revert_to(&mut self, id: EventId) -> Option<Event> {
        let index = self.position_of(id)?;
        self.events.truncate(index + 1);
        self.cursor = Some(index);
        Some(self.events[index].clone())
    }

    /// Drop every event; the id counter keeps counting
    pub fn clear(&mut self) {
        self.events.clear();
        self.cursor = None;
    }

    /// Remove the future part of the log, returning how many events went
    fn truncate_after_cursor(&mut self) -> usize {
        let keep = self.cursor.map(|pos| pos + 1).unwrap_or(0);
        let dropped = self.events.len() - keep;
        self.events.truncate(keep);
        dropped
    }
}
