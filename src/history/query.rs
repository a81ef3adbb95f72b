//! Read-only queries over the timeline
//!
//! Every query takes the lock briefly and returns owned copies, so callers
//! never observe a half-applied mutation.

use super::SessionHistory;
use crate::types::{cursor, Event, EventId, EventType, TimelineState};

/// Whole stored sequence, future events included, as currently truncated
pub fn get_events(history: &SessionHistory) -> Vec<Event> {
    history.log.lock().events().to_vec()
}

/// Events and cursor, for export
pub fn get_state(history: &SessionHistory) -> TimelineState {
    history.log.lock().state()
}

/// Events of one category, in original order
pub fn get_events_by_type(history: &SessionHistory, event_type: EventType) -> Vec<Event> {
    history
        .log
        .lock()
        .events()
        .iter()
        .filter(|e| e.event_type == event_type)
        .cloned()
        .collect()
}

pub fn get_event(history: &SessionHistory, id: EventId) -> Option<Event> {
    history.log.lock().get(id).cloned()
}

pub fn current_event(history: &SessionHistory) -> Option<Event> {
    history.log.lock().current().cloned()
}

/// Cursor as a signed index, `-1` when empty
pub fn current_position(history: &SessionHistory) -> i64 {
    cursor::to_signed(history.log.lock().cursor())
}

pub fn active_events(history: &SessionHistory) -> Vec<Event> {
    history.log.lock().active().to_vec()
}

pub fn future_events(history: &SessionHistory) -> Vec<Event> {
    history.log.lock().future().to_vec()
}

/// Number of stored events, future events included
pub fn len(history: &SessionHistory) -> usize {
    history.log.lock().len()
}

pub fn is_empty(history: &SessionHistory) -> bool {
    history.log.lock().is_empty()
}

/// True when the active prefix holds at least one event
pub fn can_revert(history: &SessionHistory) -> bool {
    history.log.lock().cursor().is_some()
}

/// True when events exist beyond the cursor
pub fn can_redo(history: &SessionHistory) -> bool {
    !history.log.lock().is_at_tip()
}
