//! Timeline statistics for playback panels

use std::collections::HashMap;

use serde::Serialize;

use super::SessionHistory;
use crate::types::{cursor, EventType};

/// Summary of the timeline's shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStats {
    /// Every stored event, future included
    pub total_events: usize,
    /// Events up to and including the cursor
    pub active_events: usize,
    /// Events after the cursor
    pub future_events: usize,
    /// Cursor as a signed index
    pub current_position: i64,
    /// Events whose `can_revert` flag is set
    pub revertible: usize,
    /// Stored events per category
    pub events_by_type: HashMap<EventType, usize>,
}

impl TimelineStats {
    /// Count for one category, zero when absent
    pub fn count(&self, event_type: EventType) -> usize {
        self.events_by_type.get(&event_type).copied().unwrap_or(0)
    }
}

pub(super) fn collect(history: &SessionHistory) -> TimelineStats {
    let log = history.log.lock();

    let mut events_by_type = HashMap::new();
    let mut revertible = 0;
    for event in log.events() {
        *events_by_type.entry(event.event_type).or_insert(0) += 1;
        if event.can_revert {
            revertible += 1;
        }
    }

    TimelineStats {
        total_events: log.len(),
        active_events: log.active().len(),
        future_events: log.future().len(),
        current_position: cursor::to_signed(log.cursor()),
        revertible,
        events_by_type,
    }
}
