//! Event types for the session timeline
//!
//! An event is an immutable record of one learner action. The timeline stores
//! descriptions and data snapshots, never deltas against application state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque event identifier, unique within a timeline and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl EventId {
    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        EventId(id)
    }
}

/// Categories of recorded actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A dialogue choice was selected
    Choice,
    /// A lesson was started or completed
    Lesson,
    /// The code/canvas editor changed
    Editor,
    /// A component was picked
    Component,
    /// The learner moved between pages
    Navigation,
}

impl EventType {
    /// All categories, in declaration order
    pub const ALL: [EventType; 5] = [
        EventType::Choice,
        EventType::Lesson,
        EventType::Editor,
        EventType::Component,
        EventType::Navigation,
    ];

    /// Wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Choice => "choice",
            EventType::Lesson => "lesson",
            EventType::Editor => "editor",
            EventType::Component => "component",
            EventType::Navigation => "navigation",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown event type: {}", s))
    }
}

/// An immutable record in the session timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier assigned at creation
    pub id: EventId,

    /// Creation time, serialized as RFC 3339
    pub timestamp: DateTime<Utc>,

    /// Category of the action
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Short human-readable summary composed by the recording call
    pub description: String,

    /// Structured payload; `null` when absent
    #[serde(default)]
    pub data: serde_json::Value,

    /// Whether callers should offer this event as a revert target
    pub can_revert: bool,
}

impl Event {
    /// Create a new event stamped with the given time
    pub fn new(
        id: EventId,
        timestamp: DateTime<Utc>,
        event_type: EventType,
        description: String,
        data: serde_json::Value,
        can_revert: bool,
    ) -> Self {
        Self {
            id,
            timestamp,
            event_type,
            description,
            data,
            can_revert,
        }
    }

    /// Parse the event data as a specific payload type
    pub fn parse_data<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }

    /// True when the event carries no payload
    pub fn has_data(&self) -> bool {
        !self.data.is_null()
    }
}
