//! Timeline state snapshot

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::event::Event;

/// Full snapshot of the timeline: every stored event plus the cursor
///
/// `current_position` is `None` for an empty timeline and is written as `-1`
/// on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineState {
    pub events: Vec<Event>,
    #[serde(with = "cursor")]
    pub current_position: Option<usize>,
}

impl TimelineState {
    /// Cursor as a signed index, `-1` when empty
    pub fn position(&self) -> i64 {
        cursor::to_signed(self.current_position)
    }

    /// Check invariant `-1 <= current_position < events.len()`
    pub fn is_consistent(&self) -> bool {
        match self.current_position {
            None => self.events.is_empty(),
            Some(pos) => pos < self.events.len(),
        }
    }
}

/// Serde adapter mapping `Option<usize>` to a signed index (`-1` = none)
pub(crate) mod cursor {
    use super::*;

    pub fn to_signed(pos: Option<usize>) -> i64 {
        pos.map(|p| p as i64).unwrap_or(-1)
    }

    pub fn serialize<S: Serializer>(pos: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
        to_signed(*pos).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(d)?;
        match raw {
            -1 => Ok(None),
            n if n >= 0 => Ok(Some(n as usize)),
            n => Err(serde::de::Error::custom(format!(
                "currentPosition must be -1 or a non-negative index, got {}",
                n
            ))),
        }
    }
}
