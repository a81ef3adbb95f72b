//! Data types for the session timeline
//!
//! This module contains the core data structures shared by the store,
//! the persistence layer and the stdio server.

mod event;
mod payload;
mod state;

pub use event::{Event, EventId, EventType};
pub use payload::{ChoiceData, ComponentData, LessonData, NavigationData};
pub use state::TimelineState;

pub(crate) use state::cursor;

/// Result type for the binary and server entry points
pub type TimelineResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
