//! Recording helpers for the platform's collaborators
//!
//! Each helper composes a description, builds the category payload and
//! forwards to `add_event`.

use serde::Serialize;

use super::SessionHistory;
use crate::types::{ChoiceData, ComponentData, Event, EventType, LessonData, NavigationData};

/// A dialogue choice was picked
pub fn track_choice(history: &SessionHistory, id: &str, label: &str, path: Option<&str>) -> Event {
    let data = ChoiceData {
        choice_id: id.to_string(),
        label: label.to_string(),
        path: path.map(str::to_string),
    };
    history.add_event_with(EventType::Choice, format!("Selected: {}", label), &data, true)
}

/// A lesson was started, or completed when `completed` is `Some(true)`
pub fn track_lesson(
    history: &SessionHistory,
    lesson_id: &str,
    name: &str,
    completed: Option<bool>,
) -> Event {
    let completed = completed.unwrap_or(false);
    let description = if completed {
        format!("Completed lesson: {}", name)
    } else {
        format!("Started lesson: {}", name)
    };
    let data = LessonData {
        lesson_id: lesson_id.to_string(),
        name: name.to_string(),
        completed,
    };
    history.add_event_with(EventType::Lesson, description, &data, true)
}

/// The editor changed; `data` is the caller's snapshot of the change
pub fn track_editor_change<T: Serialize + ?Sized>(
    history: &SessionHistory,
    label: &str,
    data: &T,
) -> Event {
    history.add_event_with(EventType::Editor, label, data, true)
}

/// A component was added to the project
pub fn track_component_selection(history: &SessionHistory, name: &str, category: &str) -> Event {
    let data = ComponentData {
        name: name.to_string(),
        category: category.to_string(),
    };
    history.add_event_with(
        EventType::Component,
        format!("Added component: {}", name),
        &data,
        true,
    )
}

/// The learner moved between pages; not offered as a revert target
pub fn track_navigation(history: &SessionHistory, from_path: &str, to_path: &str) -> Event {
    let data = NavigationData {
        from: from_path.to_string(),
        to: to_path.to_string(),
    };
    history.add_event_with(
        EventType::Navigation,
        format!("Navigated to {}", to_path),
        &data,
        false,
    )
}
