//! Typed payloads for each event category
//!
//! The timeline itself stores `serde_json::Value`; these structs give each
//! recording helper a statically known shape. Read them back with
//! [`Event::parse_data`](super::Event::parse_data).

use serde::{Deserialize, Serialize};

/// Data payload for a dialogue choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceData {
    pub choice_id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Data payload for a lesson step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonData {
    pub lesson_id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

/// Data payload for a component pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentData {
    pub name: String,
    pub category: String,
}

/// Data payload for a page navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationData {
    pub from: String,
    pub to: String,
}
