//! Method handlers for the history server
//!
//! Each `history/*` method maps onto one `SessionHistory` call. Lookup misses
//! in jump/revert answer `null`, not an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::history::SessionHistory;
use crate::types::{EventId, EventType};

/// Errors a handler reports back to the client
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct ChoiceParams {
    id: String,
    label: String,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonParams {
    lesson_id: String,
    name: String,
    #[serde(default)]
    completed: Option<bool>,
}

#[derive(Deserialize)]
struct EditorParams {
    label: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct ComponentParams {
    name: String,
    category: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavigationParams {
    from_path: String,
    to_path: String,
}

fn default_can_revert() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddEventParams {
    #[serde(rename = "type")]
    event_type: EventType,
    description: String,
    #[serde(default)]
    data: Value,
    #[serde(default = "default_can_revert")]
    can_revert: bool,
}

#[derive(Deserialize)]
struct TypeParams {
    #[serde(rename = "type")]
    event_type: EventType,
}

#[derive(Deserialize)]
struct IdParams {
    id: EventId,
}

fn parse<T: DeserializeOwned>(params: Option<Value>) -> Result<T, HandlerError> {
    let params = params.unwrap_or_else(|| json!({}));
    serde_json::from_value(params).map_err(|e| HandlerError::InvalidParams(e.to_string()))
}

fn encode<T: Serialize>(value: T) -> Result<Value, HandlerError> {
    Ok(serde_json::to_value(value)?)
}

/// Run one method against the history
pub fn dispatch(
    history: &SessionHistory,
    method: &str,
    params: Option<Value>,
) -> Result<Value, HandlerError> {
    match method {
        "ping" => Ok(json!({})),

        "history/trackChoice" => {
            let p: ChoiceParams = parse(params)?;
            encode(history.track_choice(&p.id, &p.label, p.path.as_deref()))
        }
        "history/trackLesson" => {
            let p: LessonParams = parse(params)?;
            encode(history.track_lesson(&p.lesson_id, &p.name, p.completed))
        }
        "history/trackEditorChange" => {
            let p: EditorParams = parse(params)?;
            encode(history.track_editor_change(&p.label, &p.data))
        }
        "history/trackComponentSelection" => {
            let p: ComponentParams = parse(params)?;
            encode(history.track_component_selection(&p.name, &p.category))
        }
        "history/trackNavigation" => {
            let p: NavigationParams = parse(params)?;
            encode(history.track_navigation(&p.from_path, &p.to_path))
        }
        "history/addEvent" => {
            let p: AddEventParams = parse(params)?;
            encode(history.add_event(p.event_type, p.description, p.data, p.can_revert))
        }

        "history/getEvents" => encode(history.get_events()),
        "history/getState" => encode(history.get_state()),
        "history/getEventsByType" => {
            let p: TypeParams = parse(params)?;
            encode(history.get_events_by_type(p.event_type))
        }
        "history/getEvent" => {
            let p: IdParams = parse(params)?;
            encode(history.get_event(p.id))
        }
        "history/canRevert" => encode(history.can_revert()),
        "history/canRedo" => encode(history.can_redo()),
        "history/stats" => encode(history.stats()),

        "history/jumpToEvent" => {
            let p: IdParams = parse(params)?;
            encode(history.jump_to_event(p.id))
        }
        "history/revertToEvent" => {
            let p: IdParams = parse(params)?;
            encode(history.revert_to_event(p.id))
        }
        "history/stepBack" => encode(history.step_back()),
        "history/stepForward" => encode(history.step_forward()),
        "history/clear" => {
            history.clear_history();
            Ok(json!({}))
        }
        "history/flush" => encode(json!({ "saved": history.flush() })),

        other => Err(HandlerError::MethodNotFound(other.to_string())),
    }
}
