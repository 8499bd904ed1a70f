//! Action model
//!
//! Guides are authored as loosely-typed tables ([`ActionSpec`]). At load time
//! each one is converted into a closed [`Action`] variant; anything that can't
//! be converted is an authoring error and never reaches the executor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::callbacks::{CallbackRegistry, GuideFn};
use crate::world::Location;

// ═══════════════════════════════════════════════════════════════════════════
// Typed actions
// ═══════════════════════════════════════════════════════════════════════════

/// One schedulable step of a guide entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Spawn(SpawnAction),
    Text(TextAction),
    Sound(SoundAction),
    StopTimer(StopTimerAction),
    Callback(CallbackAction),
}

impl Action {
    /// Tag name as written in guide files.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Spawn(_) => "spawn",
            Self::Text(_) => "text",
            Self::Sound(_) => "sound",
            Self::StopTimer(_) => "stop_timer",
            Self::Callback(_) => "func",
        }
    }
}

/// Place a marker object for `sub_delay` ms.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnAction {
    pub item_id: u32,
    /// Delay before the object appears (ms)
    pub delay: u64,
    /// Delay before the object is removed (ms, from trigger time)
    pub sub_delay: u64,
    /// Heading offset in radians, added to the entity's heading
    pub offset: f32,
    /// Distance to move along the resulting heading
    pub distance: f32,
    /// Use this position instead of the entity's
    pub position: Option<Location>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// On-screen event message
    Message,
    /// Chat line on the notification channel
    Notification,
    /// Local text-to-speech
    Speech,
}

impl TextKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "message" => Some(Self::Message),
            "notification" => Some(Self::Notification),
            "speech" => Some(Self::Speech),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextAction {
    pub kind: TextKind,
    pub message: String,
    pub delay: u64,
    /// Author timer id, so a later `stop_timer` can cancel it
    pub id: Option<u32>,
}

impl TextAction {
    pub fn new(kind: TextKind, message: impl Into<String>, delay: u64) -> Self {
        Self {
            kind,
            message: message.into(),
            delay,
            id: None,
        }
    }
}

/// Play a sound. The sound id doubles as the timer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundAction {
    pub sound_id: u32,
}

/// Cancel a pending timer by author id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTimerAction {
    pub timer_id: u32,
}

/// Run guide code after `delay` ms.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackAction {
    pub callback: GuideFn,
    pub delay: u64,
    pub id: Option<u32>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Raw (authored) actions
// ═══════════════════════════════════════════════════════════════════════════

/// An action exactly as written in a guide file.
///
/// Every field is optional here; [`ActionSpec::into_action`] decides which ones
/// the tag actually requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Item id (spawn), sound id (sound), target (stop_timer) or timer id (text, func)
    pub id: Option<i64>,
    pub delay: Option<i64>,
    pub sub_delay: Option<i64>,
    pub sub_type: Option<String>,
    pub message: Option<String>,
    pub offset: Option<f32>,
    pub distance: Option<f32>,
    pub pos: Option<Location>,
    pub func: Option<String>,
}

/// Authoring errors found while converting an [`ActionSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("action has no type")]
    MissingType,
    #[error("unknown action type '{0}'")]
    UnknownType(String),
    #[error("{action} action needs a {field}")]
    MissingField {
        action: &'static str,
        field: &'static str,
    },
    #[error("invalid sub_type for text action: '{0}'")]
    UnknownTextKind(String),
    #[error("no callback registered as '{0}'")]
    UnknownCallback(String),
    #[error("{field} {value} is out of range")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("malformed action: {0}")]
    Malformed(String),
}

fn require<T>(value: Option<T>, action: &'static str, field: &'static str) -> Result<T, ActionError> {
    value.ok_or(ActionError::MissingField { action, field })
}

fn to_u32(value: i64, field: &'static str) -> Result<u32, ActionError> {
    u32::try_from(value).map_err(|_| ActionError::OutOfRange { field, value })
}

/// Negative delays behave like zero.
fn delay_ms(value: Option<i64>) -> u64 {
    value.map(|d| d.max(0) as u64).unwrap_or(0)
}

impl ActionSpec {
    /// Read one authored action out of an untyped document value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ActionError> {
        serde_json::from_value(value).map_err(|e| ActionError::Malformed(e.to_string()))
    }

    /// Convert into a typed action, resolving callback names against `callbacks`.
    pub fn into_action(self, callbacks: &CallbackRegistry) -> Result<Action, ActionError> {
        let kind = self.kind.ok_or(ActionError::MissingType)?;

        match kind.as_str() {
            "spawn" => {
                let item_id = to_u32(require(self.id, "spawn", "id")?, "id")?;
                let sub_delay = require(self.sub_delay, "spawn", "sub_delay")?;
                Ok(Action::Spawn(SpawnAction {
                    item_id,
                    delay: delay_ms(self.delay),
                    sub_delay: delay_ms(Some(sub_delay)),
                    offset: self.offset.unwrap_or(0.0),
                    distance: self.distance.unwrap_or(0.0),
                    position: self.pos,
                }))
            }
            "text" => {
                let sub_type = require(self.sub_type, "text", "sub_type")?;
                let message = require(self.message, "text", "message")?;
                let kind =
                    TextKind::parse(&sub_type).ok_or(ActionError::UnknownTextKind(sub_type))?;
                Ok(Action::Text(TextAction {
                    kind,
                    message,
                    delay: delay_ms(self.delay),
                    id: self.id.map(|id| to_u32(id, "id")).transpose()?,
                }))
            }
            "sound" => {
                let sound_id = to_u32(require(self.id, "sound", "id")?, "id")?;
                Ok(Action::Sound(SoundAction { sound_id }))
            }
            "stop_timer" => {
                let timer_id = to_u32(require(self.id, "stop_timer", "id")?, "id")?;
                Ok(Action::StopTimer(StopTimerAction { timer_id }))
            }
            "func" => {
                let name = require(self.func, "func", "func")?;
                let callback = callbacks
                    .get(&name)
                    .ok_or(ActionError::UnknownCallback(name))?;
                Ok(Action::Callback(CallbackAction {
                    callback,
                    delay: delay_ms(self.delay),
                    id: self.id.map(|id| to_u32(id, "id")).transpose()?,
                }))
            }
            _ => Err(ActionError::UnknownType(kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(toml: &str) -> ActionSpec {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_spawn_requires_item_and_sub_delay() {
        let callbacks = CallbackRegistry::new();

        let err = spec("type = \"spawn\"\nsub_delay = 5000")
            .into_action(&callbacks)
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::MissingField {
                action: "spawn",
                field: "id"
            }
        );

        let err = spec("type = \"spawn\"\nid = 42")
            .into_action(&callbacks)
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::MissingField {
                action: "spawn",
                field: "sub_delay"
            }
        );

        let action = spec("type = \"spawn\"\nid = 42\nsub_delay = 5000\ndistance = 75.0")
            .into_action(&callbacks)
            .unwrap();
        let Action::Spawn(spawn) = action else {
            panic!("expected spawn, got {action:?}");
        };
        assert_eq!(spawn.item_id, 42);
        assert_eq!(spawn.delay, 0);
        assert_eq!(spawn.sub_delay, 5000);
        assert_eq!(spawn.distance, 75.0);
        assert!(spawn.position.is_none());
    }

    #[test]
    fn test_text_subtypes() {
        let callbacks = CallbackRegistry::new();

        let action = spec("type = \"text\"\nsub_type = \"notification\"\nmessage = \"Enrage\"\ndelay = 1000")
            .into_action(&callbacks)
            .unwrap();
        assert_eq!(
            action,
            Action::Text(TextAction::new(TextKind::Notification, "Enrage", 1000))
        );

        let err = spec("type = \"text\"\nsub_type = \"shout\"\nmessage = \"x\"")
            .into_action(&callbacks)
            .unwrap_err();
        assert_eq!(err, ActionError::UnknownTextKind("shout".to_string()));

        let err = spec("type = \"text\"\nsub_type = \"message\"")
            .into_action(&callbacks)
            .unwrap_err();
        assert!(matches!(err, ActionError::MissingField { field: "message", .. }));
    }

    #[test]
    fn test_unknown_and_missing_type() {
        let callbacks = CallbackRegistry::new();
        assert_eq!(
            spec("type = \"explode\"").into_action(&callbacks).unwrap_err(),
            ActionError::UnknownType("explode".to_string())
        );
        assert_eq!(
            spec("id = 3").into_action(&callbacks).unwrap_err(),
            ActionError::MissingType
        );
    }

    #[test]
    fn test_func_resolves_registered_callback() {
        let mut callbacks = CallbackRegistry::new();
        callbacks.register("warn_party", |_, _, _| {});

        let action = spec("type = \"func\"\nfunc = \"warn_party\"\ndelay = 250\nid = 9")
            .into_action(&callbacks)
            .unwrap();
        let Action::Callback(cb) = action else {
            panic!("expected callback");
        };
        assert_eq!(cb.callback.name(), "warn_party");
        assert_eq!(cb.delay, 250);
        assert_eq!(cb.id, Some(9));

        let err = spec("type = \"func\"\nfunc = \"missing\"")
            .into_action(&callbacks)
            .unwrap_err();
        assert_eq!(err, ActionError::UnknownCallback("missing".to_string()));
    }

    #[test]
    fn test_wrongly_typed_fields_are_malformed() {
        let err = ActionSpec::from_value(serde_json::json!({
            "type": "text",
            "sub_type": "message",
            "message": 5,
        }))
        .unwrap_err();
        assert!(matches!(err, ActionError::Malformed(_)), "got {err:?}");

        let err = ActionSpec::from_value(serde_json::json!({
            "type": "spawn",
            "id": 1,
            "sub_delay": 100,
            "pos": { "x": 1.0, "y": 2.0 },
        }))
        .unwrap_err();
        assert!(matches!(err, ActionError::Malformed(_)), "got {err:?}");
    }

    #[test]
    fn test_negative_ids_are_rejected_and_negative_delays_clamped() {
        let callbacks = CallbackRegistry::new();
        let err = spec("type = \"sound\"\nid = -1")
            .into_action(&callbacks)
            .unwrap_err();
        assert_eq!(err, ActionError::OutOfRange { field: "id", value: -1 });

        let action = spec("type = \"text\"\nsub_type = \"message\"\nmessage = \"m\"\ndelay = -50")
            .into_action(&callbacks)
            .unwrap();
        let Action::Text(text) = action else {
            panic!("expected text");
        };
        assert_eq!(text.delay, 0);
    }
}
