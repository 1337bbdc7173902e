use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the pseudo-application whose gestures apply everywhere.
pub const ALL_APPLICATIONS: &str = "All";

/// Action settings: setting name -> raw value. Interpretation is left to the
/// action that consumes them.
pub type ActionSettings = BTreeMap<String, String>;

/// One resolved gesture binding for a single application.
///
/// Produced by the mapper for every application listed on an `<application>`
/// element, so a gesture declared for `"a,b"` yields two records that only
/// differ in `application`. All fields are kept as the raw attribute strings;
/// numeric parsing and validation belong to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct GestureConfigRecord {
    /// Application identifier (window class), or `All`.
    pub application: String,

    /// Gesture kind, e.g. `SWIPE`, `PINCH`, `TAP`.
    pub gesture_type: String,

    /// Finger count as written in the document.
    pub fingers: String,

    /// Gesture direction; empty when the gesture has none.
    #[serde(default)]
    pub direction: String,

    /// Action kind, e.g. `MAXIMIZE_RESTORE_WINDOW`.
    pub action_type: String,

    /// Action settings taken from the children of `<action>`.
    #[serde(default)]
    pub settings: ActionSettings,
}

impl GestureConfigRecord {
    /// Whether this record binds the given gesture.
    pub fn matches(&self, gesture_type: &str, fingers: &str, direction: &str) -> bool {
        self.gesture_type == gesture_type && self.fingers == fingers && self.direction == direction
    }
}
