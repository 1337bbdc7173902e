//! Maps the generic document tree onto gesture records.
//!
//! Expected layout:
//!
//! ```text
//! <root>
//!   <application name="app1,app2">
//!     <gesture type="SWIPE" fingers="3" direction="UP">
//!       <action type="MAXIMIZE_RESTORE_WINDOW">
//!         <animate>true</animate>
//!       </action>
//!     </gesture>
//!   </application>
//! </root>
//! ```
//!
//! Every gesture is emitted once per name listed on its application, in
//! document order. Empty names are dropped, and an application left with
//! no name is skipped with a warning. Other missing attributes read as
//! empty strings. A gesture without an `<action>` is skipped with a warning.

use tracing::{debug, warn};

use super::models::{ActionSettings, GestureConfigRecord};
use crate::document::Node;
use crate::store::GestureStore;

/// Counters for one mapping pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapSummary {
    pub applications: usize,
    pub gestures: usize,
    pub records: usize,
    pub skipped_gestures: usize,
    pub skipped_applications: usize,
}

/// Walk `root` and add every resulting record to `store`.
pub fn map_into<S: GestureStore + ?Sized>(root: &Node, store: &mut S) -> MapSummary {
    let mut summary = MapSummary::default();

    for application in root.children_named("application") {
        summary.applications += 1;
        let names = split_applications(application.attr_or_empty("name"));
        if names.is_empty() {
            warn!(
                target: "gestured::mapper",
                name = application.attr_or_empty("name"),
                "Application has no name; skipping its gestures"
            );
            summary.skipped_applications += 1;
            continue;
        }

        for gesture in application.children_named("gesture") {
            let Some(action) = gesture.child("action") else {
                warn!(
                    target: "gestured::mapper",
                    applications = application.attr_or_empty("name"),
                    gesture_type = gesture.attr_or_empty("type"),
                    fingers = gesture.attr_or_empty("fingers"),
                    "Gesture has no <action>; skipping"
                );
                summary.skipped_gestures += 1;
                continue;
            };
            summary.gestures += 1;

            let template = GestureConfigRecord {
                application: String::new(),
                gesture_type: gesture.attr_or_empty("type").to_owned(),
                fingers: gesture.attr_or_empty("fingers").to_owned(),
                direction: gesture.attr_or_empty("direction").to_owned(),
                action_type: action.attr_or_empty("type").to_owned(),
                settings: action_settings(action),
            };

            for name in &names {
                store.add_record(GestureConfigRecord {
                    application: (*name).to_owned(),
                    ..template.clone()
                });
                summary.records += 1;
            }
        }
    }

    debug!(
        target: "gestured::mapper",
        applications = summary.applications,
        gestures = summary.gestures,
        records = summary.records,
        skipped = summary.skipped_gestures,
        skipped_applications = summary.skipped_applications,
        "Mapped configuration document"
    );
    summary
}

/// Map `root` into a fresh list of records.
pub fn map_document(root: &Node) -> (Vec<GestureConfigRecord>, MapSummary) {
    let mut records: Vec<GestureConfigRecord> = Vec::new();
    let summary = map_into(root, &mut records);
    (records, summary)
}

/// Names are split on commas verbatim; surrounding whitespace is kept and
/// empty entries are dropped.
fn split_applications(names: &str) -> Vec<&str> {
    names.split(',').filter(|name| !name.is_empty()).collect()
}

fn action_settings(action: &Node) -> ActionSettings {
    action
        .children
        .iter()
        .map(|setting| (setting.tag.clone(), setting.text().to_owned()))
        .collect()
}
