/*!
Gesture record store.

The store holds the currently active set of gesture records and is read by the
action dispatcher. Loading only ever issues three calls against it:
`add_record`, `clear_all` and `replace_all`.

Consistency contract:
- `replace_all` on a plain implementor defaults to clear-then-add; a reader
  sharing such a store may observe it empty or half populated mid-reload.
- [`SharedGestureStore`] overrides `replace_all` with a swap under a single
  write lock, so readers see either the previous or the new set.
*/

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{ALL_APPLICATIONS, GestureConfigRecord};

/// Sink for gesture records produced by the mapper.
pub trait GestureStore {
    fn add_record(&mut self, record: GestureConfigRecord);

    fn clear_all(&mut self);

    /// Replace the active set with `records`.
    fn replace_all(&mut self, records: Vec<GestureConfigRecord>) {
        self.clear_all();
        for record in records {
            self.add_record(record);
        }
    }
}

impl GestureStore for Vec<GestureConfigRecord> {
    fn add_record(&mut self, record: GestureConfigRecord) {
        self.push(record);
    }

    fn clear_all(&mut self) {
        self.clear();
    }

    fn replace_all(&mut self, records: Vec<GestureConfigRecord>) {
        *self = records;
    }
}

/// Thread-safe store shared between the loader, the watcher task and readers.
///
/// Cloning yields another handle to the same records.
#[derive(Debug, Clone, Default)]
pub struct SharedGestureStore {
    records: Arc<RwLock<Vec<GestureConfigRecord>>>,
}

impl SharedGestureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the active records, in insertion order.
    pub fn snapshot(&self) -> Vec<GestureConfigRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Records declared for exactly `application`.
    pub fn records_for(&self, application: &str) -> Vec<GestureConfigRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.application == application)
            .cloned()
            .collect()
    }

    /// Find the binding for a gesture performed in `application`.
    ///
    /// Falls back to the `All` application when the named one has no match.
    /// When several records match, the one declared last wins.
    pub fn lookup(
        &self,
        application: &str,
        gesture_type: &str,
        fingers: &str,
        direction: &str,
    ) -> Option<GestureConfigRecord> {
        let records = self.records.read();
        let find = |app: &str| {
            records
                .iter()
                .rev()
                .find(|r| r.application == app && r.matches(gesture_type, fingers, direction))
                .cloned()
        };
        find(application).or_else(|| find(ALL_APPLICATIONS))
    }
}

impl GestureStore for SharedGestureStore {
    fn add_record(&mut self, record: GestureConfigRecord) {
        self.records.write().push(record);
    }

    fn clear_all(&mut self) {
        self.records.write().clear();
    }

    fn replace_all(&mut self, records: Vec<GestureConfigRecord>) {
        *self.records.write() = records;
    }
}
