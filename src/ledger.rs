//! The visited ledger: which items have already been posted.
//!
//! Keys are item ids (paths relative to the media root), so moving the whole
//! collection to another directory keeps its history. An entry is written only
//! after the server confirmed the post, and entries are never removed.
//!
//! Ledgers written by the older bot keyed items by the media root as written
//! in its config joined with the relative path (`media/cats/nap.jpg`). With
//! [`VisitedLedger::with_legacy_prefix`] those keys are still honored on
//! lookup. New entries always use the plain relative id.

use crate::store::{KvStore, StoreError};
use serde_json::Value;

pub struct VisitedLedger {
    store: Box<dyn KvStore>,
    legacy_prefix: Option<String>,
}

impl VisitedLedger {
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self {
            store,
            legacy_prefix: None,
        }
    }

    /// Also treat `<prefix>/<id>` as visited. An empty prefix is ignored.
    pub fn with_legacy_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        self.legacy_prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.store.exists(id)
            || self
                .legacy_prefix
                .as_ref()
                .is_some_and(|prefix| self.store.exists(&format!("{}/{}", prefix, id)))
    }

    pub fn mark_visited(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.set(id, Value::Bool(true))
    }
}
