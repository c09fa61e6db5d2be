//! Curated per-item metadata.
//!
//! Some items carry a hand-written description and a list of source
//! attributions, kept in the optional "info" database keyed by the item's
//! path relative to the media root:
//!
//! ```json
//! {
//!   "cats/nap.jpg": {
//!     "id": 17,
//!     "desc": "A very sleepy cat",
//!     "source": ["https://example.org/nap", "@alice@example.social"]
//!   }
//! }
//! ```
//!
//! ## Rendering
//!
//! A record is rendered as the description, followed on its own line by
//! `Source: ` and the sources joined with `|`:
//!
//! ```text
//! A very sleepy cat
//! Source: https://example.org/nap|@alice@example.social
//! ```
//!
//! Either line is dropped when empty. Most items have no record at all, and
//! the database itself is optional; both cases render as an empty string.

use crate::store::KvStore;
use crate::text::join_non_empty;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

/// Curated metadata for a single item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetadataRecord {
    #[serde(default, rename = "desc", deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, rename = "source", deserialize_with = "null_as_default")]
    pub sources: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl MetadataRecord {
    /// `Source: a|b`, or empty when there are no sources.
    pub fn source_line(&self) -> String {
        if self.sources.is_empty() {
            String::new()
        } else {
            format!("Source: {}", self.sources.join("|"))
        }
    }

    /// Description and source line, newline separated.
    pub fn render(&self) -> String {
        let source_line = self.source_line();
        join_non_empty(
            "\n",
            &[Some(self.description.as_str()), Some(source_line.as_str())],
        )
    }
}

/// Read-only view over the optional metadata database.
pub struct MetadataStore {
    db: Option<Box<dyn KvStore>>,
}

impl MetadataStore {
    /// No metadata configured. Every lookup is empty.
    pub fn none() -> Self {
        Self { db: None }
    }

    pub fn new(db: Box<dyn KvStore>) -> Self {
        Self { db: Some(db) }
    }

    pub fn is_configured(&self) -> bool {
        self.db.is_some()
    }

    /// The record stored for `id`, if any.
    ///
    /// A record that does not have the expected shape is logged and treated as
    /// missing rather than failing the run.
    pub fn record(&self, id: &str) -> Option<MetadataRecord> {
        let value = self.db.as_ref()?.get(id)?;
        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(item = id, error = %e, "ignoring malformed metadata record");
                None
            }
        }
    }

    /// Rendered metadata text for `id`, or an empty string.
    pub fn lookup(&self, id: &str) -> String {
        match self.record(id) {
            Some(record) => {
                debug!(item = id, "found in metadata db");
                record.render()
            }
            None => {
                if self.is_configured() {
                    debug!(item = id, "not in metadata db");
                }
                String::new()
            }
        }
    }
}
