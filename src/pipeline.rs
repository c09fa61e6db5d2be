//! One publishing run, from candidate list to ledger entry.
//!
//! ```text
//! Selecting ─┬─ no candidate ─────────────────────────────────────────→ Done
//!            └→ Composing → Preparing → Publishing ─┬─ delivered → Committing → Cleanup → Done
//!                                                   └─ exhausted ───────────────→ Cleanup → Abandoned
//! ```
//!
//! The ledger is written in `Committing` and nowhere else, which only runs
//! after the server accepted the post. An item that was never published is
//! never marked visited, and a published item is marked before the run ends.
//!
//! A resized temporary upload is removed in `Cleanup` on both paths. If the
//! run stops early with a [`PipelineError`], dropping the prepared media
//! removes it instead.

use crate::catalog::{Catalog, Item};
use crate::imaging::{BackendError, ImageBackend, Quality, prepare_media};
use crate::ledger::VisitedLedger;
use crate::metadata::MetadataStore;
use crate::poster::Poster;
use crate::retry::{Delivery, RetryPolicy, deliver};
use crate::select::SelectionStrategy;
use crate::store::StoreError;
use crate::text::{ComposeOptions, compose_post};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to prepare {id} for upload: {source}")]
    Prepare { id: String, source: BackendError },
    #[error("{id} was posted but could not be marked visited, it may be posted again: {source}")]
    Commit { id: String, source: StoreError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Selecting,
    Composing,
    Preparing,
    Publishing,
    Committing,
    Cleanup,
    Done,
    Abandoned,
}

/// How a run ended. All three are clean exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NothingToPost,
    Posted {
        item: Item,
        attempts: u32,
        resized: bool,
    },
    GaveUp {
        item: Item,
        attempts: u32,
        last_error: String,
    },
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub compose: ComposeOptions,
    pub sensitive: bool,
    pub max_width: u32,
    pub quality: Quality,
    pub retry: RetryPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            compose: ComposeOptions::default(),
            sensitive: false,
            max_width: 2048,
            quality: Quality::default(),
            retry: RetryPolicy::default(),
        }
    }
}

pub struct Pipeline<'a> {
    poster: &'a dyn Poster,
    backend: &'a dyn ImageBackend,
    metadata: &'a MetadataStore,
    ledger: &'a mut VisitedLedger,
    options: PipelineOptions,
    stage: Stage,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        poster: &'a dyn Poster,
        backend: &'a dyn ImageBackend,
        metadata: &'a MetadataStore,
        ledger: &'a mut VisitedLedger,
        options: PipelineOptions,
    ) -> Self {
        Self {
            poster,
            backend,
            metadata,
            ledger,
            options,
            stage: Stage::Selecting,
        }
    }

    /// The stage the last run reached.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, "pipeline stage");
        self.stage = stage;
    }

    pub fn run(
        &mut self,
        catalog: &Catalog,
        strategy: &mut dyn SelectionStrategy,
    ) -> Result<Outcome, PipelineError> {
        self.enter(Stage::Selecting);
        let Some(item) = strategy.select(&catalog.candidates) else {
            info!("nothing to post");
            self.enter(Stage::Done);
            return Ok(Outcome::NothingToPost);
        };
        let item = item.clone();
        info!(
            "selected {} ({} of {} files are candidates)",
            item.id,
            catalog.candidates.len(),
            catalog.total_files
        );

        self.enter(Stage::Composing);
        let metadata = self.metadata.lookup(&item.id);
        let text = compose_post(&self.options.compose, &metadata, &catalog.root, &item);
        debug!("status text: {:?}", text);

        self.enter(Stage::Preparing);
        let media = prepare_media(
            self.backend,
            &item.path,
            self.options.max_width,
            self.options.quality,
        )
        .map_err(|source| PipelineError::Prepare {
            id: item.id.clone(),
            source,
        })?;
        let resized = media.is_temporary();

        self.enter(Stage::Publishing);
        let poster = self.poster;
        let sensitive = self.options.sensitive;
        let delivery = deliver(self.options.retry, |attempt| {
            debug!(attempt, "uploading {}", media.path().display());
            poster.post_image(&text, media.path(), sensitive)
        });

        let outcome = match delivery {
            Delivery::Delivered { attempts, .. } => {
                self.enter(Stage::Committing);
                if let Err(source) = self.ledger.mark_visited(&item.id) {
                    error!(id = %item.id, "posted but the visited ledger was not updated");
                    return Err(PipelineError::Commit {
                        id: item.id,
                        source,
                    });
                }
                Outcome::Posted {
                    item,
                    attempts,
                    resized,
                }
            }
            Delivery::Exhausted {
                attempts,
                last_error,
            } => Outcome::GaveUp {
                item,
                attempts,
                last_error,
            },
        };

        self.enter(Stage::Cleanup);
        if let Err(e) = media.cleanup() {
            warn!("could not remove temporary upload: {}", e);
        }

        match outcome {
            Outcome::GaveUp { .. } => self.enter(Stage::Abandoned),
            _ => self.enter(Stage::Done),
        }
        Ok(outcome)
    }
}
