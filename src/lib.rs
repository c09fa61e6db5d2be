//! # media-toot
//!
//! A one-shot Mastodon media bot. Each run posts exactly one image or video
//! from a local collection that has not been posted before, then exits.
//! Scheduling is left to cron or a systemd timer.
//!
//! # Architecture: One Run, One Item
//!
//! ```text
//! media/ ──walk──→ Catalog ──select──→ Item ──compose──→ status text
//!                     ↑                  │
//!              visited.json              └──prepare──→ upload file (original or resized temp)
//!                     ↑                                      │
//!                     └────────── mark visited ←── post with retry
//! ```
//!
//! The visited ledger is the only state that survives a run, and it is
//! written exactly once, after the server accepted the post. A run that gives
//! up leaves it untouched, so the same item is simply tried again later.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Walks the media root once, keeps supported files not yet visited |
//! | [`select`] | Random and sequential pick of the next item |
//! | [`text`] | Status text: description, metadata, hashtags from directory names |
//! | [`metadata`] | Optional curated description and source attribution per item |
//! | [`ledger`] | Which items have been posted |
//! | [`store`] | JSON-file key-value store behind the ledger and the metadata db |
//! | [`imaging`] | Pure-Rust identify + resize of over-wide images into temp JPEGs |
//! | [`poster`] | The posting service as the pipeline sees it |
//! | [`mastodon`] | Mastodon REST implementation of [`poster::Poster`] |
//! | [`retry`] | Bounded retry with a fixed delay |
//! | [`pipeline`] | The run itself: select → compose → prepare → publish → commit → cleanup |
//! | [`config`] | `config.toml` and secrets loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Directories Are Tags
//!
//! There is no tagging database. The directory path of an item relative to
//! the media root is split on separators and whitespace and each piece becomes
//! a hashtag, so `media/cats/black and white/01.jpg` is posted with
//! `#cats #black #and #white`. Curating tags means moving files.
//!
//! ## Ids Are Relative Paths
//!
//! Both the ledger and the metadata database are keyed by the path relative
//! to the media root. Moving the whole collection does not reset its history.
//!
//! ## Plain JSON State
//!
//! The ledger and the metadata database are single JSON objects on disk,
//! rewritten atomically (temp file + rename) on every change. They stay
//! readable and editable by hand.
//!
//! ## Pure-Rust Imaging
//!
//! Resizing uses the `image` crate (Lanczos3, JPEG output). No ImageMagick,
//! no system libraries; videos are never decoded and always uploaded as-is.

pub mod catalog;
pub mod config;
pub mod imaging;
pub mod ledger;
pub mod mastodon;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod poster;
pub mod retry;
pub mod select;
pub mod store;
pub mod text;

#[cfg(test)]
pub(crate) mod test_helpers;
