//! The posting service seen from the pipeline.
//!
//! The pipeline only needs two calls and does not care why one failed: every
//! [`PostError`] is retried the same way. [`MastodonClient`](crate::mastodon::MastodonClient)
//! is the real implementation.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("Media {0} was still processing after waiting")]
    MediaNotReady(String),
    #[error("{0}")]
    Other(String),
}

pub trait Poster {
    /// Upload `media` and publish a status with `text` attached to it.
    fn post_image(&self, text: &str, media: &Path, sensitive: bool) -> Result<(), PostError>;

    /// Publish a text-only status.
    fn post_text(&self, text: &str) -> Result<(), PostError>;
}
