//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the two operations upload preparation
//! needs: identify (read dimensions) and resize. The production
//! implementation is [`RustBackend`](super::rust_backend::RustBackend).

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a decodable image: {0}")]
    Undecodable(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

pub trait ImageBackend {
    /// Get image dimensions. Fails for anything that is not a decodable image
    /// (videos included).
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Write a resized copy of `params.source` to `params.output`.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
