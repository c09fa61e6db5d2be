//! Shared test utilities for the media-toot test suite.
//!
//! Fixture builders for media trees on disk and a [`RecordingPoster`] that
//! stands in for the posting service.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_tree(tmp.path(), &["cats/a.png", "dogs/b.mp4"]);
//!
//! let poster = RecordingPoster::failing(4);
//! // ... run the pipeline ...
//! assert_eq!(poster.attempts(), 5);
//! ```

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use crate::poster::{PostError, Poster};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create each relative path under `root` with placeholder content, making
/// parent directories as needed.
pub fn write_tree(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, b"fixture").unwrap();
    }
}

/// Write a real PNG of the given size. The format is explicit so odd
/// extensions still get PNG content.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
    .save_with_format(path, image::ImageFormat::Png)
    .unwrap();
}

// =========================================================================
// Posting double
// =========================================================================

/// One successful call seen by a [`RecordingPoster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPost {
    pub text: String,
    pub media: Option<PathBuf>,
    pub sensitive: bool,
    /// Whether the media file existed at the moment of the call.
    pub media_existed: bool,
}

/// Fails the first `failures` calls, then records every call it accepts.
pub struct RecordingPoster {
    failures: u32,
    attempts: Cell<u32>,
    posts: RefCell<Vec<RecordedPost>>,
}

impl RecordingPoster {
    pub fn new() -> Self {
        Self::failing(0)
    }

    pub fn failing(failures: u32) -> Self {
        Self {
            failures,
            attempts: Cell::new(0),
            posts: RefCell::new(Vec::new()),
        }
    }

    pub fn always_failing() -> Self {
        Self::failing(u32::MAX)
    }

    /// Total calls, failed and successful.
    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }

    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.borrow().clone()
    }

    fn attempt(&self, post: RecordedPost) -> Result<(), PostError> {
        let n = self.attempts.get() + 1;
        self.attempts.set(n);
        if n <= self.failures {
            return Err(PostError::Other(format!("simulated outage #{n}")));
        }
        self.posts.borrow_mut().push(post);
        Ok(())
    }
}

impl Poster for RecordingPoster {
    fn post_image(&self, text: &str, media: &Path, sensitive: bool) -> Result<(), PostError> {
        self.attempt(RecordedPost {
            text: text.to_string(),
            media: Some(media.to_path_buf()),
            sensitive,
            media_existed: media.exists(),
        })
    }

    fn post_text(&self, text: &str) -> Result<(), PostError> {
        self.attempt(RecordedPost {
            text: text.to_string(),
            media: None,
            sensitive: false,
            media_existed: false,
        })
    }
}
