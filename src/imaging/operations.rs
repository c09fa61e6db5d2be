//! Upload preparation: make sure an image is not wider than the server wants.
//!
//! ```text
//! identify fails (video, unknown format)  →  upload the original
//! width <= max_width                      →  upload the original
//! width >  max_width                      →  resize into a temp .jpg, upload that
//!   ...but the body does not decode       →  upload the original
//! ```
//!
//! The temp copy is owned by the returned [`PreparedMedia`]. It is removed by
//! [`PreparedMedia::cleanup`] once the upload attempts are over, or on drop if
//! the run bails out early, so no exit path leaks it.

use super::backend::{BackendError, ImageBackend};
use super::calculations::fit_to_width;
use super::params::{Quality, ResizeParams};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info, warn};

/// The file handed to the posting service.
#[derive(Debug)]
pub enum PreparedMedia {
    /// The item itself, untouched.
    Original(PathBuf),
    /// A resized temporary copy, deleted on cleanup or drop.
    Resized {
        path: TempPath,
        width: u32,
        height: u32,
    },
}

impl PreparedMedia {
    pub fn path(&self) -> &Path {
        match self {
            PreparedMedia::Original(path) => path,
            PreparedMedia::Resized { path, .. } => path,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, PreparedMedia::Resized { .. })
    }

    /// Delete the temp copy, if any, reporting failures.
    pub fn cleanup(self) -> io::Result<()> {
        match self {
            PreparedMedia::Original(_) => Ok(()),
            PreparedMedia::Resized { path, .. } => {
                debug!(path = %path.display(), "removing temporary resized image");
                path.close()
            }
        }
    }
}

/// Decide whether `source` needs shrinking and produce the file to upload.
///
/// Anything the backend cannot identify or decode is passed through as-is.
/// Only a resize that fails on a decodable image (encoding, disk) is an
/// error.
pub fn prepare_media(
    backend: &dyn ImageBackend,
    source: &Path,
    max_width: u32,
    quality: Quality,
) -> Result<PreparedMedia, BackendError> {
    let dims = match backend.identify(source) {
        Ok(dims) => dims,
        Err(e) => {
            debug!(path = %source.display(), reason = %e, "not an image, uploading as-is");
            return Ok(PreparedMedia::Original(source.to_path_buf()));
        }
    };

    let Some((width, height)) = fit_to_width((dims.width, dims.height), max_width) else {
        return Ok(PreparedMedia::Original(source.to_path_buf()));
    };

    let temp = tempfile::Builder::new()
        .prefix("media-toot-")
        .suffix(".jpg")
        .tempfile()?
        .into_temp_path();

    info!(
        "resizing {}x{} -> {}x{}, temporary file {}",
        dims.width,
        dims.height,
        width,
        height,
        temp.display()
    );
    let resized = backend.resize(&ResizeParams {
        source: source.to_path_buf(),
        output: temp.to_path_buf(),
        width,
        height,
        quality,
    });
    match resized {
        Ok(()) => {}
        // header parsed but the pixel data did not: treat like any other
        // undecodable file, the temp file goes with `temp`
        Err(BackendError::Undecodable(reason)) => {
            warn!(path = %source.display(), %reason, "cannot decode image, uploading as-is");
            return Ok(PreparedMedia::Original(source.to_path_buf()));
        }
        Err(e) => return Err(e),
    }

    Ok(PreparedMedia::Resized {
        path: temp,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::rust_backend::RustBackend;
    use crate::test_helpers::write_png;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    #[test]
    fn wide_image_is_resized_to_temp_file() {
        let backend = MockBackend::with_dimensions(vec![dims(4000, 2000)]);

        let prepared =
            prepare_media(&backend, Path::new("/media/wide.png"), 2048, Quality::default())
                .unwrap();

        assert!(prepared.is_temporary());
        assert!(matches!(
            prepared,
            PreparedMedia::Resized {
                width: 2048,
                height: 1024,
                ..
            }
        ));
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[1],
            RecordedOp::Resize { source, width: 2048, height: 1024, quality: 90, .. }
                if source == "/media/wide.png"
        ));
    }

    #[test]
    fn narrow_image_passes_through() {
        let backend = MockBackend::with_dimensions(vec![dims(1000, 2000)]);

        let prepared =
            prepare_media(&backend, Path::new("/media/tall.png"), 2048, Quality::default())
                .unwrap();

        assert!(!prepared.is_temporary());
        assert_eq!(prepared.path(), Path::new("/media/tall.png"));
        assert_eq!(backend.get_operations().len(), 1);
    }

    #[test]
    fn undecodable_media_passes_through() {
        let backend = MockBackend::new();

        let prepared =
            prepare_media(&backend, Path::new("/media/clip.mp4"), 2048, Quality::default())
                .unwrap();

        assert_eq!(prepared.path(), Path::new("/media/clip.mp4"));
        assert!(!prepared.is_temporary());
    }

    #[test]
    fn cleanup_removes_temp_file() {
        let backend = MockBackend::with_dimensions(vec![dims(4000, 2000)]);
        let prepared =
            prepare_media(&backend, Path::new("/media/wide.png"), 2048, Quality::default())
                .unwrap();
        let temp = prepared.path().to_path_buf();
        assert!(temp.exists());

        prepared.cleanup().unwrap();
        assert!(!temp.exists());
    }

    #[test]
    fn drop_removes_temp_file() {
        let backend = MockBackend::with_dimensions(vec![dims(3000, 3000)]);
        let prepared =
            prepare_media(&backend, Path::new("/media/wide.png"), 2048, Quality::default())
                .unwrap();
        let temp = prepared.path().to_path_buf();
        drop(prepared);
        assert!(!temp.exists());
    }

    #[test]
    fn cleanup_of_original_touches_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let original = tmp.path().join("keep.png");
        std::fs::write(&original, b"x").unwrap();

        PreparedMedia::Original(original.clone()).cleanup().unwrap();
        assert!(original.exists());
    }

    #[test]
    fn truncated_wide_image_passes_through() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.png");
        write_png(&source, 4000, 10);
        let bytes = std::fs::read(&source).unwrap();
        std::fs::write(&source, &bytes[..bytes.len() / 2]).unwrap();

        let prepared =
            prepare_media(&RustBackend::new(), &source, 2048, Quality::default()).unwrap();

        assert!(!prepared.is_temporary());
        assert_eq!(prepared.path(), source.as_path());
    }

    #[test]
    fn undecodable_resize_leaves_no_temp_file() {
        let backend = MockBackend::undecodable_resize(vec![dims(5000, 1000)]);

        let prepared =
            prepare_media(&backend, Path::new("/media/odd.png"), 2048, Quality::default())
                .unwrap();

        assert_eq!(prepared.path(), Path::new("/media/odd.png"));
        let ops = backend.get_operations();
        let RecordedOp::Resize { output, .. } = &ops[1] else {
            panic!("expected a resize");
        };
        assert!(!Path::new(output).exists());
    }

    #[test]
    fn failed_resize_is_error() {
        let backend = MockBackend::failing_resize(vec![dims(5000, 1000)]);
        let result = prepare_media(&backend, Path::new("/media/wide.png"), 2048, Quality::default());
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));

        let ops = backend.get_operations();
        let RecordedOp::Resize { output, .. } = &ops[1] else {
            panic!("expected a resize");
        };
        assert!(!Path::new(output).exists());
    }
}
