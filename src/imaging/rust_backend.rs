//! Pure Rust image backend on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::with_guessed_format` + `into_dimensions` (header only) |
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image` crate decoders |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | `JpegEncoder` (RGB8, alpha dropped) |
//!
//! The format is sniffed from the file content, not the extension, so a
//! mislabelled `.jpg2` still decodes and a video never does.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ResizeParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

type FileReader = ImageReader<BufReader<File>>;

fn open_reader(path: &Path) -> Result<FileReader, BackendError> {
    let reader = ImageReader::open(path).map_err(BackendError::Io)?;
    reader.with_guessed_format().map_err(BackendError::Io)
}

fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?.decode().map_err(|e| {
        BackendError::Undecodable(format!("Failed to decode {}: {}", path.display(), e))
    })
}

/// Encode as baseline JPEG. JPEG has no alpha channel, so the image is
/// converted to RGB8 first.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let file = File::create(path).map_err(BackendError::Io)?;
    let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality as u8);
    rgb.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?.into_dimensions().map_err(|e| {
            BackendError::Undecodable(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_jpeg(&resized, &params.output, params.quality.value())
    }
}
