//! Media discovery: which files under the root are eligible for posting.
//!
//! The whole tree under the media root is walked once per run. Every regular
//! file is counted; an item becomes a **candidate** when
//!
//! 1. its extension looks like a supported media type, and
//! 2. its id is not in the visited ledger.
//!
//! ## Supported types
//!
//! The lower-cased extension must *contain* one of `gif`, `png`, `jpg`,
//! `jpeg`, `mp4`, `mov` or `webm`. This is a substring test, not an exact
//! match, so oddities like `.jpg2` or `.JPEG` are still picked up. Only the
//! extension is inspected, never directory names, so `giftshop/notes.txt` is
//! not a candidate.
//!
//! ## Ordering
//!
//! Directory entries are visited sorted by file name, so on an unchanged tree
//! the candidate order (and therefore the sequential pick) is the same on
//! every run.
//!
//! ## Item ids
//!
//! An item's id is its path relative to the root with `/` separators
//! (`cats/black and white/01.jpg`). The ledger and the metadata database are
//! both keyed by it.

use crate::ledger::VisitedLedger;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Media directory not found: {0}")]
    MissingRoot(PathBuf),
    #[error("Failed to walk media directory {root}: {source}")]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },
}

const MEDIA_EXTENSIONS: &[&str] = &["gif", "png", "jpg", "jpeg", "mp4", "mov", "webm"];

/// Broad media type, inferred from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// png / jpg / jpeg
    Still,
    Gif,
    /// mp4 / webm
    Video,
    /// mov
    QuickTime,
}

impl MediaKind {
    /// Classify `path`, or `None` if it is not a supported media file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = lowercase_extension(path)?;
        if !MEDIA_EXTENSIONS.iter().any(|e| ext.contains(e)) {
            return None;
        }
        let kind = if ext.contains("mp4") || ext.contains("webm") {
            MediaKind::Video
        } else if ext.contains("mov") {
            MediaKind::QuickTime
        } else if ext.contains("gif") {
            MediaKind::Gif
        } else {
            MediaKind::Still
        };
        Some(kind)
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Whether `path` looks like a media file this tool can post.
pub fn is_supported(path: &Path) -> bool {
    MediaKind::from_path(path).is_some()
}

/// A postable media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Path on disk (root joined with the relative id).
    pub path: PathBuf,
    /// Path relative to the media root, `/`-separated.
    pub id: String,
    pub kind: MediaKind,
}

/// The candidates for this run.
///
/// Built once; neither the ledger nor the filesystem is consulted again.
#[derive(Debug)]
pub struct Catalog {
    pub root: PathBuf,
    /// Every regular file found under the root, supported or not.
    pub total_files: usize,
    /// Supported, not yet visited items in walk order.
    pub candidates: Vec<Item>,
}

impl Catalog {
    pub fn build(root: &Path, ledger: &VisitedLedger) -> Result<Self, CatalogError> {
        if !root.is_dir() {
            return Err(CatalogError::MissingRoot(root.to_path_buf()));
        }

        let mut total_files = 0;
        let mut candidates = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| CatalogError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            // symlinked files count, symlinked directories are not entered
            let file_type = entry.file_type();
            let is_file =
                file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }
            total_files += 1;

            let path = entry.into_path();
            let Some(kind) = MediaKind::from_path(&path) else {
                continue;
            };
            let id = relative_id(root, &path);
            if ledger.contains(&id) {
                continue;
            }
            candidates.push(Item { path, id, kind });
        }

        Ok(Self {
            root: root.to_path_buf(),
            total_files,
            candidates,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// `/`-joined path of `path` relative to `root`.
pub fn relative_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
