//! Photo source backed by image files in a directory.
//!
//! Discovery uses walkdir, dimensions come from the image header only, and
//! ids are an xxh3 hash of the file path so they stay stable across scans.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use image::ImageReader;
use tokio::task;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;
use xxhash_rust::xxh3::xxh3_64;

use super::PhotoSource;
use crate::error::FetchError;
use crate::models::{PhotoId, PhotoRecord};

/// Dimension reported for files whose header cannot be read.
///
/// Such photos are left out by the packer and reported as skipped.
const ERROR_DIMENSION: u32 = 0;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"];

/// Configuration for the directory scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to scan directories recursively.
    pub recursive: bool,
    /// Maximum directory depth (0 = unlimited).
    pub max_depth: usize,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: 0, // unlimited
            follow_symlinks: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    config: ScanConfig,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, ScanConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: ScanConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scans the directory synchronously.
    pub fn scan(&self) -> Result<Vec<PhotoRecord>> {
        scan_directory(&self.root, &self.config)
    }
}

impl PhotoSource for DirectorySource {
    async fn list_photos(&self) -> Result<Vec<PhotoRecord>, FetchError> {
        let root = self.root.clone();
        let config = self.config.clone();

        // Walking and header probing block on disk I/O.
        let photos = task::spawn_blocking(move || scan_directory(&root, &config))
            .await
            .map_err(|e| FetchError::TaskFailed(e.to_string()))??;

        Ok(photos)
    }
}

/// Derives a stable id from a file path.
pub fn photo_id_for_path(path: &Path) -> PhotoId {
    PhotoId(xxh3_64(path.as_os_str().as_encoded_bytes()))
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn scan_directory(root: &Path, config: &ScanConfig) -> Result<Vec<PhotoRecord>> {
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {:?}", root);
    }

    info!("Starting scan of {:?}", root);

    let mut walker = WalkDir::new(root).follow_links(config.follow_symlinks);
    if !config.recursive {
        walker = walker.max_depth(1);
    } else if config.max_depth > 0 {
        walker = walker.max_depth(config.max_depth);
    }

    let mut photos = Vec::new();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_dir() || !is_image(entry.path()) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to read metadata for {:?}: {}", entry.path(), e);
                continue;
            }
        };

        let saved_on = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        photos.push(photo_from_file(entry.path(), saved_on));
    }

    // Sort by path for consistent ordering
    photos.sort_by(|a, b| a.location.cmp(&b.location));

    let unreadable = photos.iter().filter(|p| !p.has_valid_geometry()).count();
    info!(
        "Scan complete: {} photos, {} unreadable",
        photos.len(),
        unreadable
    );

    Ok(photos)
}

fn photo_from_file(path: &Path, saved_on: i64) -> PhotoRecord {
    let (width, height) = read_dimensions(path);
    let mut photo = PhotoRecord::new(photo_id_for_path(path), width, height, saved_on)
        .with_location(path.to_string_lossy());
    if let Some(name) = path.file_name() {
        photo = photo.with_name(name.to_string_lossy());
    }
    photo
}

/// Reads image dimensions from the header without decoding pixels.
///
/// Returns `(0, 0)` for unreadable files instead of failing the scan.
fn read_dimensions(path: &Path) -> (u32, u32) {
    trace!("Reading dimensions from {:?}", path);

    let dimensions = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {:?}", path))
        .and_then(|reader| {
            reader
                .with_guessed_format()
                .context("Failed to guess image format")
        })
        .and_then(|reader| {
            reader
                .into_dimensions()
                .with_context(|| format!("Failed to read dimensions: {:?}", path))
        });

    match dimensions {
        Ok((width, height)) => (width, height),
        Err(e) => {
            debug!("{:#}", e);
            warn!("Unreadable image {:?}, excluding from layout", path);
            (ERROR_DIMENSION, ERROR_DIMENSION)
        }
    }
}
