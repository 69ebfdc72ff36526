// SPDX-License-Identifier: GPL-3.0-only

//! Storage seams: persisting captures and reading back the gallery
//!
//! The coordinator only knows the [`CaptureSink`] and [`GalleryIndex`]
//! traits. [`DirectoryGallery`] is the filesystem implementation used by the
//! CLI; the JPEG-writing sink lives in [`crate::pipelines::photo`].

use crate::backends::camera::{PhotoReference, QualityTier, RawImage};
use crate::errors::StorageError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persists captured images to shared storage
#[async_trait]
pub trait CaptureSink: Send + Sync {
    /// Store `image` under (a variation of) `suggested_name`
    ///
    /// `suggested_name` carries no extension; the sink picks one matching its
    /// encoding. `quality` is the tier the capturing session was bound with.
    async fn persist(
        &self,
        image: RawImage,
        suggested_name: &str,
        quality: QualityTier,
    ) -> Result<PhotoReference, StorageError>;
}

/// Read access to previously captured photos
#[async_trait]
pub trait GalleryIndex: Send + Sync {
    /// All photos, newest first
    ///
    /// A finite snapshot; call again to refresh.
    async fn list_photos_newest_first(&self) -> Result<Vec<PhotoReference>, StorageError>;
}

/// Photos directory for a folder name under the user's Pictures directory
pub fn photo_dir_for(folder: &str) -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(folder)
}

fn is_photo(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            ext.eq_ignore_ascii_case("jpg")
                || ext.eq_ignore_ascii_case("jpeg")
                || ext.eq_ignore_ascii_case("png")
        })
        .unwrap_or(false)
}

/// Gallery backed by a directory of JPEG/PNG files
#[derive(Debug, Clone)]
pub struct DirectoryGallery {
    dir: PathBuf,
}

impl DirectoryGallery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl GalleryIndex for DirectoryGallery {
    async fn list_photos_newest_first(&self) -> Result<Vec<PhotoReference>, StorageError> {
        let dir = self.dir.clone();

        // Directory scanning uses blocking std::fs
        let mut entries = tokio::task::spawn_blocking(move || {
            let read = match std::fs::read_dir(&dir) {
                Ok(read) => read,
                // No captures yet
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(StorageError::from(e)),
            };

            let mut files = Vec::new();
            for entry in read.flatten() {
                let path = entry.path();
                if !is_photo(&path) {
                    continue;
                }
                let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
                files.push((path, modified));
            }
            Ok(files)
        })
        .await
        .map_err(|e| StorageError::Io(format!("gallery scan task failed: {}", e)))??;

        // Newest first; ties broken by name so same-second captures stay ordered
        entries.sort_by(|(a_path, a_time), (b_path, b_time)| {
            b_time.cmp(a_time).then_with(|| b_path.cmp(a_path))
        });

        debug!(dir = %self.dir.display(), count = entries.len(), "Gallery scanned");

        Ok(entries
            .into_iter()
            .map(|(path, _)| PhotoReference::from_path(&path))
            .collect())
    }
}

/// Newest photo, used to seed the gallery thumbnail
pub async fn latest_photo(gallery: &dyn GalleryIndex) -> Option<PhotoReference> {
    match gallery.list_photos_newest_first().await {
        Ok(photos) => photos.into_iter().next(),
        Err(e) => {
            debug!(error = %e, "Could not read gallery");
            None
        }
    }
}
