// SPDX-License-Identifier: GPL-3.0-only

//! Async photo persistence pipeline
//!
//! ```text
//! BoundSession::capture ─► RawImage ─► Encoding (JPEG) ─► Disk I/O ─► PhotoReference
//! ```
//!
//! [`PhotoPipeline`] is the filesystem [`CaptureSink`]: each stage runs off
//! the async executor so the preview keeps going while a photo is written.

pub mod encoding;

pub use encoding::{EncodedImage, PhotoEncoder};

use crate::backends::camera::{PhotoReference, QualityTier, RawImage};
use crate::errors::StorageError;
use crate::storage::CaptureSink;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Encode-and-save pipeline writing into one photos directory
pub struct PhotoPipeline {
    output_dir: PathBuf,
}

impl PhotoPipeline {
    /// Create a pipeline saving into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Encode at the tier's JPEG quality and save, returning the written path
    pub async fn capture_and_save(
        &self,
        image: RawImage,
        stem: &str,
        quality: QualityTier,
    ) -> Result<PathBuf, StorageError> {
        let encoder = PhotoEncoder::new(quality);
        let encoded = encoder.encode(image).await?;
        encoder.save(encoded, self.output_dir.clone(), stem).await
    }
}

#[async_trait]
impl CaptureSink for PhotoPipeline {
    async fn persist(
        &self,
        image: RawImage,
        suggested_name: &str,
        quality: QualityTier,
    ) -> Result<PhotoReference, StorageError> {
        let path = self.capture_and_save(image, suggested_name, quality).await?;
        Ok(PhotoReference::from_path(&path))
    }
}
