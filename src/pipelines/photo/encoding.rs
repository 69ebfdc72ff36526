// SPDX-License-Identifier: GPL-3.0-only

//! Async photo encoding
//!
//! Converts the hardware's RGBA frame to JPEG and writes it to disk. Both
//! steps run on the blocking pool so the caller's executor never stalls.

use crate::backends::camera::{QualityTier, RawImage};
use crate::errors::StorageError;
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension of files written by the encoder
pub const JPEG_EXTENSION: &str = "jpg";

/// Encoded image data ready for saving
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// JPEG encoder
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    quality: u8,
}

impl PhotoEncoder {
    /// Create an encoder for a quality tier
    pub fn new(tier: QualityTier) -> Self {
        Self {
            quality: tier.jpeg_quality(),
        }
    }

    /// JPEG quality (0-100)
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a raw frame asynchronously
    pub async fn encode(&self, image: RawImage) -> Result<EncodedImage, StorageError> {
        info!(
            width = image.width,
            height = image.height,
            quality = self.quality,
            "Starting encoding"
        );

        let quality = self.quality;
        tokio::task::spawn_blocking(move || {
            let rgb = rgba_to_rgb(&image)?;
            let data = encode_jpeg(&rgb, quality)?;
            debug!(size = data.len(), "Encoding complete");
            Ok::<_, StorageError>(EncodedImage {
                data,
                width: image.width,
                height: image.height,
            })
        })
        .await
        .map_err(|e| StorageError::Encoding(format!("encoding task error: {}", e)))?
    }

    /// Write encoded data as `<stem>.jpg` in `output_dir`
    ///
    /// The directory is created if needed. An existing file is never
    /// overwritten; a numeric suffix is added instead.
    pub async fn save(
        &self,
        encoded: EncodedImage,
        output_dir: PathBuf,
        stem: &str,
    ) -> Result<PathBuf, StorageError> {
        let stem = stem.to_string();

        let filepath = tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&output_dir)?;
            let filepath = unique_path(&output_dir, &stem);
            std::fs::write(&filepath, &encoded.data)?;
            Ok::<_, StorageError>(filepath)
        })
        .await
        .map_err(|e| StorageError::Io(format!("save task error: {}", e)))??;

        info!(path = %filepath.display(), "Photo saved successfully");
        Ok(filepath)
    }
}

/// Drop the alpha channel of an RGBA frame
fn rgba_to_rgb(image: &RawImage) -> Result<RgbImage, StorageError> {
    if !image.is_complete() {
        return Err(StorageError::Encoding(format!(
            "frame buffer holds {} bytes, expected {}x{} RGBA",
            image.data.len(),
            image.width,
            image.height
        )));
    }

    let rgb: Vec<u8> = image
        .data
        .chunks_exact(RawImage::BYTES_PER_PIXEL)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    RgbImage::from_raw(image.width, image.height, rgb)
        .ok_or_else(|| StorageError::Encoding("invalid RGB buffer".to_string()))
}

/// Encode image as JPEG
fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, StorageError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| StorageError::Encoding(format!("JPEG encoding failed: {}", e)))?;

    Ok(buffer)
}

/// First free `<stem>[_N].jpg` in `dir`
fn unique_path(dir: &Path, stem: &str) -> PathBuf {
    let candidate = dir.join(format!("{}.{}", stem, JPEG_EXTENSION));
    if !candidate.exists() {
        return candidate;
    }
    (1..)
        .map(|n| dir.join(format!("{}_{}.{}", stem, n, JPEG_EXTENSION)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn frame(width: u32, height: u32) -> RawImage {
        RawImage {
            width,
            height,
            data: Arc::from(vec![128u8; (width * height * 4) as usize]),
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_jpeg_quality_values() {
        assert_eq!(PhotoEncoder::new(QualityTier::High).quality(), 92);
        assert_eq!(PhotoEncoder::new(QualityTier::Balanced).quality(), 80);
    }

    #[test]
    fn test_rgba_to_rgb_drops_alpha() {
        let rgb = rgba_to_rgb(&frame(4, 2)).unwrap();
        assert_eq!(rgb.as_raw().len(), 4 * 2 * 3);
    }

    #[test]
    fn test_incomplete_frame_rejected() {
        let mut bad = frame(4, 2);
        bad.data = Arc::from(vec![0u8; 5]);
        assert!(matches!(rgba_to_rgb(&bad), Err(StorageError::Encoding(_))));
    }

    #[tokio::test]
    async fn test_encode_produces_jpeg() {
        let encoded = PhotoEncoder::new(QualityTier::Balanced)
            .encode(frame(16, 16))
            .await
            .unwrap();
        // JPEG SOI marker
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_save_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = PhotoEncoder::new(QualityTier::High);

        let first = encoder
            .save(encoder.encode(frame(8, 8)).await.unwrap(), dir.path().to_path_buf(), "shot")
            .await
            .unwrap();
        let second = encoder
            .save(encoder.encode(frame(8, 8)).await.unwrap(), dir.path().to_path_buf(), "shot")
            .await
            .unwrap();

        assert_eq!(first.file_name().unwrap(), "shot.jpg");
        assert_eq!(second.file_name().unwrap(), "shot_1.jpg");
    }
}
