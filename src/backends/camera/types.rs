// SPDX-License-Identifier: GPL-3.0-only
// Shared types for the camera hardware abstraction

//! Shared types for camera backends

use crate::session::clamp;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Which physical lens the session is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LensFacing {
    /// Rear-facing (world) camera
    #[default]
    Back,
    /// Front-facing (selfie) camera
    Front,
}

impl LensFacing {
    /// The opposite lens, used by the flip button
    pub fn flipped(self) -> Self {
        match self {
            LensFacing::Back => LensFacing::Front,
            LensFacing::Front => LensFacing::Back,
        }
    }

    /// Get display name for UI
    pub fn display_name(self) -> &'static str {
        match self {
            LensFacing::Back => "Back",
            LensFacing::Front => "Front",
        }
    }
}

impl std::fmt::Display for LensFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Flash operating mode for still capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlashMode {
    /// Flash never fires
    #[default]
    Off,
    /// Flash fires for every capture
    On,
    /// Hardware decides based on scene brightness
    Auto,
}

impl FlashMode {
    /// Cycle to the next mode: Off -> On -> Auto -> Off
    pub fn next(self) -> Self {
        match self {
            FlashMode::Off => FlashMode::On,
            FlashMode::On => FlashMode::Auto,
            FlashMode::Auto => FlashMode::Off,
        }
    }

    /// Get display name for UI
    pub fn display_name(self) -> &'static str {
        match self {
            FlashMode::Off => "Off",
            FlashMode::On => "On",
            FlashMode::Auto => "Auto",
        }
    }
}

impl std::fmt::Display for FlashMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Capture quality preference, persisted in the user config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QualityTier {
    /// Highest available resolution
    #[default]
    High,
    /// Reduced resolution, smaller files
    Balanced,
}

impl QualityTier {
    /// Get all tiers for UI iteration
    pub const ALL: [QualityTier; 2] = [QualityTier::High, QualityTier::Balanced];

    /// Get display name for UI
    pub fn display_name(self) -> &'static str {
        match self {
            QualityTier::High => "High Res",
            QualityTier::Balanced => "Balanced",
        }
    }

    /// JPEG quality (0-100) used when persisting captures of this tier
    pub fn jpeg_quality(self) -> u8 {
        match self {
            QualityTier::High => crate::constants::JPEG_QUALITY_HIGH,
            QualityTier::Balanced => crate::constants::JPEG_QUALITY_BALANCED,
        }
    }

    /// Parse a tier name as typed on the command line
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "high" => Some(QualityTier::High),
            "balanced" => Some(QualityTier::Balanced),
            _ => None,
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The lens/flash/quality triple a session is bound with
///
/// Changing any of these requires tearing the pipeline down and binding again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BindRequest {
    pub lens_facing: LensFacing,
    pub flash_mode: FlashMode,
    pub quality_tier: QualityTier,
}

impl std::fmt::Display for BindRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lens={} flash={} quality={}",
            self.lens_facing, self.flash_mode, self.quality_tier
        )
    }
}

/// Hardware-reported zoom ratio range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f32,
    pub max: f32,
}

impl ZoomRange {
    /// Range of an unbound session: only 1.0x is valid
    pub const UNBOUND: ZoomRange = ZoomRange { min: 1.0, max: 1.0 };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp a requested ratio into this range
    pub fn clamp(&self, ratio: f32) -> f32 {
        clamp::clamp(ratio, self.min, self.max)
    }

    pub fn contains(&self, ratio: f32) -> bool {
        self.min <= ratio && ratio <= self.max
    }
}

/// Hardware-reported exposure compensation range in EV index steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposureRange {
    pub min: i32,
    pub max: i32,
}

impl ExposureRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Clamp a fractional exposure index into this range
    pub fn clamp(&self, index: f32) -> f32 {
        clamp::clamp(index, self.min as f32, self.max as f32)
    }
}

/// Normalized focus/metering coordinate in [0,1] x [0,1]
///
/// Surface oriented: (0,0) is the top-left corner of the preview surface as
/// laid out on screen, (1,1) the bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeteringPoint {
    pub x: f32,
    pub y: f32,
}

impl MeteringPoint {
    /// Create a point, clamping both axes into [0,1]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: clamp::clamp_unit(x),
            y: clamp::clamp_unit(y),
        }
    }

    /// Center of the frame
    pub fn center() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

/// Preview surface the session renders into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTarget {
    /// Surface identifier (window, texture or view name)
    pub name: String,
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
}

impl PreviewTarget {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }
}

/// Still image as delivered by the hardware, RGBA8
#[derive(Clone)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    /// Timestamp when the frame was captured
    pub captured_at: Instant,
}

impl RawImage {
    /// Bytes per pixel of the RGBA8 layout
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Check that the buffer covers `width * height` RGBA pixels
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize * Self::BYTES_PER_PIXEL
    }
}

impl std::fmt::Debug for RawImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// URI-like identifier of a persisted photo
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoReference(String);

impl PhotoReference {
    const FILE_SCHEME: &'static str = "file://";

    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Reference to a file on the local filesystem
    pub fn from_path(path: &Path) -> Self {
        Self(format!("{}{}", Self::FILE_SCHEME, path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local path for `file://` references
    pub fn to_path(&self) -> Option<PathBuf> {
        self.0.strip_prefix(Self::FILE_SCHEME).map(PathBuf::from)
    }
}

impl std::fmt::Display for PhotoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_mode_cycle() {
        assert_eq!(FlashMode::Off.next(), FlashMode::On);
        assert_eq!(FlashMode::On.next(), FlashMode::Auto);
        assert_eq!(FlashMode::Auto.next(), FlashMode::Off);
    }

    #[test]
    fn test_lens_flip() {
        assert_eq!(LensFacing::Back.flipped(), LensFacing::Front);
        assert_eq!(LensFacing::Front.flipped().flipped(), LensFacing::Front);
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!(QualityTier::parse("HIGH"), Some(QualityTier::High));
        assert_eq!(QualityTier::parse(" balanced "), Some(QualityTier::Balanced));
        assert_eq!(QualityTier::parse("ultra"), None);
    }

    #[test]
    fn test_zoom_range_clamp() {
        let range = ZoomRange::new(0.5, 10.0);
        assert_eq!(range.clamp(15.0), 10.0);
        assert_eq!(range.clamp(0.2), 0.5);
        assert_eq!(range.clamp(3.0), 3.0);
        assert_eq!(ZoomRange::UNBOUND.clamp(4.0), 1.0);
    }

    #[test]
    fn test_photo_reference_path() {
        let reference = PhotoReference::from_path(Path::new("/tmp/a.jpg"));
        assert_eq!(reference.as_str(), "file:///tmp/a.jpg");
        assert_eq!(reference.to_path(), Some(PathBuf::from("/tmp/a.jpg")));
        assert_eq!(PhotoReference::new("content://media/1").to_path(), None);
    }
}
