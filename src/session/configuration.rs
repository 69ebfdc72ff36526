// SPDX-License-Identifier: GPL-3.0-only

//! User intent for the camera session

use crate::backends::camera::{BindRequest, FlashMode, LensFacing, QualityTier};
use crate::constants::DEFAULT_ZOOM_RATIO;

/// What the user currently asks the camera to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesiredConfiguration {
    pub lens_facing: LensFacing,
    pub flash_mode: FlashMode,
    pub zoom_ratio: f32,
    pub quality_tier: QualityTier,
}

impl Default for DesiredConfiguration {
    fn default() -> Self {
        Self {
            lens_facing: LensFacing::default(),
            flash_mode: FlashMode::default(),
            zoom_ratio: DEFAULT_ZOOM_RATIO,
            quality_tier: QualityTier::default(),
        }
    }
}

impl DesiredConfiguration {
    /// The fields that require a rebind when they change
    pub fn bind_request(&self) -> BindRequest {
        BindRequest {
            lens_facing: self.lens_facing,
            flash_mode: self.flash_mode,
            quality_tier: self.quality_tier,
        }
    }

    /// Merge a partial update; returns true if any field changed
    pub fn merge(&mut self, update: &ConfigurationUpdate) -> bool {
        let before = *self;
        if let Some(lens) = update.lens_facing {
            self.lens_facing = lens;
        }
        if let Some(flash) = update.flash_mode {
            self.flash_mode = flash;
        }
        if let Some(zoom) = update.zoom_ratio {
            self.zoom_ratio = zoom;
        }
        if let Some(quality) = update.quality_tier {
            self.quality_tier = quality;
        }
        before != *self
    }
}

/// Partial update to [`DesiredConfiguration`]; `None` leaves a field alone
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigurationUpdate {
    pub lens_facing: Option<LensFacing>,
    pub flash_mode: Option<FlashMode>,
    pub zoom_ratio: Option<f32>,
    pub quality_tier: Option<QualityTier>,
}

impl ConfigurationUpdate {
    pub fn lens(lens: LensFacing) -> Self {
        Self {
            lens_facing: Some(lens),
            ..Self::default()
        }
    }

    pub fn flash(flash: FlashMode) -> Self {
        Self {
            flash_mode: Some(flash),
            ..Self::default()
        }
    }

    pub fn zoom(ratio: f32) -> Self {
        Self {
            zoom_ratio: Some(ratio),
            ..Self::default()
        }
    }

    pub fn quality(quality: QualityTier) -> Self {
        Self {
            quality_tier: Some(quality),
            ..Self::default()
        }
    }

    /// Builder-style zoom override
    pub fn with_zoom(mut self, ratio: f32) -> Self {
        self.zoom_ratio = Some(ratio);
        self
    }
}
