// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Exposure index change per pixel of vertical drag
///
/// Dragging up (negative delta) brightens the image.
pub const EXPOSURE_DRAG_SENSITIVITY: f32 = 0.05;

/// How long the focus ring and exposure slider stay visible after the last
/// tap or drag
pub const FOCUS_INDICATOR_TIMEOUT: Duration = Duration::from_millis(2500);

/// Zoom ratio applied after binding a new lens
pub const DEFAULT_ZOOM_RATIO: f32 = 1.0;

/// JPEG quality for the high quality tier
pub const JPEG_QUALITY_HIGH: u8 = 92;

/// JPEG quality for the balanced quality tier
pub const JPEG_QUALITY_BALANCED: u8 = 80;

/// Prefix of generated photo file names
pub const PHOTO_NAME_PREFIX: &str = "Viewfinder";

/// Timestamp layout of generated photo file names (chrono format)
pub const PHOTO_NAME_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Default folder (under the user's Pictures directory) for captures
pub const DEFAULT_SAVE_FOLDER: &str = "Viewfinder";

/// Zoom switcher presets
pub mod zoom {
    /// Ultra-wide preset, offered when the lens goes below 1x
    pub const ULTRA_WIDE: f32 = 0.5;

    /// Ratios below this light up the ultra-wide preset
    pub const ULTRA_WIDE_SELECTED_BELOW: f32 = 0.8;

    /// Main lens
    pub const WIDE: f32 = 1.0;

    /// Tele preset
    pub const TELE: f32 = 2.0;

    /// Super tele preset
    pub const SUPER_TELE: f32 = 5.0;
}

/// Build a suggested file stem for a capture taken at `time`
pub fn photo_name(time: &chrono::DateTime<chrono::Local>) -> String {
    format!("{}_{}", PHOTO_NAME_PREFIX, time.format(PHOTO_NAME_TIMESTAMP))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_photo_name_layout() {
        let time = chrono::Local
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .single()
            .unwrap();
        assert_eq!(photo_name(&time), "Viewfinder_20240309_070501");
    }

    #[test]
    fn test_zoom_presets_ordered() {
        assert!(zoom::ULTRA_WIDE < zoom::ULTRA_WIDE_SELECTED_BELOW);
        assert!(zoom::ULTRA_WIDE_SELECTED_BELOW < zoom::WIDE);
        assert!(zoom::WIDE < zoom::TELE && zoom::TELE < zoom::SUPER_TELE);
    }
}
