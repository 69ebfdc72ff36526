// SPDX-License-Identifier: GPL-3.0-only

//! Discrete zoom presets offered by the zoom switcher

use crate::backends::camera::ZoomRange;
use crate::constants::zoom;

/// Presets available for a bound zoom range
///
/// 1x is always offered. Ultra-wide appears when the range reaches below 1.0,
/// tele presets when the range reaches them.
pub fn zoom_levels(range: ZoomRange) -> Vec<f32> {
    let mut levels = Vec::with_capacity(4);
    if range.min < zoom::WIDE {
        levels.push(zoom::ULTRA_WIDE);
    }
    levels.push(zoom::WIDE);
    if range.max >= zoom::TELE {
        levels.push(zoom::TELE);
    }
    if range.max >= zoom::SUPER_TELE {
        levels.push(zoom::SUPER_TELE);
    }
    levels
}

/// Whether `level` should render as selected for the current ratio
///
/// Any ratio below the ultra-wide threshold lights the ultra-wide preset, so a
/// lens whose minimum is e.g. 0.6x still shows it selected.
pub fn is_level_selected(level: f32, current_ratio: f32) -> bool {
    if level < zoom::WIDE {
        current_ratio < zoom::ULTRA_WIDE_SELECTED_BELOW
    } else {
        (current_ratio - level).abs() < f32::EPSILON
    }
}

/// Switcher label for a preset (".5" for ultra-wide, integer otherwise)
pub fn level_label(level: f32) -> String {
    if level < zoom::WIDE {
        ".5".to_string()
    } else {
        format!("{}", level as u32)
    }
}
