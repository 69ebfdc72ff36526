// SPDX-License-Identifier: GPL-3.0-only

//! Pointer gestures to coordinator inputs
//!
//! Metering points use the surface-oriented convention: coordinates are
//! relative to the preview surface as it is laid out on screen, origin at the
//! top-left, independent of sensor rotation. Mapping into sensor space is the
//! hardware layer's job.

use crate::backends::camera::MeteringPoint;

/// Stateless translator bound to the current preview surface size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTranslator {
    width: f32,
    height: f32,
}

impl GestureTranslator {
    /// Create a translator for a surface of `width` x `height` pixels
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Map a tap at surface pixel `(x, y)` to a normalized metering point
    ///
    /// Taps outside the surface are clamped to its edge. Returns `None` while
    /// the surface has no area (not laid out yet).
    pub fn tap(&self, x: f32, y: f32) -> Option<MeteringPoint> {
        if !self.has_area() {
            return None;
        }
        Some(MeteringPoint::new(x / self.width, y / self.height))
    }

    /// Vertical drag delta in pixels, passed through unchanged
    ///
    /// Positive values move down the screen. Sensitivity is applied by the
    /// coordinator.
    pub fn vertical_drag(&self, delta_pixels: f32) -> f32 {
        delta_pixels
    }
}
