// SPDX-License-Identifier: GPL-3.0-only

//! Clamping of user-requested control values into hardware ranges

use std::cmp::Ordering;

/// Clamp `value` into `[min, max]`
///
/// A malformed range (`min > max`, or a NaN bound) returns `value` unchanged.
pub fn clamp<T: PartialOrd + Copy>(value: T, min: T, max: T) -> T {
    if !matches!(min.partial_cmp(&max), Some(Ordering::Less | Ordering::Equal)) {
        return value;
    }
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Clamp into the unit interval, mapping NaN to 0
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        clamp(value, 0.0, 1.0)
    }
}
