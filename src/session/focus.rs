// SPDX-License-Identifier: GPL-3.0-only

//! Tap-to-focus and drag-to-expose indicator state

use crate::backends::camera::MeteringPoint;
use crate::constants::FOCUS_INDICATOR_TIMEOUT;
use tokio::time::Instant;

/// Focus ring / exposure slider state shown over the preview
///
/// Created by a tap, adjusted by drags, hidden when `expires_at` passes.
/// Hiding keeps `exposure_index`: the hardware keeps the last applied offset
/// until the next tap resets it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FocusExposureState {
    /// Last tapped point, `None` when the indicator is hidden
    pub focus_point: Option<MeteringPoint>,
    /// Exposure compensation currently requested (EV index, fractional)
    pub exposure_index: f32,
    /// Whether drags currently adjust exposure
    pub slider_visible: bool,
    /// When the indicator auto-hides
    pub expires_at: Option<Instant>,
}

impl FocusExposureState {
    /// Fresh state for a tap at `point`
    pub fn tapped(point: MeteringPoint, now: Instant) -> Self {
        Self {
            focus_point: Some(point),
            exposure_index: 0.0,
            slider_visible: true,
            expires_at: Some(now + FOCUS_INDICATOR_TIMEOUT),
        }
    }

    /// Push the auto-hide deadline out from `now`
    pub fn extend(&mut self, now: Instant) {
        if self.slider_visible {
            self.expires_at = Some(now + FOCUS_INDICATOR_TIMEOUT);
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    /// Hide the indicator, keeping the exposure index
    pub fn hide(&mut self) {
        self.focus_point = None;
        self.slider_visible = false;
        self.expires_at = None;
    }

    /// The state as it should be displayed at `now`
    pub fn at(&self, now: Instant) -> Self {
        let mut state = *self;
        if state.is_expired(now) {
            state.hide();
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tap_resets_exposure() {
        let now = Instant::now();
        let state = FocusExposureState::tapped(MeteringPoint::center(), now);
        assert_eq!(state.exposure_index, 0.0);
        assert!(state.slider_visible);
        assert_eq!(state.expires_at, Some(now + FOCUS_INDICATOR_TIMEOUT));
    }

    #[test]
    fn test_expiry_hides_but_keeps_exposure() {
        let now = Instant::now();
        let mut state = FocusExposureState::tapped(MeteringPoint::center(), now);
        state.exposure_index = 2.0;

        let later = now + FOCUS_INDICATOR_TIMEOUT + Duration::from_millis(1);
        let shown = state.at(later);
        assert!(shown.focus_point.is_none());
        assert!(!shown.slider_visible);
        assert_eq!(shown.exposure_index, 2.0);

        assert_eq!(state.at(now), state);
    }

    #[test]
    fn test_extend_only_while_visible() {
        let now = Instant::now();
        let mut hidden = FocusExposureState::default();
        hidden.extend(now);
        assert!(hidden.expires_at.is_none());
    }
}
