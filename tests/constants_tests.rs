// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use viewfinder::backends::camera::QualityTier;
use viewfinder::constants::{self, zoom};

#[test]
fn test_quality_tier_values() {
    // Test that all tiers exist (High, Balanced)
    assert_eq!(QualityTier::ALL.len(), 2);
}

#[test]
fn test_quality_tier_ordering() {
    // Higher tiers encode with higher JPEG quality
    assert!(
        QualityTier::High.jpeg_quality() > QualityTier::Balanced.jpeg_quality(),
        "High should encode at a higher quality than Balanced"
    );
    for tier in QualityTier::ALL {
        assert!(tier.jpeg_quality() <= 100);
    }
}

#[test]
fn test_quality_tier_display_names() {
    // Test that all tiers have non-empty display names
    for tier in QualityTier::ALL {
        assert!(
            !tier.display_name().is_empty(),
            "Tier should have a display name"
        );
    }
}

#[test]
fn test_quality_tier_parse() {
    assert_eq!(QualityTier::parse("high"), Some(QualityTier::High));
    assert_eq!(QualityTier::parse("Balanced"), Some(QualityTier::Balanced));
    assert_eq!(QualityTier::parse("ultra"), None);
}

#[test]
fn test_zoom_presets_ordered() {
    assert!(zoom::ULTRA_WIDE < zoom::ULTRA_WIDE_SELECTED_BELOW);
    assert!(zoom::ULTRA_WIDE_SELECTED_BELOW < zoom::WIDE);
    assert!(zoom::WIDE < zoom::TELE);
    assert!(zoom::TELE < zoom::SUPER_TELE);
    assert_eq!(zoom::WIDE, constants::DEFAULT_ZOOM_RATIO);
}

#[test]
fn test_focus_timeout_in_expected_window() {
    let timeout = constants::FOCUS_INDICATOR_TIMEOUT.as_millis();
    assert!((2500..=3000).contains(&timeout));
}
