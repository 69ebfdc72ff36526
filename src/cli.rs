// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Taking photos through the session coordinator
//! - Listing the gallery
//! - Showing or changing the saved quality preference

use std::path::PathBuf;
use std::sync::Arc;
use viewfinder::backends::camera::{FlashMode, LensFacing, PreviewTarget, QualityTier};
use viewfinder::backends::virtual_camera::VirtualCameraProvider;
use viewfinder::pipelines::photo::PhotoPipeline;
use viewfinder::session::{DesiredConfiguration, zoom};
use viewfinder::storage::{DirectoryGallery, GalleryIndex};
use viewfinder::{CameraScreen, Config, SessionCoordinator};

/// Preview surface size used for gesture translation on the command line
const PREVIEW_WIDTH: u32 = 640;
const PREVIEW_HEIGHT: u32 = 480;

/// Options for `viewfinder photo`
pub struct PhotoOptions {
    pub lens: LensFacing,
    pub flash: FlashMode,
    pub zoom: f32,
    pub quality: Option<QualityTier>,
    pub tap: Option<(f32, f32)>,
    pub drag: Option<f32>,
    pub output: Option<PathBuf>,
}

/// Parse an `X,Y` preview coordinate
pub fn parse_point(value: &str) -> Result<(f32, f32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", value))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

/// Parse a quality tier name
pub fn parse_quality(value: &str) -> Result<QualityTier, String> {
    QualityTier::parse(value).ok_or_else(|| format!("unknown quality '{}'", value))
}

/// Take a photo with the virtual camera
pub fn take_photo(options: PhotoOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let quality = options.quality.unwrap_or(config.quality_tier);
    let output_dir = options.output.unwrap_or_else(|| config.photo_dir());

    println!("Lens: {}", options.lens);
    println!("Flash: {}", options.flash);
    println!("Quality: {}", quality.display_name());

    let rt = tokio::runtime::Runtime::new()?;
    let (output_path, applied_zoom) = rt.block_on(async {
        let provider = Arc::new(VirtualCameraProvider::new());
        let sink = Arc::new(PhotoPipeline::new(output_dir.clone()));
        let gallery = Arc::new(DirectoryGallery::new(output_dir.clone()));

        let coordinator = SessionCoordinator::new(
            provider,
            sink,
            PreviewTarget::new("cli", PREVIEW_WIDTH, PREVIEW_HEIGHT),
            DesiredConfiguration {
                lens_facing: options.lens,
                flash_mode: options.flash,
                quality_tier: quality,
                ..Default::default()
            },
        );
        let mut screen = CameraScreen::new(
            coordinator,
            gallery,
            PREVIEW_WIDTH as f32,
            PREVIEW_HEIGHT as f32,
        );

        let info = screen.enter().await?;
        println!(
            "Zoom range: {:.1}x - {:.1}x",
            info.zoom_range.min, info.zoom_range.max
        );

        let applied_zoom = screen.coordinator().set_zoom(options.zoom);
        let presets: Vec<String> = screen
            .coordinator()
            .zoom_levels()
            .into_iter()
            .map(|level| {
                let label = zoom::level_label(level);
                if zoom::is_level_selected(level, applied_zoom) {
                    format!("[{}]", label)
                } else {
                    label
                }
            })
            .collect();
        println!("Zoom presets: {}", presets.join(" "));

        if let Some((x, y)) = options.tap {
            screen.tap(x, y);
            if let Some(delta) = options.drag {
                screen.drag(delta);
            }
            let focus = screen.coordinator().focus_state();
            println!("Exposure index: {:.0}", focus.exposure_index);
        }

        let result = screen.shutter().await;
        screen.leave().await;
        Ok::<_, Box<dyn std::error::Error>>((result?, applied_zoom))
    })?;

    println!("Zoom: {:.1}x", applied_zoom);
    match output_path.to_path() {
        Some(path) => println!("Photo saved to: {}", path.display()),
        None => println!("Photo saved to: {}", output_path),
    }
    Ok(())
}

/// List photos newest first
pub fn list_gallery(dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = dir.unwrap_or_else(|| Config::load().photo_dir());
    let gallery = DirectoryGallery::new(dir);

    let rt = tokio::runtime::Runtime::new()?;
    let photos = rt.block_on(gallery.list_photos_newest_first())?;

    if photos.is_empty() {
        println!("No photos in {}", gallery.dir().display());
        return Ok(());
    }

    println!("Photos in {}:", gallery.dir().display());
    for photo in photos {
        match photo.to_path() {
            Some(path) => println!("  {}", path.display()),
            None => println!("  {}", photo),
        }
    }
    Ok(())
}

/// Show or change the saved quality tier
pub fn quality(tier: Option<QualityTier>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();

    let Some(tier) = tier else {
        println!("Quality: {}", config.quality_tier.display_name());
        return Ok(());
    };

    config.quality_tier = tier;
    config.save()?;
    println!("Quality set to: {}", tier.display_name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("320,240"), Ok((320.0, 240.0)));
        assert_eq!(parse_point(" 1.5 , 2 "), Ok((1.5, 2.0)));
        assert!(parse_point("320").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_parse_quality() {
        assert_eq!(parse_quality("Balanced"), Ok(QualityTier::Balanced));
        assert!(parse_quality("ultra").is_err());
    }
}
