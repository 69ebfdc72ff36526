// SPDX-License-Identifier: GPL-3.0-only

//! Viewfinder screen
//!
//! Glue between the UI's events and the session coordinator for one visit to
//! the camera screen:
//!
//! - entering seeds the gallery thumbnail and binds the camera
//! - taps and drags go through the [`GestureTranslator`]
//! - the shutter captures and updates the thumbnail on success
//! - leaving tears the session down

use crate::backends::camera::PhotoReference;
use crate::errors::{BindError, CaptureError};
use crate::session::{BoundSessionInfo, GestureTranslator, SessionCoordinator};
use crate::storage::{self, GalleryIndex};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// State of the camera screen while it is shown
pub struct CameraScreen {
    coordinator: SessionCoordinator,
    gallery: Arc<dyn GalleryIndex>,
    gestures: GestureTranslator,
    latest_thumbnail: Option<PhotoReference>,
}

impl CameraScreen {
    /// Create the screen for a preview surface of `width` x `height` pixels
    pub fn new(
        coordinator: SessionCoordinator,
        gallery: Arc<dyn GalleryIndex>,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            coordinator,
            gallery,
            gestures: GestureTranslator::new(width, height),
            latest_thumbnail: None,
        }
    }

    /// Seed the thumbnail and bind the camera
    pub async fn enter(&mut self) -> Result<BoundSessionInfo, BindError> {
        self.latest_thumbnail = storage::latest_photo(self.gallery.as_ref()).await;
        debug!(thumbnail = ?self.latest_thumbnail, "Gallery thumbnail seeded");

        let result = self.coordinator.bind_if_needed().await;
        if let Err(e) = &result {
            warn!(error = %e, "Camera unavailable on screen entry");
        }
        result
    }

    /// Preview surface was laid out again
    pub fn resize(&mut self, width: f32, height: f32) {
        self.gestures = GestureTranslator::new(width, height);
    }

    /// Tap on the preview at surface pixel `(x, y)`
    pub fn tap(&self, x: f32, y: f32) {
        if let Some(point) = self.gestures.tap(x, y) {
            self.coordinator.on_tap(point);
        }
    }

    /// Vertical drag on the preview
    pub fn drag(&self, delta_y: f32) {
        self.coordinator
            .on_exposure_drag(self.gestures.vertical_drag(delta_y));
    }

    /// Shutter pressed
    ///
    /// The thumbnail only changes when the photo was actually saved.
    pub async fn shutter(&mut self) -> Result<PhotoReference, CaptureError> {
        let reference = self.coordinator.capture().await?;
        info!(photo = %reference, "Thumbnail updated");
        self.latest_thumbnail = Some(reference.clone());
        Ok(reference)
    }

    /// Navigate away: release the camera
    pub async fn leave(&self) {
        self.coordinator.teardown().await;
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }

    pub fn latest_thumbnail(&self) -> Option<&PhotoReference> {
        self.latest_thumbnail.as_ref()
    }
}
