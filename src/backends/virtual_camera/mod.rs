// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera backend
//!
//! An in-process camera stack that implements the hardware traits without
//! touching a device. It exposes a back lens (ultra-wide to tele, with flash)
//! and a front lens (no ultra-wide, no flash) and renders a synthetic RGBA
//! test pattern on capture.
//!
//! The stack enforces device exclusivity the same way real hardware does:
//! binding while another session is still alive fails.

use crate::backends::camera::{
    BindRequest, BoundSession, ExposureRange, FlashMode, HardwareSessionProvider, LensFacing,
    MeteringPoint, PreviewTarget, ProviderHandle, QualityTier, RawImage, ZoomRange,
};
use crate::errors::{HardwareError, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Simulated shutter latency
const CAPTURE_LATENCY: Duration = Duration::from_millis(30);

/// Static description of one simulated lens
#[derive(Debug, Clone, Copy)]
pub struct VirtualLens {
    pub facing: LensFacing,
    pub zoom_range: ZoomRange,
    pub exposure_range: ExposureRange,
    pub has_flash: bool,
}

impl VirtualLens {
    /// Typical phone main camera
    pub fn back() -> Self {
        Self {
            facing: LensFacing::Back,
            zoom_range: ZoomRange::new(0.5, 10.0),
            exposure_range: ExposureRange::new(-4, 4),
            has_flash: true,
        }
    }

    /// Typical phone selfie camera
    pub fn front() -> Self {
        Self {
            facing: LensFacing::Front,
            zoom_range: ZoomRange::new(1.0, 4.0),
            exposure_range: ExposureRange::new(-2, 2),
            has_flash: false,
        }
    }

    /// Output resolution for a quality tier (4:3)
    pub fn capture_size(&self, quality: QualityTier) -> (u32, u32) {
        match quality {
            QualityTier::High => (1600, 1200),
            QualityTier::Balanced => (1024, 768),
        }
    }
}

/// Shared device state: lens table and the exclusivity flag
struct VirtualStack {
    lenses: Vec<VirtualLens>,
    in_use: AtomicBool,
}

/// Provider for the virtual camera stack
#[derive(Clone)]
pub struct VirtualCameraProvider {
    stack: Arc<VirtualStack>,
    available: Arc<AtomicBool>,
}

impl VirtualCameraProvider {
    /// Create a provider with the default back and front lenses
    pub fn new() -> Self {
        Self::with_lenses(vec![VirtualLens::back(), VirtualLens::front()])
    }

    /// Create a provider with a custom lens table
    pub fn with_lenses(lenses: Vec<VirtualLens>) -> Self {
        info!(lenses = lenses.len(), "Creating virtual camera provider");
        Self {
            stack: Arc::new(VirtualStack {
                lenses,
                in_use: AtomicBool::new(false),
            }),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate the camera stack going away (permission revoked, service died)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Whether a session currently holds the device
    pub fn is_in_use(&self) -> bool {
        self.stack.in_use.load(Ordering::SeqCst)
    }
}

impl Default for VirtualCameraProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HardwareSessionProvider for VirtualCameraProvider {
    async fn acquire_provider(&self) -> Result<Arc<dyn ProviderHandle>, ProviderError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable(
                "virtual camera stack disabled".to_string(),
            ));
        }
        // Yield once so acquisition behaves like a real asynchronous handshake
        tokio::task::yield_now().await;
        Ok(Arc::new(VirtualHandle {
            stack: Arc::clone(&self.stack),
        }))
    }
}

struct VirtualHandle {
    stack: Arc<VirtualStack>,
}

impl ProviderHandle for VirtualHandle {
    fn bind(
        &self,
        request: &BindRequest,
        preview: &PreviewTarget,
    ) -> Result<Arc<dyn BoundSession>, HardwareError> {
        let lens = self
            .stack
            .lenses
            .iter()
            .find(|l| l.facing == request.lens_facing)
            .copied()
            .ok_or_else(|| {
                HardwareError::Unsupported(format!("no {} lens", request.lens_facing))
            })?;

        if request.flash_mode == FlashMode::On && !lens.has_flash {
            return Err(HardwareError::Unsupported(format!(
                "{} lens has no flash unit",
                lens.facing
            )));
        }

        if self.stack.in_use.swap(true, Ordering::SeqCst) {
            warn!("Bind attempted while another session holds the device");
            return Err(HardwareError::Failed("device busy".to_string()));
        }

        info!(%request, preview = %preview.name, "Virtual camera session bound");

        Ok(Arc::new(VirtualSession {
            lens,
            quality: request.quality_tier,
            zoom: Mutex::new(1.0),
            exposure_index: AtomicI32::new(0),
            focus: Mutex::new(None),
            released: AtomicBool::new(false),
            stack: Arc::clone(&self.stack),
        }))
    }
}

/// A bound virtual session
struct VirtualSession {
    lens: VirtualLens,
    quality: QualityTier,
    zoom: Mutex<f32>,
    exposure_index: AtomicI32,
    focus: Mutex<Option<MeteringPoint>>,
    released: AtomicBool,
    stack: Arc<VirtualStack>,
}

impl VirtualSession {
    fn ensure_live(&self) -> Result<(), HardwareError> {
        if self.released.load(Ordering::SeqCst) {
            Err(HardwareError::Released)
        } else {
            Ok(())
        }
    }

    /// Render the test pattern: a diagonal gradient brightened or darkened by
    /// the exposure index, with a marker square at the metering point.
    fn render(&self) -> RawImage {
        let (width, height) = self.lens.capture_size(self.quality);
        let ev = self.exposure_index.load(Ordering::SeqCst);
        let focus = self
            .focus
            .lock()
            .ok()
            .and_then(|f| *f)
            .unwrap_or_else(MeteringPoint::center);
        let marker_x = (focus.x * width as f32) as i64;
        let marker_y = (focus.y * height as f32) as i64;

        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let base = ((x + y) * 255 / (width + height)) as i32;
                let level = (base + ev * 24).clamp(0, 255) as u8;
                let on_marker =
                    (x as i64 - marker_x).abs() < 12 && (y as i64 - marker_y).abs() < 12;
                if on_marker {
                    data.extend_from_slice(&[255, 220, 0, 255]);
                } else {
                    data.extend_from_slice(&[level, level, level.saturating_add(16), 255]);
                }
            }
        }

        RawImage {
            width,
            height,
            data: Arc::from(data),
            captured_at: Instant::now(),
        }
    }
}

#[async_trait]
impl BoundSession for VirtualSession {
    fn zoom_range(&self) -> ZoomRange {
        self.lens.zoom_range
    }

    fn exposure_range(&self) -> Option<ExposureRange> {
        Some(self.lens.exposure_range)
    }

    fn set_zoom(&self, ratio: f32) -> Result<(), HardwareError> {
        self.ensure_live()?;
        if !self.lens.zoom_range.contains(ratio) {
            return Err(HardwareError::Failed(format!("zoom {ratio} out of range")));
        }
        if let Ok(mut zoom) = self.zoom.lock() {
            *zoom = ratio;
        }
        debug!(ratio, "Virtual zoom applied");
        Ok(())
    }

    fn set_exposure_index(&self, index: i32) -> Result<(), HardwareError> {
        self.ensure_live()?;
        let range = self.lens.exposure_range;
        if index < range.min || index > range.max {
            return Err(HardwareError::Failed(format!(
                "exposure index {index} out of range"
            )));
        }
        self.exposure_index.store(index, Ordering::SeqCst);
        debug!(index, "Virtual exposure applied");
        Ok(())
    }

    fn focus_and_meter_at(&self, point: MeteringPoint) -> Result<(), HardwareError> {
        self.ensure_live()?;
        if let Ok(mut focus) = self.focus.lock() {
            *focus = Some(point);
        }
        debug!(x = point.x, y = point.y, "Virtual focus and metering started");
        Ok(())
    }

    async fn capture(&self) -> Result<RawImage, HardwareError> {
        self.ensure_live()?;
        tokio::time::sleep(CAPTURE_LATENCY).await;
        // Released while the shutter was open
        self.ensure_live()?;
        let image = self.render();
        debug!(width = image.width, height = image.height, "Virtual frame captured");
        Ok(image)
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.stack.in_use.store(false, Ordering::SeqCst);
            info!(lens = %self.lens.facing, "Virtual camera session released");
        }
    }
}

impl Drop for VirtualSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(lens: LensFacing, flash: FlashMode) -> BindRequest {
        BindRequest {
            lens_facing: lens,
            flash_mode: flash,
            quality_tier: QualityTier::Balanced,
        }
    }

    #[tokio::test]
    async fn test_bind_is_exclusive() {
        let provider = VirtualCameraProvider::new();
        let handle = provider.acquire_provider().await.unwrap();
        let preview = PreviewTarget::new("test", 640, 480);

        let first = handle
            .bind(&request(LensFacing::Back, FlashMode::Off), &preview)
            .unwrap();
        assert!(provider.is_in_use());
        assert!(
            handle
                .bind(&request(LensFacing::Front, FlashMode::Off), &preview)
                .is_err()
        );

        first.release();
        assert!(!provider.is_in_use());
        assert!(
            handle
                .bind(&request(LensFacing::Front, FlashMode::Off), &preview)
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_front_lens_rejects_forced_flash() {
        let provider = VirtualCameraProvider::new();
        let handle = provider.acquire_provider().await.unwrap();
        let preview = PreviewTarget::new("test", 640, 480);

        let result = handle.bind(&request(LensFacing::Front, FlashMode::On), &preview);
        assert!(matches!(result, Err(HardwareError::Unsupported(_))));
        assert!(!provider.is_in_use());
    }

    #[tokio::test]
    async fn test_unavailable_provider() {
        let provider = VirtualCameraProvider::new();
        provider.set_available(false);
        assert!(provider.acquire_provider().await.is_err());
    }

    #[tokio::test]
    async fn test_capture_produces_complete_frame() {
        let provider = VirtualCameraProvider::new();
        let handle = provider.acquire_provider().await.unwrap();
        let session = handle
            .bind(
                &request(LensFacing::Back, FlashMode::Auto),
                &PreviewTarget::new("test", 640, 480),
            )
            .unwrap();

        let image = session.capture().await.unwrap();
        assert_eq!((image.width, image.height), (1024, 768));
        assert!(image.is_complete());

        session.release();
        assert_eq!(session.capture().await.unwrap_err(), HardwareError::Released);
    }
}
