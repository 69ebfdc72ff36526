// SPDX-License-Identifier: MPL-2.0

//! Scripted camera stack and sink shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;
use viewfinder::SessionCoordinator;
use viewfinder::backends::camera::{
    BindRequest, BoundSession, ExposureRange, FlashMode, HardwareSessionProvider, LensFacing,
    MeteringPoint, PhotoReference, PreviewTarget, ProviderHandle, QualityTier, RawImage,
    ZoomRange,
};
use viewfinder::errors::{HardwareError, ProviderError, StorageError};
use viewfinder::session::DesiredConfiguration;
use viewfinder::storage::CaptureSink;

/// Everything the fake hardware was asked to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Acquire,
    Bind(BindRequest),
    BindRejected(BindRequest),
    Release(BindRequest),
    SetZoom(f32),
    SetExposure(i32),
    Focus(MeteringPoint),
    CaptureStarted,
    CaptureFinished,
}

struct Inner {
    events: Mutex<Vec<Event>>,
    available: AtomicBool,
    capture_fails: AtomicBool,
    rejected_lenses: Mutex<Vec<LensFacing>>,
    rejected_flash: Mutex<Vec<FlashMode>>,
    acquire_gate: Mutex<Option<Arc<Semaphore>>>,
    capture_gate: Mutex<Option<Arc<Semaphore>>>,
    back_zoom: ZoomRange,
    front_zoom: ZoomRange,
    exposure: Option<ExposureRange>,
}

/// Provider whose behaviour the test scripts
#[derive(Clone)]
pub struct FakeCamera {
    inner: Arc<Inner>,
}

impl FakeCamera {
    /// Back lens zoom [0.5, 10], front [1, 4], exposure [-4, 4]
    pub fn new() -> Self {
        Self::with_exposure(Some(ExposureRange::new(-4, 4)))
    }

    pub fn with_exposure(exposure: Option<ExposureRange>) -> Self {
        Self {
            inner: Arc::new(Inner {
                events: Mutex::new(Vec::new()),
                available: AtomicBool::new(true),
                capture_fails: AtomicBool::new(false),
                rejected_lenses: Mutex::new(Vec::new()),
                rejected_flash: Mutex::new(Vec::new()),
                acquire_gate: Mutex::new(None),
                capture_gate: Mutex::new(None),
                back_zoom: ZoomRange::new(0.5, 10.0),
                front_zoom: ZoomRange::new(1.0, 4.0),
                exposure,
            }),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.inner.events.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.inner.events.lock().unwrap().clear();
    }

    pub fn count(&self, matches: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| matches(*e)).count()
    }

    pub fn position(&self, matches: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events().iter().position(matches)
    }

    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    pub fn set_capture_fails(&self, fails: bool) {
        self.inner.capture_fails.store(fails, Ordering::SeqCst);
    }

    pub fn reject_lens(&self, lens: LensFacing) {
        self.inner.rejected_lenses.lock().unwrap().push(lens);
    }

    pub fn reject_flash(&self, flash: FlashMode) {
        self.inner.rejected_flash.lock().unwrap().push(flash);
    }

    /// Make `acquire_provider` wait until [`FakeCamera::open_acquire`]
    pub fn hold_acquire(&self) {
        *self.inner.acquire_gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn open_acquire(&self) {
        if let Some(gate) = self.inner.acquire_gate.lock().unwrap().take() {
            gate.add_permits(Semaphore::MAX_PERMITS);
        }
    }

    /// Make `capture` wait until [`FakeCamera::open_capture`]
    pub fn hold_capture(&self) {
        *self.inner.capture_gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn open_capture(&self) {
        if let Some(gate) = self.inner.capture_gate.lock().unwrap().take() {
            gate.add_permits(Semaphore::MAX_PERMITS);
        }
    }

    /// Yield to spawned tasks until an event shows up
    pub async fn wait_for(&self, matches: impl Fn(&Event) -> bool) {
        for _ in 0..10_000 {
            if self.events().iter().any(&matches) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("event never happened; log: {:?}", self.events());
    }

    fn record(&self, event: Event) {
        self.inner.events.lock().unwrap().push(event);
    }
}

async fn pass(gate: &Mutex<Option<Arc<Semaphore>>>) {
    let gate = gate.lock().unwrap().clone();
    if let Some(gate) = gate {
        let _permit = gate.acquire().await;
    }
}

#[async_trait]
impl HardwareSessionProvider for FakeCamera {
    async fn acquire_provider(&self) -> Result<Arc<dyn ProviderHandle>, ProviderError> {
        self.record(Event::Acquire);
        pass(&self.inner.acquire_gate).await;
        if !self.inner.available.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("camera revoked".to_string()));
        }
        Ok(Arc::new(self.clone()))
    }
}

impl ProviderHandle for FakeCamera {
    fn bind(
        &self,
        request: &BindRequest,
        _preview: &PreviewTarget,
    ) -> Result<Arc<dyn BoundSession>, HardwareError> {
        let rejected = self
            .inner
            .rejected_lenses
            .lock()
            .unwrap()
            .contains(&request.lens_facing)
            || self
                .inner
                .rejected_flash
                .lock()
                .unwrap()
                .contains(&request.flash_mode);
        if rejected {
            self.record(Event::BindRejected(*request));
            return Err(HardwareError::Unsupported(format!("{} rejected", request)));
        }
        self.record(Event::Bind(*request));
        Ok(Arc::new(FakeSession {
            camera: self.clone(),
            request: *request,
            released: AtomicBool::new(false),
        }))
    }
}

struct FakeSession {
    camera: FakeCamera,
    request: BindRequest,
    released: AtomicBool,
}

#[async_trait]
impl BoundSession for FakeSession {
    fn zoom_range(&self) -> ZoomRange {
        match self.request.lens_facing {
            LensFacing::Back => self.camera.inner.back_zoom,
            LensFacing::Front => self.camera.inner.front_zoom,
        }
    }

    fn exposure_range(&self) -> Option<ExposureRange> {
        self.camera.inner.exposure
    }

    fn set_zoom(&self, ratio: f32) -> Result<(), HardwareError> {
        self.camera.record(Event::SetZoom(ratio));
        Ok(())
    }

    fn set_exposure_index(&self, index: i32) -> Result<(), HardwareError> {
        self.camera.record(Event::SetExposure(index));
        Ok(())
    }

    fn focus_and_meter_at(&self, point: MeteringPoint) -> Result<(), HardwareError> {
        self.camera.record(Event::Focus(point));
        Ok(())
    }

    async fn capture(&self) -> Result<RawImage, HardwareError> {
        self.camera.record(Event::CaptureStarted);
        pass(&self.camera.inner.capture_gate).await;
        self.camera.record(Event::CaptureFinished);
        if self.camera.inner.capture_fails.load(Ordering::SeqCst) {
            return Err(HardwareError::Failed("sensor timeout".to_string()));
        }
        Ok(RawImage {
            width: 2,
            height: 2,
            data: Arc::from(vec![255u8; 16]),
            captured_at: Instant::now(),
        })
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.camera.record(Event::Release(self.request));
        }
    }
}

/// Sink that remembers suggested names instead of writing files
#[derive(Default)]
pub struct MemorySink {
    saved: Mutex<Vec<String>>,
    qualities: Mutex<Vec<QualityTier>>,
    fails: AtomicBool,
}

impl MemorySink {
    pub fn saved(&self) -> Vec<String> {
        self.saved.lock().unwrap().clone()
    }

    /// Quality tier handed over with each saved photo
    pub fn qualities(&self) -> Vec<QualityTier> {
        self.qualities.lock().unwrap().clone()
    }

    pub fn set_fails(&self, fails: bool) {
        self.fails.store(fails, Ordering::SeqCst);
    }
}

#[async_trait]
impl CaptureSink for MemorySink {
    async fn persist(
        &self,
        _image: RawImage,
        suggested_name: &str,
        quality: QualityTier,
    ) -> Result<PhotoReference, StorageError> {
        if self.fails.load(Ordering::SeqCst) {
            return Err(StorageError::Io("disk full".to_string()));
        }
        self.saved.lock().unwrap().push(suggested_name.to_string());
        self.qualities.lock().unwrap().push(quality);
        Ok(PhotoReference::new(format!("memory://{}", suggested_name)))
    }
}

/// Unbound coordinator over a fake camera and memory sink
pub fn coordinator(camera: &FakeCamera, sink: &Arc<MemorySink>) -> SessionCoordinator {
    SessionCoordinator::new(
        Arc::new(camera.clone()),
        Arc::clone(sink) as Arc<dyn CaptureSink>,
        PreviewTarget::new("test", 1000, 2000),
        DesiredConfiguration::default(),
    )
}

/// Coordinator already bound to the default configuration
pub async fn bound_coordinator(camera: &FakeCamera, sink: &Arc<MemorySink>) -> SessionCoordinator {
    let coordinator = coordinator(camera, sink);
    coordinator
        .bind_if_needed()
        .await
        .expect("initial bind should succeed");
    camera.clear_events();
    coordinator
}
