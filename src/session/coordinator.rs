// SPDX-License-Identifier: GPL-3.0-only

//! Camera session coordinator
//!
//! Reconciles the user's desired configuration with the single hardware
//! session. Lens, flash and quality changes rebind the session; zoom, focus
//! and exposure are applied to the bound session in place.
//!
//! Two pieces of state guard the hardware:
//!
//! - a **generation counter**: every bind attempt is tagged, and only the
//!   attempt carrying the latest generation may install its session;
//! - the **session gate**, an async mutex held while a session is being
//!   released/replaced and while a capture runs against it, so a rebind never
//!   tears down a handle that is mid-capture.

use crate::backends::camera::{
    BindRequest, BoundSession, ExposureRange, FlashMode, HardwareSessionProvider, LensFacing,
    MeteringPoint, PhotoReference, PreviewTarget, QualityTier, ZoomRange,
};
use crate::constants::{self, DEFAULT_ZOOM_RATIO, EXPOSURE_DRAG_SENSITIVITY};
use crate::errors::{BindError, CaptureError};
use crate::session::configuration::{ConfigurationUpdate, DesiredConfiguration};
use crate::session::focus::FocusExposureState;
use crate::session::zoom;
use crate::storage::CaptureSink;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Lifecycle of the coordinator's hardware session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No session bound, nothing in flight
    #[default]
    Unbound,
    /// A bind or rebind is in flight
    Binding,
    /// A session is bound and idle
    Bound,
    /// Screen left; the coordinator accepts no further work
    TornDown,
}

/// What the current session was bound with, plus its reported ranges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundSessionInfo {
    pub request: BindRequest,
    pub zoom_range: ZoomRange,
    pub exposure_range: Option<ExposureRange>,
}

/// Everything the UI reads back in one go
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub desired: DesiredConfiguration,
    pub bound: Option<BoundSessionInfo>,
    pub focus: FocusExposureState,
    pub last_error: Option<BindError>,
}

struct BoundSlot {
    session: Arc<dyn BoundSession>,
    info: BoundSessionInfo,
}

struct CoordinatorState {
    desired: DesiredConfiguration,
    bound: Option<BoundSlot>,
    focus: FocusExposureState,
    focus_timer: Option<JoinHandle<()>>,
    /// Generation of the most recently requested bind
    generation: u64,
    /// Target of the latest bind still in flight
    pending: Option<BindRequest>,
    last_error: Option<BindError>,
    /// Latest request the hardware refused
    rejected: Option<BindRequest>,
    torn_down: bool,
}

impl CoordinatorState {
    fn phase(&self) -> SessionPhase {
        if self.torn_down {
            SessionPhase::TornDown
        } else if self.pending.is_some() {
            SessionPhase::Binding
        } else if self.bound.is_some() {
            SessionPhase::Bound
        } else {
            SessionPhase::Unbound
        }
    }

    fn zoom_range(&self) -> ZoomRange {
        self.bound
            .as_ref()
            .map(|slot| slot.info.zoom_range)
            .unwrap_or(ZoomRange::UNBOUND)
    }

    fn cancel_focus_timer(&mut self) {
        if let Some(timer) = self.focus_timer.take() {
            timer.abort();
        }
    }

    /// Clamp a zoom ratio against the bound range and store it
    fn store_zoom(&mut self, requested: f32) -> f32 {
        if !requested.is_nan() {
            self.desired.zoom_ratio = self.zoom_range().clamp(requested);
        }
        self.desired.zoom_ratio
    }

    /// Clamp and store a zoom ratio, applying it in place when bound
    fn apply_zoom(&mut self, requested: f32) -> f32 {
        let applied = self.store_zoom(requested);
        if let Some(slot) = &self.bound
            && let Err(e) = slot.session.set_zoom(applied)
        {
            debug!(error = %e, ratio = applied, "In-place zoom failed");
        }
        applied
    }

    /// Install a freshly bound session and re-apply the clamped zoom
    fn install(&mut self, session: Arc<dyn BoundSession>, request: BindRequest) -> BoundSessionInfo {
        let info = BoundSessionInfo {
            request,
            zoom_range: session.zoom_range(),
            exposure_range: session.exposure_range(),
        };
        let zoom = info.zoom_range.clamp(self.desired.zoom_ratio);
        self.desired.zoom_ratio = zoom;
        if let Err(e) = session.set_zoom(zoom) {
            debug!(error = %e, ratio = zoom, "Initial zoom failed");
        }

        // A new pipeline starts at exposure 0 with no metering region
        self.cancel_focus_timer();
        self.focus = FocusExposureState::default();

        self.bound = Some(BoundSlot { session, info });
        self.pending = None;
        info
    }
}

struct Shared {
    provider: Arc<dyn HardwareSessionProvider>,
    sink: Arc<dyn CaptureSink>,
    preview: PreviewTarget,
    state: Mutex<CoordinatorState>,
    session_gate: tokio::sync::Mutex<()>,
    phase: watch::Sender<SessionPhase>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &CoordinatorState) {
        let phase = state.phase();
        self.phase.send_if_modified(|current| {
            if *current == phase {
                false
            } else {
                *current = phase;
                true
            }
        });
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.cancel_focus_timer();
        if let Some(slot) = state.bound.take() {
            debug!("Releasing camera session on coordinator drop");
            slot.session.release();
        }
    }
}

/// Owner of the camera session for one viewfinder screen
///
/// Cheap to clone; all clones drive the same session.
#[derive(Clone)]
pub struct SessionCoordinator {
    shared: Arc<Shared>,
}

impl SessionCoordinator {
    /// Create an unbound coordinator
    ///
    /// # Arguments
    /// * `provider` - Camera stack to bind sessions from
    /// * `sink` - Where captured photos are persisted
    /// * `preview` - Surface the session renders into
    /// * `initial` - Starting configuration (e.g. the saved quality tier)
    pub fn new(
        provider: Arc<dyn HardwareSessionProvider>,
        sink: Arc<dyn CaptureSink>,
        preview: PreviewTarget,
        initial: DesiredConfiguration,
    ) -> Self {
        info!(
            preview = %preview.name,
            width = preview.width,
            height = preview.height,
            "Creating session coordinator"
        );

        let (phase, _) = watch::channel(SessionPhase::Unbound);
        let state = CoordinatorState {
            desired: initial,
            bound: None,
            focus: FocusExposureState::default(),
            focus_timer: None,
            generation: 0,
            pending: None,
            last_error: None,
            rejected: None,
            torn_down: false,
        };

        Self {
            shared: Arc::new(Shared {
                provider,
                sink,
                preview,
                state: Mutex::new(state),
                session_gate: tokio::sync::Mutex::new(()),
                phase,
            }),
        }
    }

    // ===== Configuration =====

    /// Merge a partial configuration update
    ///
    /// Zoom is clamped and applied in place. If lens, flash or quality end up
    /// different from what is bound (or from the bind in flight), a rebind is
    /// scheduled; it supersedes any earlier one. While unbound only a change
    /// after a hardware rejection triggers a bind.
    pub fn set_desired_configuration(&self, update: ConfigurationUpdate) {
        let mut state = self.shared.lock_state();
        if state.torn_down {
            debug!("Ignoring configuration change after teardown");
            return;
        }

        let lens_changes = update
            .lens_facing
            .is_some_and(|lens| lens != state.desired.lens_facing);

        let changed = state.desired.merge(&ConfigurationUpdate {
            zoom_ratio: None,
            ..update
        });

        if let Some(ratio) = update.zoom_ratio {
            if lens_changes {
                // Not pushed to the outgoing session; install re-clamps for the new lens
                state.store_zoom(ratio);
            } else {
                state.apply_zoom(ratio);
            }
        }

        let target = state.desired.bind_request();
        let needs_rebind = match (&state.pending, &state.bound) {
            (Some(pending), _) => *pending != target,
            (None, Some(slot)) => slot.info.request != target,
            (None, None) => changed && state.last_error == Some(BindError::HardwareRejected),
        };

        if needs_rebind {
            self.schedule_rebind(&mut state, target);
        }
    }

    /// Switch lens; resets zoom to 1.0 when the lens actually changes
    pub fn set_lens_facing(&self, lens: LensFacing) {
        let current = self.shared.lock_state().desired.lens_facing;
        if current == lens {
            return;
        }
        info!(from = %current, to = %lens, "Switching lens");
        self.set_desired_configuration(
            ConfigurationUpdate::lens(lens).with_zoom(DEFAULT_ZOOM_RATIO),
        );
    }

    /// Flip between front and back lens
    pub fn flip_lens(&self) -> LensFacing {
        let next = self.shared.lock_state().desired.lens_facing.flipped();
        self.set_lens_facing(next);
        next
    }

    /// Cycle flash Off -> On -> Auto -> Off; returns the new mode
    ///
    /// A mode the hardware just refused for the current lens and quality is
    /// skipped.
    pub fn toggle_flash_mode(&self) -> FlashMode {
        let next = {
            let state = self.shared.lock_state();
            let desired = state.desired.bind_request();
            let refused = |flash_mode| {
                state.rejected
                    == Some(BindRequest {
                        flash_mode,
                        ..desired
                    })
            };
            let next = desired.flash_mode.next();
            if refused(next) { next.next() } else { next }
        };
        debug!(flash = %next, "Toggling flash mode");
        self.set_desired_configuration(ConfigurationUpdate::flash(next));
        next
    }

    pub fn set_quality_tier(&self, quality: QualityTier) {
        debug!(%quality, "Setting quality tier");
        self.set_desired_configuration(ConfigurationUpdate::quality(quality));
    }

    fn schedule_rebind(&self, state: &mut CoordinatorState, target: BindRequest) {
        state.generation += 1;
        let generation = state.generation;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(%target, "No async runtime; rebind deferred to the next bind_if_needed");
            return;
        };

        state.pending = Some(target);
        self.shared.publish(state);
        debug!(generation, %target, "Rebind scheduled");

        let coordinator = self.clone();
        runtime.spawn(async move {
            if let Err(e) = coordinator.run_bind(generation).await {
                debug!(generation, error = %e, "Scheduled rebind did not install a session");
            }
        });
    }

    // ===== Binding =====

    /// Bind a session for the current desired configuration unless the bound
    /// one already matches
    ///
    /// # Returns
    /// * `Ok(info)` - Session bound (or already matching)
    /// * `Err(BindError::ProviderUnavailable)` - Camera stack unavailable or
    ///   coordinator torn down; any previous session stays bound
    /// * `Err(BindError::HardwareRejected)` - Configuration unsupported; the
    ///   last known-good configuration is bound again when there was one
    /// * `Err(BindError::Superseded)` - A newer configuration change won
    pub async fn bind_if_needed(&self) -> Result<BoundSessionInfo, BindError> {
        let generation = {
            let mut state = self.shared.lock_state();
            if state.torn_down {
                return Err(BindError::ProviderUnavailable);
            }
            let target = state.desired.bind_request();
            if state.pending.is_none()
                && let Some(slot) = &state.bound
                && slot.info.request == target
            {
                return Ok(slot.info);
            }
            state.generation += 1;
            state.pending = Some(target);
            self.shared.publish(&state);
            state.generation
        };

        self.run_bind(generation).await
    }

    async fn run_bind(&self, generation: u64) -> Result<BoundSessionInfo, BindError> {
        debug!(generation, "Acquiring camera provider");
        let acquired = self.shared.provider.acquire_provider().await;

        // Wait for any in-flight capture to finish with the current session
        let _gate = self.shared.session_gate.lock().await;

        let (handle, target, previous) = {
            let mut state = self.shared.lock_state();
            if state.torn_down {
                return Err(BindError::ProviderUnavailable);
            }
            if state.generation != generation {
                debug!(generation, latest = state.generation, "Discarding stale bind");
                return Err(BindError::Superseded);
            }

            let handle = match acquired {
                Ok(handle) => handle,
                Err(e) => {
                    warn!(error = %e, "Camera provider unavailable");
                    state.pending = None;
                    state.last_error = Some(BindError::ProviderUnavailable);
                    self.shared.publish(&state);
                    return Err(BindError::ProviderUnavailable);
                }
            };

            let target = state.desired.bind_request();
            if let Some(slot) = &state.bound
                && slot.info.request == target
            {
                let info = slot.info;
                state.pending = None;
                state.last_error = None;
                self.shared.publish(&state);
                return Ok(info);
            }

            (handle, target, state.bound.take())
        };

        // Hardware exclusivity: the old pipeline goes before the new one is built
        if let Some(previous) = &previous {
            debug!(request = %previous.info.request, "Releasing previous session");
            previous.session.release();
        }

        match handle.bind(&target, &self.shared.preview) {
            Ok(session) => {
                let mut state = self.shared.lock_state();
                if state.torn_down || state.generation != generation {
                    debug!(generation, "Bind completed after being superseded");
                    session.release();
                    self.shared.publish(&state);
                    return Err(if state.torn_down {
                        BindError::ProviderUnavailable
                    } else {
                        BindError::Superseded
                    });
                }

                let info = state.install(session, target);
                state.last_error = None;
                self.shared.publish(&state);
                info!(
                    request = %info.request,
                    zoom_min = info.zoom_range.min,
                    zoom_max = info.zoom_range.max,
                    zoom = state.desired.zoom_ratio,
                    "Camera session bound"
                );
                Ok(info)
            }
            Err(e) => {
                warn!(error = %e, request = %target, "Hardware rejected configuration");

                // Fall back to the last configuration that worked
                let fallback = previous.and_then(|previous| {
                    let request = previous.info.request;
                    match handle.bind(&request, &self.shared.preview) {
                        Ok(session) => Some((session, request)),
                        Err(e) => {
                            error!(error = %e, %request, "Fallback bind failed");
                            None
                        }
                    }
                });

                let mut state = self.shared.lock_state();
                if state.torn_down || state.generation != generation {
                    if let Some((session, _)) = fallback {
                        session.release();
                    }
                    self.shared.publish(&state);
                    return Err(if state.torn_down {
                        BindError::ProviderUnavailable
                    } else {
                        BindError::Superseded
                    });
                }

                state.pending = None;
                state.last_error = Some(BindError::HardwareRejected);
                state.rejected = Some(target);
                if let Some((session, request)) = fallback {
                    state.desired.lens_facing = request.lens_facing;
                    state.desired.flash_mode = request.flash_mode;
                    state.desired.quality_tier = request.quality_tier;
                    state.install(session, request);
                    info!(%request, "Restored last known-good session");
                }
                self.shared.publish(&state);
                Err(BindError::HardwareRejected)
            }
        }
    }

    /// Wait until no bind is in flight and return the resulting phase
    pub async fn settled(&self) -> SessionPhase {
        let mut phase = self.shared.phase.subscribe();
        match phase.wait_for(|p| *p != SessionPhase::Binding).await {
            Ok(p) => *p,
            Err(_) => self.phase(),
        }
    }

    // ===== In-place controls =====

    /// Clamp and apply a zoom ratio; returns the value actually applied
    ///
    /// Unbound, the only valid ratio is 1.0.
    pub fn set_zoom(&self, requested: f32) -> f32 {
        let mut state = self.shared.lock_state();
        if state.torn_down {
            return state.desired.zoom_ratio;
        }
        let applied = state.apply_zoom(requested);
        debug!(requested, applied, "Zoom set");
        applied
    }

    /// Tap-to-focus at a normalized point
    ///
    /// Resets exposure to 0, starts focus/metering when bound (failures are
    /// ignored) and (re)arms the auto-hide timer.
    pub fn on_tap(&self, point: MeteringPoint) {
        let mut state = self.shared.lock_state();
        if state.torn_down {
            return;
        }

        state.focus = FocusExposureState::tapped(point, Instant::now());
        if let Some(slot) = &state.bound {
            if let Err(e) = slot.session.focus_and_meter_at(point) {
                debug!(error = %e, "Focus and metering failed");
            }
            if let Err(e) = slot.session.set_exposure_index(0) {
                debug!(error = %e, "Exposure reset failed");
            }
        }
        debug!(x = point.x, y = point.y, "Focus point set");

        self.arm_focus_timer(&mut state);
    }

    /// Vertical drag on the exposure slider, in surface pixels
    ///
    /// Dragging up (negative delta) raises exposure. Ignored unless the slider
    /// is visible and the bound session reports an exposure range.
    pub fn on_exposure_drag(&self, delta_pixels: f32) {
        let mut state = self.shared.lock_state();
        if state.torn_down || !delta_pixels.is_finite() {
            return;
        }

        let now = Instant::now();
        if !state.focus.at(now).slider_visible {
            return;
        }
        let Some((session, range)) = state.bound.as_ref().and_then(|slot| {
            slot.info
                .exposure_range
                .map(|range| (Arc::clone(&slot.session), range))
        }) else {
            return;
        };

        let index =
            range.clamp(state.focus.exposure_index - delta_pixels * EXPOSURE_DRAG_SENSITIVITY);
        state.focus.exposure_index = index;
        state.focus.extend(now);
        if let Err(e) = session.set_exposure_index(index as i32) {
            debug!(error = %e, index, "Exposure update failed");
        }

        self.arm_focus_timer(&mut state);
    }

    fn arm_focus_timer(&self, state: &mut CoordinatorState) {
        state.cancel_focus_timer();
        let Some(deadline) = state.focus.expires_at else {
            return;
        };
        // Without a runtime the indicator still expires lazily on read
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let shared = Arc::downgrade(&self.shared);
        state.focus_timer = Some(runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut state = shared.lock_state();
            if state.focus.expires_at == Some(deadline) {
                state.focus.hide();
                state.focus_timer = None;
                debug!("Focus indicator hidden");
            }
        }));
    }

    // ===== Capture =====

    /// Capture a still photo and persist it
    ///
    /// # Returns
    /// * `Ok(reference)` - Saved photo, for the gallery thumbnail
    /// * `Err(CaptureError::NotReady)` - No session bound; nothing was called
    /// * `Err(CaptureError::HardwareFailure)` - Hardware capture failed
    /// * `Err(CaptureError::Storage)` - Photo could not be saved
    /// * `Err(CaptureError::Cancelled)` - Screen torn down meanwhile
    pub async fn capture(&self) -> Result<PhotoReference, CaptureError> {
        {
            let state = self.shared.lock_state();
            if state.torn_down || state.bound.is_none() {
                debug!("Capture requested while unbound");
                return Err(CaptureError::NotReady);
            }
        }

        let (image, quality) = {
            // Held until the hardware is done so no rebind releases the session
            let _gate = self.shared.session_gate.lock().await;

            let (session, quality) = {
                let state = self.shared.lock_state();
                match (&state.bound, state.torn_down) {
                    (Some(slot), false) => {
                        (Arc::clone(&slot.session), slot.info.request.quality_tier)
                    }
                    _ => return Err(CaptureError::NotReady),
                }
            };

            info!(%quality, "Capturing photo");
            let image = session.capture().await.map_err(|e| {
                error!(error = %e, "Hardware capture failed");
                CaptureError::HardwareFailure(e)
            })?;
            (image, quality)
        };

        if self.shared.lock_state().torn_down {
            warn!("Discarding capture completed after teardown");
            return Err(CaptureError::Cancelled);
        }

        let name = constants::photo_name(&chrono::Local::now());
        let reference = self
            .shared
            .sink
            .persist(image, &name, quality)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to persist photo");
                CaptureError::Storage(e)
            })?;

        info!(photo = %reference, "Photo captured");
        Ok(reference)
    }

    // ===== Teardown =====

    /// Release the session and stop accepting work
    ///
    /// In-flight binds are invalidated; an in-flight capture is allowed to
    /// finish with the hardware before the session is released, but its
    /// result is discarded.
    pub async fn teardown(&self) {
        {
            let mut state = self.shared.lock_state();
            if state.torn_down {
                return;
            }
            info!("Tearing down camera session");
            state.torn_down = true;
            state.generation += 1;
            state.pending = None;
            state.cancel_focus_timer();
            state.focus = FocusExposureState::default();
            self.shared.publish(&state);
        }

        let _gate = self.shared.session_gate.lock().await;
        let slot = self.shared.lock_state().bound.take();
        if let Some(slot) = slot {
            slot.session.release();
            info!(request = %slot.info.request, "Camera session released");
        }
    }

    // ===== Read-back =====

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.shared.lock_state();
        SessionSnapshot {
            phase: state.phase(),
            desired: state.desired,
            bound: state.bound.as_ref().map(|slot| slot.info),
            focus: state.focus.at(Instant::now()),
            last_error: state.last_error.clone(),
        }
    }

    pub fn desired(&self) -> DesiredConfiguration {
        self.shared.lock_state().desired
    }

    /// Focus indicator state as it should be drawn now
    pub fn focus_state(&self) -> FocusExposureState {
        self.shared.lock_state().focus.at(Instant::now())
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.lock_state().phase()
    }

    /// Receiver that observes every phase change
    pub fn subscribe_phase(&self) -> watch::Receiver<SessionPhase> {
        self.shared.phase.subscribe()
    }

    pub fn bound_info(&self) -> Option<BoundSessionInfo> {
        self.shared.lock_state().bound.as_ref().map(|slot| slot.info)
    }

    pub fn is_bound(&self) -> bool {
        self.shared.lock_state().bound.is_some()
    }

    /// Last bind failure, cleared by the next successful bind
    pub fn last_error(&self) -> Option<BindError> {
        self.shared.lock_state().last_error.clone()
    }

    /// Zoom presets for the bound lens
    pub fn zoom_levels(&self) -> Vec<f32> {
        zoom::zoom_levels(self.shared.lock_state().zoom_range())
    }

    /// Select a zoom preset; returns the applied ratio
    pub fn select_zoom_level(&self, level: f32) -> f32 {
        self.set_zoom(level)
    }
}

impl std::fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock_state();
        f.debug_struct("SessionCoordinator")
            .field("phase", &state.phase())
            .field("desired", &state.desired)
            .field("bound", &state.bound.as_ref().map(|slot| slot.info))
            .field("generation", &state.generation)
            .finish()
    }
}
