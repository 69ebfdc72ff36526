// SPDX-License-Identifier: GPL-3.0-only

//! Camera hardware abstraction
//!
//! The viewfinder never talks to a device directly. It goes through three
//! object-safe traits that mirror how a platform camera stack hands out
//! access:
//!
//! ```text
//! ┌────────────────────────┐
//! │  SessionCoordinator    │  ← owns the single bound session
//! └──────────┬─────────────┘
//!            │ acquire_provider().await
//!            ▼
//! ┌────────────────────────┐
//! │ HardwareSessionProvider│  ← resolves the camera stack (async, may fail)
//! └──────────┬─────────────┘
//!            │ ProviderHandle::bind(request, preview)
//!            ▼
//! ┌────────────────────────┐
//! │     BoundSession       │  ← zoom / exposure / metering / capture
//! └────────────────────────┘
//! ```

pub mod types;

pub use types::*;

use crate::errors::{HardwareError, ProviderError};
use async_trait::async_trait;
use std::sync::Arc;

/// Entry point into the platform camera stack
#[async_trait]
pub trait HardwareSessionProvider: Send + Sync {
    /// Resolve the (singleton) provider handle
    ///
    /// Completes later; fails when the stack is not ready or camera access
    /// has been revoked.
    async fn acquire_provider(&self) -> Result<Arc<dyn ProviderHandle>, ProviderError>;
}

/// Resolved camera stack, able to build capture pipelines
pub trait ProviderHandle: Send + Sync {
    /// Build a pipeline for the given lens/flash/quality and preview surface
    ///
    /// The caller must have released any previously bound session first.
    ///
    /// # Returns
    /// * `Ok(session)` - Pipeline running, ranges populated
    /// * `Err(HardwareError::Unsupported)` - Combination not supported
    fn bind(
        &self,
        request: &BindRequest,
        preview: &PreviewTarget,
    ) -> Result<Arc<dyn BoundSession>, HardwareError>;
}

/// An active hardware pipeline
///
/// Control calls start an operation and return immediately; they do not wait
/// for the hardware to settle.
#[async_trait]
pub trait BoundSession: Send + Sync {
    /// Zoom ratio range reported after binding
    fn zoom_range(&self) -> ZoomRange;

    /// Exposure compensation range, if the device reports one
    fn exposure_range(&self) -> Option<ExposureRange>;

    /// Apply a zoom ratio in place
    fn set_zoom(&self, ratio: f32) -> Result<(), HardwareError>;

    /// Apply an exposure compensation index in place
    fn set_exposure_index(&self, index: i32) -> Result<(), HardwareError>;

    /// Start a focus-and-meter operation at the given point
    fn focus_and_meter_at(&self, point: MeteringPoint) -> Result<(), HardwareError>;

    /// Capture a single still frame
    async fn capture(&self) -> Result<RawImage, HardwareError>;

    /// Tear the pipeline down and give the device back
    fn release(&self);
}
