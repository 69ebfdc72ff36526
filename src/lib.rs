// SPDX-License-Identifier: GPL-3.0-only

//! Viewfinder - camera session control for a mobile-style camera screen
//!
//! This library owns the part of a camera app that has real state: binding
//! the single hardware session, deciding when a settings change needs a
//! rebind, applying zoom/focus/exposure in place, and serializing captures
//! against rebinds.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`session`]: Session coordinator, gestures, focus state, clamping
//! - [`backends`]: Camera hardware traits and the virtual camera
//! - [`pipelines`]: Photo encoding and persistence
//! - [`storage`]: Capture sink / gallery seams and directory gallery
//! - [`app`]: Camera screen glue
//! - [`config`]: User configuration handling

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use app::CameraScreen;
pub use config::Config;
pub use session::{SessionCoordinator, SessionPhase};
