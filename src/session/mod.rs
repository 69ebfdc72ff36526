// SPDX-License-Identifier: GPL-3.0-only

//! Camera session control
//!
//! ```text
//! pointer events ──► GestureTranslator ──► SessionCoordinator ──► BoundSession
//!                                              │        ▲
//!                                   rebind ────┘        └──── in-place zoom /
//!                                   (provider)                exposure / metering
//! ```
//!
//! - [`coordinator`]: desired vs. bound configuration, binding, capture
//! - [`gesture`]: surface pixels to normalized metering points
//! - [`focus`]: focus ring / exposure slider state
//! - [`clamp`]: range clamping
//! - [`zoom`]: discrete zoom presets

pub mod clamp;
pub mod configuration;
pub mod coordinator;
pub mod focus;
pub mod gesture;
pub mod zoom;

pub use configuration::{ConfigurationUpdate, DesiredConfiguration};
pub use coordinator::{BoundSessionInfo, SessionCoordinator, SessionPhase, SessionSnapshot};
pub use focus::FocusExposureState;
pub use gesture::GestureTranslator;
