// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera hardware
//!
//! # Modules
//!
//! - [`camera`]: Hardware session traits and shared types
//! - [`virtual_camera`]: In-process simulated camera stack

pub mod camera;
pub mod virtual_camera;
