// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the viewfinder core
//!
//! Errors are split the same way the coordinator treats them: visible,
//! blocking failures ([`BindError`], [`CaptureError`]) versus hardware
//! failures reported by the external camera stack ([`HardwareError`],
//! [`ProviderError`]) and persistence failures ([`StorageError`]).

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Session binding errors
    Bind(BindError),
    /// Photo capture errors
    Capture(CaptureError),
    /// Storage/filesystem errors
    Storage(StorageError),
    /// Configuration errors
    Config(String),
}

/// Failure to acquire the hardware provider handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Camera stack is not ready or camera permission was revoked
    Unavailable(String),
}

/// Failure reported by the hardware for a bind, control or capture call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareError {
    /// The requested lens/flash/quality combination is unsupported
    Unsupported(String),
    /// The device failed while executing a request
    Failed(String),
    /// The session was released before the call completed
    Released,
}

/// Errors returned by `bind_if_needed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// Provider could not deliver a session (or the coordinator was torn down)
    ProviderUnavailable,
    /// Hardware declined the requested configuration
    HardwareRejected,
    /// A newer configuration change took over before this bind completed
    Superseded,
}

/// Errors returned by `capture`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No session is bound
    NotReady,
    /// The capture call failed at the hardware layer
    HardwareFailure(HardwareError),
    /// The captured image could not be persisted
    Storage(StorageError),
    /// The screen was torn down while the capture was in flight
    Cancelled,
}

/// Persistence and gallery errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Filesystem error
    Io(String),
    /// Image could not be encoded
    Encoding(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Bind(e) => write!(f, "Camera error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Unavailable(msg) => write!(f, "Camera provider unavailable: {}", msg),
        }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareError::Unsupported(msg) => write!(f, "Unsupported configuration: {}", msg),
            HardwareError::Failed(msg) => write!(f, "Hardware failure: {}", msg),
            HardwareError::Released => write!(f, "Session already released"),
        }
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::ProviderUnavailable => write!(f, "Camera unavailable"),
            BindError::HardwareRejected => write!(f, "Camera rejected the requested configuration"),
            BindError::Superseded => write!(f, "Bind superseded by a newer configuration"),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NotReady => write!(f, "Camera not ready"),
            CaptureError::HardwareFailure(e) => write!(f, "Capture failed: {}", e),
            CaptureError::Storage(e) => write!(f, "Save failed: {}", e),
            CaptureError::Cancelled => write!(f, "Capture cancelled"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "I/O error: {}", msg),
            StorageError::Encoding(msg) => write!(f, "Encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for ProviderError {}
impl std::error::Error for HardwareError {}
impl std::error::Error for BindError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for StorageError {}

impl From<BindError> for AppError {
    fn from(err: BindError) -> Self {
        AppError::Bind(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<StorageError> for CaptureError {
    fn from(err: StorageError) -> Self {
        CaptureError::Storage(err)
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.into())
    }
}
