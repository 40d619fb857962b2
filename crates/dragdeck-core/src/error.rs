//! Error types shared across the core crate.

use crate::deck::ItemId;
use crate::input::PointerId;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to acquire or release exclusive pointer capture.
///
/// Capture is optional: the controller logs these and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Pointer capture is not supported by this backend")]
    Unsupported,
    #[error("Pointer {0} is not active")]
    InvalidPointer(PointerId),
    #[error("Platform capture error: {0}")]
    Platform(String),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Deck model errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeckError {
    #[error("Item not found: {0}")]
    UnknownItem(ItemId),
    #[error("Item already exists: {0}")]
    DuplicateItem(ItemId),
    #[error("Invalid item size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for deck operations.
pub type DeckResult<T> = Result<T, DeckError>;
