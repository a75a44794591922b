//! # Error Types
//!
//! Custom error types for ps5ctrl using `thiserror`.

use thiserror::Error;

/// Main error type for ps5ctrl
#[derive(Debug, Error)]
pub enum Ps5CtrlError {
    /// No controller found, or the HID session could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// Unknown button, stick, axis, trigger or force slot identifier
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation attempted on a closed controller handle
    #[error("Controller is not connected")]
    NotConnected,

    /// HID read/write failures (usually a disconnect)
    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// Input report that cannot be decoded
    #[error("Invalid report: {0}")]
    InvalidReport(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ps5ctrl
pub type Result<T> = std::result::Result<T, Ps5CtrlError>;
