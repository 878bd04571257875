//! # Error Types
//!
//! Custom error types for DS Link using `thiserror`.

use thiserror::Error;

/// Main error type for DS Link
#[derive(Debug, Error)]
pub enum DsLinkError {
    /// Wire protocol errors (malformed or undersized frames)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Datagram transport errors (bind/send/receive failures)
    #[error("transport error: {0}")]
    Transport(String),

    /// Gamepad input errors
    #[error("input error: {0}")]
    Input(String),

    /// Configuration value errors
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Configuration parse errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Telemetry serialization errors
    #[error("telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DS Link
pub type Result<T> = std::result::Result<T, DsLinkError>;
