//! Error types for `VoiceMaps`

use thiserror::Error;

use crate::voice::CaptureError;

/// Result type alias for `VoiceMaps` operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `VoiceMaps`
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech capture ended in a classified failure
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Platform recognizer could not be started
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Place search backend could not be reached
    #[error("lookup unavailable: {0}")]
    LookupUnavailable(String),

    /// Text-to-speech dispatch error
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
