//! Error types for the guide engine
//!
//! Each boundary of the engine has its own error type:
//! - Image data (decode/encode of step screenshots)
//! - Screen capture
//! - Guide/project persistence
//! - AI assist calls
//! - Document export
//!
//! All error types use `thiserror`. None of them escape the compositor,
//! which falls back to the unannotated image instead.

use thiserror::Error;

/// Errors while decoding or encoding step image data
#[derive(Error, Debug)]
pub enum ImageDataError {
    /// The string is not a `data:<mime>;base64,` URI
    #[error("Invalid data URI")]
    InvalidDataUri,

    /// The base64 payload could not be decoded
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The raster payload could not be decoded or encoded
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),
}

/// Terminal failures of a single capture attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The user or the platform refused access to the display
    #[error("Screen capture permission denied")]
    PermissionDenied,

    /// No frame became ready before the deadline
    #[error("Capture source not ready after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The capture was cancelled by the caller
    #[error("Capture cancelled")]
    Cancelled,

    /// The capture source reported an error
    #[error("Capture source failed: {0}")]
    Source(String),

    /// The captured frame could not be encoded
    #[error("Failed to encode captured frame: {0}")]
    Encode(String),
}

/// Persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Neither the config nor the platform names a data directory
    #[error("Unable to resolve local data directory")]
    NoDataDirectory,

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored or imported JSON is malformed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Imported document is not a state export
    #[error("Invalid import: {0}")]
    InvalidImport(String),
}

/// AI assist errors. Callers normally go through `Assistant`, which turns
/// every one of these into fallback text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssistError {
    /// No API key configured
    #[error("API key is missing")]
    MissingApiKey,

    /// Transport or HTTP status failure
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with something we could not use
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The call did not finish in time
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },
}

/// Document export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// The system clipboard rejected the write
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Writing the exported file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
