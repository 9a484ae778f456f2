//! Pipeline error types

use thiserror::Error;

/// Errors that can occur anywhere in a mixing/mastering request
#[derive(Error, Debug)]
pub enum MixdownError {
    /// Caller supplied something the pipeline cannot work with
    /// (empty stem list, out-of-range pan, malformed URL, unsupported format...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required collaborator was not configured
    #[error("Required dependency not configured: {0}")]
    UnconfiguredDependency(&'static str),

    /// Input bytes could not be decoded into an audio buffer
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Mastered buffer could not be encoded
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Sample rate conversion failed
    #[error("Resample failed: {0}")]
    Resample(String),

    /// Blob store fetch or upload failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Zip archive could not be written
    #[error("Archive failed: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MixdownError {
    /// Shorthand for building an `InvalidInput` error
    pub fn invalid(msg: impl Into<String>) -> Self {
        MixdownError::InvalidInput(msg.into())
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, MixdownError>;
