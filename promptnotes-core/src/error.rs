//! Error types for promptnotes-core

use thiserror::Error;

/// Main error type for the promptnotes-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Transcript file missing or unreadable
    #[error("transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    /// Git subprocess failure
    #[error("git error: {0}")]
    Git(String),
}

/// Result type alias for promptnotes-core
pub type Result<T> = std::result::Result<T, Error>;
