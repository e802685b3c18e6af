//! Error types for flacseek-stream.

use std::io;
use thiserror::Error;

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for stream sessions.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying source, including failed repositioning.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The preamble is not `fLaC`, after skipping any ID3v2 tag.
    #[error("Invalid stream signature: expected {expected:02x?}, found {found:02x?}")]
    InvalidSignature { expected: [u8; 4], found: [u8; 4] },

    /// The first metadata block is not a valid STREAMINFO block.
    #[error("Malformed STREAMINFO: {0}")]
    MalformedStreamInfo(String),

    /// Metadata block parsing failed.
    #[error("Metadata error: {0}")]
    Metadata(#[from] flacseek_meta::Error),

    /// Frame parsing failed.
    #[error("Frame error: {0}")]
    Frame(#[from] flacseek_frame::Error),

    /// The session cannot seek.
    #[error("Seeking unsupported: {0}")]
    SeekUnsupported(&'static str),

    /// Seek origin code outside 0..=2.
    #[error("Invalid seek mode: {0}")]
    InvalidSeekMode(i32),
}

impl Error {
    /// Create a malformed STREAMINFO error.
    pub fn malformed_stream_info(msg: impl Into<String>) -> Self {
        Self::MalformedStreamInfo(msg.into())
    }
}
