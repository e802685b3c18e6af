//! Error types for flacseek-frame.

use std::io;
use thiserror::Error;

/// Result type for frame operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for frame parsing and encoding.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred. A stream ending inside a frame surfaces here as
    /// `UnexpectedEof`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The frame does not start with the 14-bit sync code.
    #[error("Invalid frame sync code: {0:#06x}")]
    InvalidSync(u16),

    /// A header field uses a value the format reserves.
    #[error("Reserved value in frame header: {0}")]
    Reserved(&'static str),

    /// Frame header CRC-8 mismatch.
    #[error("Frame header CRC-8 mismatch: computed {computed:#04x}, stored {stored:#04x}")]
    HeaderCrcMismatch { computed: u8, stored: u8 },

    /// Frame CRC-16 mismatch.
    #[error("Frame CRC-16 mismatch: computed {computed:#06x}, stored {stored:#06x}")]
    FrameCrcMismatch { computed: u16, stored: u16 },

    /// Malformed subframe.
    #[error("Invalid subframe: {0}")]
    InvalidSubframe(String),

    /// Malformed residual coding.
    #[error("Invalid residual: {0}")]
    InvalidResidual(String),

    /// Valid but unsupported feature.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Create an invalid subframe error.
    pub fn invalid_subframe(msg: impl Into<String>) -> Self {
        Self::InvalidSubframe(msg.into())
    }

    /// Create an invalid residual error.
    pub fn invalid_residual(msg: impl Into<String>) -> Self {
        Self::InvalidResidual(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}
