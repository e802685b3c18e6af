//! Error types for flacseek-meta.

use std::io;
use thiserror::Error;

use crate::BlockType;

/// Result type for flacseek-meta operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for metadata block parsing.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Block type 127, which the format forbids.
    #[error("Invalid metadata block type 127")]
    InvalidBlockType,

    /// Block body length does not match its contents.
    #[error("Invalid {block_type} block length: {length}")]
    InvalidLength { block_type: BlockType, length: u32 },

    /// Seek table length is not a multiple of the seek point size.
    #[error("Invalid seek table length: {0} is not a multiple of 18")]
    InvalidSeekTable(u32),

    /// A field holds a value the format does not allow.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    /// A string field is not valid UTF-8.
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    /// A body is too large to be described by a 24-bit block length.
    #[error("Block body of {0} bytes exceeds the 24-bit length field")]
    BlockTooLarge(usize),
}

impl Error {
    /// Create an invalid field error.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
