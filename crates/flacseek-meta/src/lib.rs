//! flacseek-meta: FLAC metadata block parsing
//!
//! A FLAC stream starts with the `fLaC` signature followed by one or more
//! metadata blocks. The first block is always STREAMINFO; the rest may appear
//! in any order, and the last one carries the last-block flag in its header.
//!
//! # Modules
//!
//! - `block` - Block headers, block types and the [`BlockBody`] sum type
//! - `streaminfo` - Core stream parameters
//! - `seektable` - Embedded seek points
//! - `vorbis` - Vorbis comments (tags)
//! - `cuesheet` - CD cue sheets
//! - `picture` - Embedded pictures
//!
//! Bodies of reserved block types decode to [`BlockBody::Unknown`], keeping
//! their bytes, so readers can walk past blocks they do not understand.

mod block;
mod cuesheet;
mod cursor;
pub mod error;
mod picture;
mod seektable;
mod streaminfo;
mod vorbis;

pub use block::{Block, BlockBody, BlockHeader, BlockType, MAX_BLOCK_LENGTH};
pub use cuesheet::{CueIndex, CueSheet, CueTrack};
pub use error::{Error, Result};
pub use picture::Picture;
pub use seektable::{SeekPoint, SeekTable};
pub use streaminfo::StreamInfo;
pub use vorbis::VorbisComment;
