//! flacseek-stream: FLAC stream sessions with sample-accurate seeking
//!
//! A [`Stream`] verifies the `fLaC` signature (skipping a leading ID3v2
//! tag), reads STREAMINFO and the remaining metadata blocks, and leaves the
//! source at the first audio frame. Frames are then read one at a time.
//!
//! Seekable sessions map a sample position onto a frame start through a
//! [`SeekIndex`]: the stream's own SEEKTABLE when metadata is retained, or
//! one synthesized by scanning every frame on the first seek and
//! down-sampling to a bounded number of points.
//!
//! ```no_run
//! use flacseek_stream::{SeekOrigin, Stream};
//!
//! # fn main() -> flacseek_stream::Result<()> {
//! let mut stream = Stream::open_seekable("track.flac")?;
//! let reached = stream.seek(44_100 * 30, SeekOrigin::Start)?;
//! if let Some(frame) = stream.next_frame()? {
//!     println!("at sample {}: {} samples per channel", reached, frame.block_size());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod seek;
mod sequencer;
pub mod signature;
mod source;
mod stream;

pub use error::{Error, Result};
pub use seek::{SeekIndex, SeekIndexBuilder, SeekOrigin};
pub use sequencer::MetadataMode;
pub use signature::{verify_signature, SIGNATURE};
pub use source::TrackedReader;
pub use stream::{Frames, ParseFailure, Stream, StreamBuilder};

pub use flacseek_frame::{Frame, FrameHeader};
pub use flacseek_meta::{Block, BlockBody, SeekPoint, StreamInfo};
