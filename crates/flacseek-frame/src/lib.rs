//! flacseek-frame: FLAC audio frame parsing and decoding
//!
//! Frames follow the metadata blocks. Each frame is a header (sync code,
//! block size, sample rate, channel layout, sample size, frame or sample
//! number, CRC-8), one subframe per channel, and a CRC-16 footer.
//!
//! Reading is split in two so callers can look at a header before paying
//! for the body:
//!
//! ```no_run
//! use flacseek_frame::{Frame, FrameHeader, StreamParams};
//!
//! # fn main() -> flacseek_frame::Result<()> {
//! let mut reader = std::io::Cursor::new(Vec::<u8>::new());
//! let params = StreamParams { sample_rate: 44_100, bits_per_sample: 16 };
//! while let Some(header) = FrameHeader::read(&mut reader, &params)? {
//!     let frame = Frame::read_body(&mut reader, header)?;
//!     println!("{} samples", frame.block_size());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`encode_frame`] writes uncompressed (constant or verbatim) frames.

mod crc;
pub mod error;
mod frame;
mod header;
mod subframe;
mod writer;

pub use crc::{crc16, crc8};
pub use error::{Error, Result};
pub use frame::Frame;
pub use header::{BlockingStrategy, ChannelAssignment, FrameHeader, StreamParams};
pub use subframe::{read_subframe, SubframeKind};
pub use writer::encode_frame;
