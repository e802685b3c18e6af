//! STREAMINFO block.
//!
//! Layout (34 bytes, big-endian bit fields):
//! - 16: minimum block size, 16: maximum block size (samples)
//! - 24: minimum frame size, 24: maximum frame size (bytes, 0 = unknown)
//! - 20: sample rate, 3: channels - 1, 5: bits per sample - 1
//! - 36: total samples (0 = unknown)
//! - 128: MD5 of the unencoded audio

use std::io::Write;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use crate::{BlockType, Error, Result};

/// Core stream parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamInfo {
    /// Minimum block size in samples.
    pub min_block_size: u16,
    /// Maximum block size in samples.
    pub max_block_size: u16,
    /// Minimum frame size in bytes (0 if unknown).
    pub min_frame_size: u32,
    /// Maximum frame size in bytes (0 if unknown).
    pub max_frame_size: u32,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels (1-8).
    pub channels: u8,
    /// Bits per sample (4-32).
    pub bits_per_sample: u8,
    /// Total inter-channel samples (0 if unknown).
    pub total_samples: u64,
    /// MD5 of the unencoded audio data.
    pub md5: [u8; 16],
}

impl StreamInfo {
    /// Encoded body length.
    pub const LENGTH: u32 = 34;

    /// Decode a STREAMINFO body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != Self::LENGTH as usize {
            return Err(Error::InvalidLength {
                block_type: BlockType::StreamInfo,
                length: data.len() as u32,
            });
        }

        let mut r = BitReader::endian(data, BigEndian);
        let mut info = Self {
            min_block_size: r.read::<u16>(16)?,
            max_block_size: r.read::<u16>(16)?,
            min_frame_size: r.read::<u32>(24)?,
            max_frame_size: r.read::<u32>(24)?,
            sample_rate: r.read::<u32>(20)?,
            channels: r.read::<u8>(3)? + 1,
            bits_per_sample: r.read::<u8>(5)? + 1,
            total_samples: r.read::<u64>(36)?,
            md5: [0; 16],
        };
        r.read_bytes(&mut info.md5)?;

        if info.min_block_size > info.max_block_size {
            return Err(Error::invalid_field(
                "block size",
                format!("minimum {} exceeds maximum {}", info.min_block_size, info.max_block_size),
            ));
        }

        Ok(info)
    }

    /// Write the STREAMINFO body.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        if !(1..=8).contains(&self.channels) {
            return Err(Error::invalid_field("channels", self.channels.to_string()));
        }
        if !(1..=32).contains(&self.bits_per_sample) {
            return Err(Error::invalid_field(
                "bits per sample",
                self.bits_per_sample.to_string(),
            ));
        }

        let mut w = BitWriter::endian(writer, BigEndian);
        w.write(16, self.min_block_size)?;
        w.write(16, self.max_block_size)?;
        w.write(24, self.min_frame_size)?;
        w.write(24, self.max_frame_size)?;
        w.write(20, self.sample_rate)?;
        w.write(3, self.channels - 1)?;
        w.write(5, self.bits_per_sample - 1)?;
        w.write(36, self.total_samples)?;
        w.write_bytes(&self.md5)?;
        Ok(())
    }

    /// Stream duration in seconds, or 0.0 if unknown.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.total_samples as f64 / self.sample_rate as f64
        }
    }

    /// Whether the stream declares its total sample count.
    pub fn has_total_samples(&self) -> bool {
        self.total_samples != 0
    }
}
