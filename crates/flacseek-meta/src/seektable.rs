//! SEEKTABLE block.

use std::io::Write;

use crate::cursor::ByteCursor;
use crate::{BlockType, Error, Result};

/// A seek point: where the frame containing a given sample starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SeekPoint {
    /// Sample number of the first sample in the target frame.
    pub sample_number: u64,
    /// Byte offset of the target frame header, relative to the first frame header.
    pub offset: u64,
    /// Number of samples in the target frame.
    pub frame_samples: u16,
}

impl SeekPoint {
    /// Encoded size of a seek point.
    pub const SIZE: u32 = 18;

    /// Sample number marking a placeholder point.
    pub const PLACEHOLDER_SAMPLE: u64 = u64::MAX;

    /// Create a seek point.
    pub fn new(sample_number: u64, offset: u64, frame_samples: u16) -> Self {
        Self {
            sample_number,
            offset,
            frame_samples,
        }
    }

    /// A placeholder point, reserved for later use by an encoder.
    pub fn placeholder() -> Self {
        Self::new(Self::PLACEHOLDER_SAMPLE, 0, 0)
    }

    /// Whether this is a placeholder point.
    pub fn is_placeholder(&self) -> bool {
        self.sample_number == Self::PLACEHOLDER_SAMPLE
    }
}

/// Seek table embedded in the stream's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SeekTable {
    /// Seek points in ascending sample order; placeholders trail.
    pub points: Vec<SeekPoint>,
}

impl SeekTable {
    /// Decode a SEEKTABLE body. Point count is implied by the length.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() as u32 % SeekPoint::SIZE != 0 {
            return Err(Error::InvalidSeekTable(data.len() as u32));
        }

        let count = data.len() / SeekPoint::SIZE as usize;
        let mut cursor = ByteCursor::new(data, BlockType::SeekTable);
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            let sample_number = cursor.u64_be()?;
            let offset = cursor.u64_be()?;
            let frame_samples = u16::from_be_bytes(cursor.array()?);
            points.push(SeekPoint {
                sample_number,
                offset,
                frame_samples,
            });
        }
        cursor.finish()?;

        Ok(Self { points })
    }

    /// Write the SEEKTABLE body.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        for point in &self.points {
            writer.write_all(&point.sample_number.to_be_bytes())?;
            writer.write_all(&point.offset.to_be_bytes())?;
            writer.write_all(&point.frame_samples.to_be_bytes())?;
        }
        Ok(())
    }

    /// Iterate over the points that are not placeholders.
    pub fn real_points(&self) -> impl Iterator<Item = &SeekPoint> {
        self.points.iter().filter(|p| !p.is_placeholder())
    }
}
