//! Frame decoding.

use std::io::Read;

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::crc::CrcReader;
use crate::header::{ChannelAssignment, FrameHeader, StreamParams};
use crate::subframe::read_subframe;
use crate::{Error, Result};

/// A decoded audio frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    pub header: FrameHeader,
    /// Decoded samples, one vector per channel.
    pub channels: Vec<Vec<i32>>,
}

impl Frame {
    /// Read the next frame.
    ///
    /// Returns `Ok(None)` when the reader is exhausted at a frame boundary.
    pub fn read<R: Read>(reader: &mut R, params: &StreamParams) -> Result<Option<Self>> {
        match FrameHeader::read(reader, params)? {
            Some(header) => Self::read_body(reader, header).map(Some),
            None => Ok(None),
        }
    }

    /// Read the subframes and footer following an already parsed header.
    pub fn read_body<R: Read>(reader: &mut R, header: FrameHeader) -> Result<Self> {
        let mut crc = CrcReader::resume(reader, header.crc16);
        let block_size = header.block_size as usize;
        let side = header.channels.side_channel();

        let mut coded = Vec::with_capacity(header.channels.channels() as usize);
        {
            let mut bits = BitReader::endian(&mut crc, BigEndian);
            for channel in 0..header.channels.channels() as usize {
                let mut bps = u32::from(header.bits_per_sample);
                if side == Some(channel) {
                    bps += 1;
                }
                coded.push(read_subframe(&mut bits, block_size, bps)?);
            }
            bits.byte_align();
        }

        let computed = crc.crc16();
        let mut footer = [0u8; 2];
        crc.read_exact(&mut footer)?;
        let stored = u16::from_be_bytes(footer);
        if computed != stored {
            return Err(Error::FrameCrcMismatch { computed, stored });
        }

        let channels = decorrelate(header.channels, coded);
        Ok(Self { header, channels })
    }

    /// Samples per channel.
    pub fn block_size(&self) -> usize {
        self.header.block_size as usize
    }

    /// Samples interleaved across channels.
    pub fn interleaved(&self) -> Vec<i32> {
        let mut out = Vec::with_capacity(self.block_size() * self.channels.len());
        for i in 0..self.block_size() {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }
}

fn decorrelate(assignment: ChannelAssignment, mut coded: Vec<Vec<i64>>) -> Vec<Vec<i32>> {
    if coded.len() == 2 {
        let (first, second) = coded.split_at_mut(1);
        let (a, b) = (&mut first[0], &mut second[0]);
        match assignment {
            ChannelAssignment::Independent(_) => {}
            ChannelAssignment::LeftSide => {
                for (left, side) in a.iter().zip(b.iter_mut()) {
                    *side = left.wrapping_sub(*side);
                }
            }
            ChannelAssignment::SideRight => {
                for (side, right) in a.iter_mut().zip(b.iter()) {
                    *side = side.wrapping_add(*right);
                }
            }
            ChannelAssignment::MidSide => {
                for (mid, side) in a.iter_mut().zip(b.iter_mut()) {
                    let m = (*mid << 1) | (*side & 1);
                    let s = *side;
                    *mid = m.wrapping_add(s) >> 1;
                    *side = m.wrapping_sub(s) >> 1;
                }
            }
        }
    }

    coded
        .into_iter()
        .map(|channel| channel.into_iter().map(|s| s as i32).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::BlockingStrategy;
    use crate::writer::encode_frame;
    use std::io::Cursor;

    const PARAMS: StreamParams = StreamParams {
        sample_rate: 44_100,
        bits_per_sample: 16,
    };

    fn header(channels: ChannelAssignment, block_size: u16) -> FrameHeader {
        FrameHeader::new(BlockingStrategy::Fixed, 0, block_size, 44_100, channels, 16)
    }

    #[test]
    fn test_decorrelation_modes() {
        let left = vec![3, -1, 100, -32768];
        let right = vec![0, 2, -100, 32767];
        for mode in [
            ChannelAssignment::Independent(2),
            ChannelAssignment::LeftSide,
            ChannelAssignment::SideRight,
            ChannelAssignment::MidSide,
        ] {
            let channels = vec![left.clone(), right.clone()];
            let bytes = encode_frame(&header(mode, 4), &channels).unwrap();
            let frame = Frame::read(&mut Cursor::new(&bytes), &PARAMS)
                .unwrap()
                .unwrap();
            assert_eq!(frame.channels, channels, "mode {:?}", mode);
            assert_eq!(frame.header.channels, mode);
        }
    }

    #[test]
    fn test_decorrelation_wraps_on_corrupt_input() {
        for mode in [
            ChannelAssignment::LeftSide,
            ChannelAssignment::SideRight,
            ChannelAssignment::MidSide,
        ] {
            let coded = vec![vec![i64::MAX, i64::MIN], vec![i64::MIN, i64::MAX]];
            let channels = decorrelate(mode, coded);
            assert_eq!(channels.len(), 2, "mode {:?}", mode);
            assert_eq!(channels[1].len(), 2);
        }
    }

    #[test]
    fn test_interleaved() {
        let channels = vec![vec![1, 2, 3], vec![-1, -2, -3]];
        let bytes = encode_frame(&header(ChannelAssignment::Independent(2), 3), &channels).unwrap();
        let frame = Frame::read(&mut Cursor::new(&bytes), &PARAMS)
            .unwrap()
            .unwrap();
        assert_eq!(frame.interleaved(), vec![1, -1, 2, -2, 3, -3]);
        assert_eq!(frame.block_size(), 3);
    }

    #[test]
    fn test_consumes_exactly_one_frame() {
        let channels = vec![vec![7; 16]];
        let h = header(ChannelAssignment::Independent(1), 16);
        let mut bytes = encode_frame(&h, &channels).unwrap();
        let first_len = bytes.len() as u64;
        bytes.extend(encode_frame(&h, &channels).unwrap());

        let mut cursor = Cursor::new(&bytes);
        Frame::read(&mut cursor, &PARAMS).unwrap().unwrap();
        assert_eq!(cursor.position(), first_len);
        Frame::read(&mut cursor, &PARAMS).unwrap().unwrap();
        assert!(Frame::read(&mut cursor, &PARAMS).unwrap().is_none());
    }

    #[test]
    fn test_frame_crc_mismatch() {
        let channels = vec![vec![1, 5, 9, 2]];
        let mut bytes =
            encode_frame(&header(ChannelAssignment::Independent(1), 4), &channels).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let err = Frame::read(&mut Cursor::new(&bytes), &PARAMS).unwrap_err();
        assert!(matches!(err, Error::FrameCrcMismatch { .. }));
    }

    #[test]
    fn test_truncated_body() {
        let channels = vec![vec![1, 5, 9, 2]];
        let bytes =
            encode_frame(&header(ChannelAssignment::Independent(1), 4), &channels).unwrap();
        let err = Frame::read(&mut Cursor::new(&bytes[..bytes.len() - 3]), &PARAMS).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
