//! Frame encoding.
//!
//! Subframes are written constant when every sample is equal and verbatim
//! otherwise. No prediction is attempted, so output is valid FLAC but not
//! compressed.

use std::io::Write;

use bitstream_io::{BigEndian, BitWrite, BitWriter};

use crate::crc::crc16;
use crate::header::{ChannelAssignment, FrameHeader};
use crate::{Error, Frame, Result};

/// Encode one frame from per-channel samples.
///
/// `channels` holds plain (left/right) samples; stereo decorrelation named
/// by the header's channel assignment is applied here.
pub fn encode_frame(header: &FrameHeader, channels: &[Vec<i32>]) -> Result<Vec<u8>> {
    let expected = header.channels.channels() as usize;
    if channels.len() != expected {
        return Err(Error::invalid_subframe(format!(
            "{} channels given for a {}-channel frame",
            channels.len(),
            expected
        )));
    }
    if let Some(channel) = channels
        .iter()
        .find(|c| c.len() != header.block_size as usize)
    {
        return Err(Error::invalid_subframe(format!(
            "{} samples given for block size {}",
            channel.len(),
            header.block_size
        )));
    }

    let coded = correlate(header.channels, channels);
    let side = header.channels.side_channel();

    let mut out = header.encode()?;
    let mut bits = BitWriter::endian(Vec::new(), BigEndian);
    for (index, samples) in coded.iter().enumerate() {
        let mut bps = u32::from(header.bits_per_sample);
        if side == Some(index) {
            bps += 1;
        }
        write_subframe(&mut bits, samples, bps)?;
    }
    bits.byte_align()?;
    out.extend(bits.into_writer());

    let crc = crc16(&out);
    out.extend_from_slice(&crc.to_be_bytes());
    Ok(out)
}

impl Frame {
    /// Encode this frame, returning the number of bytes written.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let bytes = encode_frame(&self.header, &self.channels)?;
        writer.write_all(&bytes)?;
        Ok(bytes.len())
    }
}

fn correlate(assignment: ChannelAssignment, channels: &[Vec<i32>]) -> Vec<Vec<i64>> {
    let widen = |c: &Vec<i32>| c.iter().map(|&s| i64::from(s)).collect::<Vec<_>>();
    if channels.len() != 2 {
        return channels.iter().map(widen).collect();
    }

    let left = widen(&channels[0]);
    let right = widen(&channels[1]);
    let side: Vec<i64> = left.iter().zip(&right).map(|(l, r)| l - r).collect();
    match assignment {
        ChannelAssignment::Independent(_) => vec![left, right],
        ChannelAssignment::LeftSide => vec![left, side],
        ChannelAssignment::SideRight => vec![side, right],
        ChannelAssignment::MidSide => {
            let mid = left.iter().zip(&right).map(|(l, r)| (l + r) >> 1).collect();
            vec![mid, side]
        }
    }
}

fn write_subframe<W: BitWrite>(bits: &mut W, samples: &[i64], bps: u32) -> Result<()> {
    if !(1..=33).contains(&bps) {
        return Err(Error::unsupported(format!("{} bits per sample", bps)));
    }
    let min = -(1i64 << (bps - 1));
    let max = (1i64 << (bps - 1)) - 1;
    if let Some(s) = samples.iter().find(|&&s| s < min || s > max) {
        return Err(Error::unsupported(format!(
            "sample {} does not fit in {} bits",
            s, bps
        )));
    }

    let mask = (1u64 << bps) - 1;
    let constant = samples.windows(2).all(|w| w[0] == w[1]);

    bits.write_bit(false)?;
    if constant {
        bits.write(6, 0u8)?;
        bits.write_bit(false)?;
        bits.write(bps, samples.first().copied().unwrap_or(0) as u64 & mask)?;
    } else {
        bits.write(6, 1u8)?;
        bits.write_bit(false)?;
        for &s in samples {
            bits.write(bps, s as u64 & mask)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{BlockingStrategy, StreamParams};
    use std::io::Cursor;

    fn mono(block_size: u16, bps: u8) -> FrameHeader {
        FrameHeader::new(
            BlockingStrategy::Fixed,
            0,
            block_size,
            48_000,
            ChannelAssignment::Independent(1),
            bps,
        )
    }

    #[test]
    fn test_constant_frame_size() {
        let bytes = encode_frame(&mono(4096, 16), &[vec![0; 4096]]).unwrap();
        // header, subframe header, one sample, crc
        assert_eq!(bytes.len(), 6 + 1 + 2 + 2);
    }

    #[test]
    fn test_verbatim_frame_size() {
        let samples: Vec<i32> = (0..192).collect();
        let bytes = encode_frame(&mono(192, 8), &[samples]).unwrap();
        assert_eq!(bytes.len(), 6 + 1 + 192 + 2);
    }

    #[test]
    fn test_odd_bit_depth_round_trip() {
        let samples = vec![-2048, 2047, 0, 5, -7];
        let frame = Frame {
            header: mono(5, 12),
            channels: vec![samples.clone()],
        };
        let mut out = Vec::new();
        let written = frame.write(&mut out).unwrap();
        assert_eq!(written, out.len());

        let params = StreamParams {
            sample_rate: 48_000,
            bits_per_sample: 12,
        };
        let decoded = Frame::read(&mut Cursor::new(&out), &params)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.channels, vec![samples]);
    }

    #[test]
    fn test_sample_out_of_range() {
        let err = encode_frame(&mono(2, 8), &[vec![0, 128]]).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_channel_count_mismatch() {
        let err = encode_frame(&mono(2, 8), &[vec![0, 1], vec![0, 1]]).unwrap_err();
        assert!(matches!(err, Error::InvalidSubframe(_)));
    }

    #[test]
    fn test_block_size_mismatch() {
        let err = encode_frame(&mono(4, 8), &[vec![0, 1]]).unwrap_err();
        assert!(matches!(err, Error::InvalidSubframe(_)));
    }
}
