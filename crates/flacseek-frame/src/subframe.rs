//! Subframe decoding.
//!
//! Each channel of a frame is one subframe:
//! - 1: zero padding, 6: type, 1: wasted-bits flag (+ unary count)
//! - type `000000` constant, `000001` verbatim,
//!   `001xxx` fixed predictor of order `xxx` (0-4),
//!   `1xxxxx` LPC of order `xxxxx + 1`
//!
//! Predicted subframes carry warm-up samples followed by a Rice-coded
//! residual.

use bitstream_io::BitRead;

use crate::{Error, Result};

/// Subframe coding, as read from the subframe header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum SubframeKind {
    Constant,
    Verbatim,
    Fixed(u8),
    Lpc(u8),
}

impl SubframeKind {
    fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => Self::Constant,
            1 => Self::Verbatim,
            8..=12 => Self::Fixed(code & 0x07),
            32..=63 => Self::Lpc((code & 0x1F) + 1),
            _ => return Err(Error::Reserved("subframe type")),
        })
    }

    /// Predictor order (number of warm-up samples).
    pub fn order(self) -> usize {
        match self {
            Self::Constant | Self::Verbatim => 0,
            Self::Fixed(order) | Self::Lpc(order) => order as usize,
        }
    }
}

/// Read `bits` bits as an unsigned value; zero bits read nothing.
fn read_bits<R: BitRead>(reader: &mut R, bits: u32) -> Result<u64> {
    if bits == 0 {
        return Ok(0);
    }
    Ok(reader.read::<u64>(bits)?)
}

/// Read a two's complement value of `bits` bits (at most 64).
fn read_signed_bits<R: BitRead>(reader: &mut R, bits: u32) -> Result<i64> {
    if bits == 0 {
        return Ok(0);
    }
    let raw = reader.read::<u64>(bits)?;
    let shift = 64 - bits;
    Ok(((raw << shift) as i64) >> shift)
}

/// Decode one subframe of `block_size` samples at `bits_per_sample`.
///
/// Returned samples are still in the coded domain: for a side channel they
/// are differences, undone by the frame's channel decorrelation.
pub fn read_subframe<R: BitRead>(
    reader: &mut R,
    block_size: usize,
    bits_per_sample: u32,
) -> Result<Vec<i64>> {
    if reader.read_bit()? {
        return Err(Error::invalid_subframe("non-zero padding bit"));
    }
    let kind = SubframeKind::from_code(reader.read::<u8>(6)?)?;

    let wasted = if reader.read_bit()? {
        reader.read_unary1()? + 1
    } else {
        0
    };
    if wasted >= bits_per_sample {
        return Err(Error::invalid_subframe(format!(
            "{} wasted bits of {} bits per sample",
            wasted, bits_per_sample
        )));
    }
    let bps = bits_per_sample - wasted;

    if kind.order() > block_size {
        return Err(Error::invalid_subframe(format!(
            "predictor order {} exceeds block size {}",
            kind.order(),
            block_size
        )));
    }

    let mut samples = match kind {
        SubframeKind::Constant => vec![read_signed_bits(reader, bps)?; block_size],
        SubframeKind::Verbatim => (0..block_size)
            .map(|_| read_signed_bits(reader, bps))
            .collect::<Result<Vec<_>>>()?,
        SubframeKind::Fixed(order) => {
            let mut samples = read_warm_up(reader, order as usize, bps, block_size)?;
            read_residual(reader, order as usize, block_size, &mut samples)?;
            restore_fixed(order, &mut samples);
            samples
        }
        SubframeKind::Lpc(order) => {
            let order = order as usize;
            let mut samples = read_warm_up(reader, order, bps, block_size)?;

            let precision = reader.read::<u32>(4)?;
            if precision == 0x0F {
                return Err(Error::invalid_subframe("LPC precision 15 is reserved"));
            }
            let precision = precision + 1;
            let shift = read_signed_bits(reader, 5)?;
            if shift < 0 {
                return Err(Error::invalid_subframe(format!(
                    "negative LPC shift {}",
                    shift
                )));
            }
            let coefficients = (0..order)
                .map(|_| read_signed_bits(reader, precision))
                .collect::<Result<Vec<_>>>()?;

            read_residual(reader, order, block_size, &mut samples)?;
            restore_lpc(&coefficients, shift as u32, &mut samples);
            samples
        }
    };

    if wasted > 0 {
        for sample in &mut samples {
            *sample <<= wasted;
        }
    }
    Ok(samples)
}

fn read_warm_up<R: BitRead>(
    reader: &mut R,
    order: usize,
    bps: u32,
    block_size: usize,
) -> Result<Vec<i64>> {
    let mut samples = Vec::with_capacity(block_size);
    for _ in 0..order {
        samples.push(read_signed_bits(reader, bps)?);
    }
    Ok(samples)
}

/// Read the partitioned Rice residual, appending to `out`.
fn read_residual<R: BitRead>(
    reader: &mut R,
    predictor_order: usize,
    block_size: usize,
    out: &mut Vec<i64>,
) -> Result<()> {
    let (param_bits, escape) = match reader.read::<u8>(2)? {
        0 => (4, 0x0F),
        1 => (5, 0x1F),
        _ => return Err(Error::Reserved("residual coding method")),
    };

    let partition_order = reader.read::<u32>(4)?;
    let partitions = 1usize << partition_order;
    if block_size % partitions != 0 {
        return Err(Error::invalid_residual(format!(
            "block size {} not divisible into {} partitions",
            block_size, partitions
        )));
    }
    let partition_len = block_size / partitions;
    if partition_len < predictor_order {
        return Err(Error::invalid_residual(format!(
            "partition length {} shorter than predictor order {}",
            partition_len, predictor_order
        )));
    }

    for partition in 0..partitions {
        let count = if partition == 0 {
            partition_len - predictor_order
        } else {
            partition_len
        };

        let param = reader.read::<u32>(param_bits)?;
        if param == escape {
            let bits = reader.read::<u32>(5)?;
            for _ in 0..count {
                out.push(read_signed_bits(reader, bits)?);
            }
        } else {
            for _ in 0..count {
                let quotient = u64::from(reader.read_unary1()?);
                let remainder = read_bits(reader, param)?;
                let folded = quotient << param | remainder;
                out.push((folded >> 1) as i64 ^ -((folded & 1) as i64));
            }
        }
    }
    Ok(())
}

fn restore_fixed(order: u8, samples: &mut [i64]) {
    let order = order as usize;
    for i in order..samples.len() {
        let prediction = match order {
            0 => 0,
            1 => samples[i - 1],
            2 => samples[i - 1].wrapping_mul(2).wrapping_sub(samples[i - 2]),
            3 => samples[i - 1]
                .wrapping_mul(3)
                .wrapping_sub(samples[i - 2].wrapping_mul(3))
                .wrapping_add(samples[i - 3]),
            _ => samples[i - 1]
                .wrapping_mul(4)
                .wrapping_sub(samples[i - 2].wrapping_mul(6))
                .wrapping_add(samples[i - 3].wrapping_mul(4))
                .wrapping_sub(samples[i - 4]),
        };
        samples[i] = samples[i].wrapping_add(prediction);
    }
}

fn restore_lpc(coefficients: &[i64], shift: u32, samples: &mut [i64]) {
    let order = coefficients.len();
    for i in order..samples.len() {
        let sum = coefficients
            .iter()
            .zip(samples[i - order..i].iter().rev())
            .fold(0i64, |acc, (&c, &s)| acc.wrapping_add(c.wrapping_mul(s)));
        samples[i] = samples[i].wrapping_add(sum >> shift);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream_io::{BigEndian, BitReader, BitWrite, BitWriter};

    fn bits(build: impl FnOnce(&mut BitWriter<Vec<u8>, BigEndian>)) -> Vec<u8> {
        let mut w = BitWriter::endian(Vec::new(), BigEndian);
        build(&mut w);
        w.byte_align().unwrap();
        w.into_writer()
    }

    fn decode(data: &[u8], block_size: usize, bps: u32) -> Result<Vec<i64>> {
        let mut r = BitReader::endian(data, BigEndian);
        read_subframe(&mut r, block_size, bps)
    }

    /// Append Rice-coded values with parameter `k`.
    fn rice(w: &mut BitWriter<Vec<u8>, BigEndian>, k: u32, values: &[i64]) {
        for &v in values {
            let folded = if v < 0 { (-v as u64) * 2 - 1 } else { v as u64 * 2 };
            let q = folded >> k;
            for _ in 0..q {
                w.write_bit(false).unwrap();
            }
            w.write_bit(true).unwrap();
            if k > 0 {
                w.write(k, folded & ((1 << k) - 1)).unwrap();
            }
        }
    }

    #[test]
    fn test_constant() {
        let data = bits(|w| {
            w.write(8, 0u8).unwrap(); // pad, type 0, no wasted bits
            w.write(16, 0xFFFEu16).unwrap(); // -2
        });
        assert_eq!(decode(&data, 5, 16).unwrap(), vec![-2; 5]);
    }

    #[test]
    fn test_verbatim_with_wasted_bits() {
        let data = bits(|w| {
            w.write(1, 0u8).unwrap();
            w.write(6, 1u8).unwrap();
            w.write_bit(true).unwrap();
            w.write(2, 0b01u8).unwrap(); // unary: one extra zero, two wasted bits
            for v in [1u8, 0x3F, 0x20] {
                w.write(6, v).unwrap();
            }
        });
        assert_eq!(decode(&data, 3, 8).unwrap(), vec![4, -4, -128]);
    }

    #[test]
    fn test_fixed_order_one() {
        let data = bits(|w| {
            w.write(1, 0u8).unwrap();
            w.write(6, 0b001001u8).unwrap();
            w.write_bit(false).unwrap();
            w.write(16, 10u16).unwrap(); // warm-up
            w.write(2, 0u8).unwrap(); // 4-bit Rice parameters
            w.write(4, 0u8).unwrap(); // one partition
            w.write(4, 1u8).unwrap();
            rice(w, 1, &[1, -1, 2]);
        });
        assert_eq!(decode(&data, 4, 16).unwrap(), vec![10, 11, 10, 12]);
    }

    #[test]
    fn test_fixed_order_two_partitions() {
        // Two partitions of 2: the first carries 1 residual after warm-up.
        let data = bits(|w| {
            w.write(1, 0u8).unwrap();
            w.write(6, 0b001010u8).unwrap();
            w.write_bit(false).unwrap();
            w.write(8, 1u8).unwrap();
            w.write(8, 3u8).unwrap();
            w.write(2, 1u8).unwrap(); // 5-bit Rice parameters
            w.write(4, 1u8).unwrap();
            w.write(5, 0u8).unwrap();
            rice(w, 0, &[]);
            w.write(5, 0x1Fu8).unwrap(); // escaped partition
            w.write(5, 4u8).unwrap();
            w.write(4, 0b1111u8).unwrap(); // -1
            w.write(4, 0b0001u8).unwrap(); // 1
        });
        let samples = decode(&data, 4, 8).unwrap();
        // s2 = 2*3 - 1 + (-1) = 4, s3 = 2*4 - 3 + 1 = 6
        assert_eq!(samples, vec![1, 3, 4, 6]);
    }

    #[test]
    fn test_fixed_order_four_overflow_wraps() {
        // Escaped 31-bit residuals at their maximum drive the order-4
        // predictor far past the i64 range.
        let data = bits(|w| {
            w.write(1, 0u8).unwrap();
            w.write(6, 0b001100u8).unwrap();
            w.write_bit(false).unwrap();
            for _ in 0..4 {
                w.write(16, 0u16).unwrap();
            }
            w.write(2, 1u8).unwrap();
            w.write(4, 0u8).unwrap();
            w.write(5, 0x1Fu8).unwrap();
            w.write(5, 31u8).unwrap();
            for _ in 0..4092 {
                w.write(31, 0x3FFF_FFFFu32).unwrap();
            }
        });
        let samples = decode(&data, 4096, 16).unwrap();
        assert_eq!(samples.len(), 4096);
        assert_eq!(samples[4], 0x3FFF_FFFF);
    }

    #[test]
    fn test_lpc() {
        // Order-2 LPC with coefficients [2, -1] and shift 0 behaves like fixed order 2.
        let data = bits(|w| {
            w.write(1, 0u8).unwrap();
            w.write(6, 0b100001u8).unwrap();
            w.write_bit(false).unwrap();
            w.write(16, 100u16).unwrap();
            w.write(16, 110u16).unwrap();
            w.write(4, 3u8).unwrap(); // precision 4
            w.write(5, 0u8).unwrap(); // shift 0
            w.write(4, 0b0010u8).unwrap();
            w.write(4, 0b1111u8).unwrap();
            w.write(2, 0u8).unwrap();
            w.write(4, 0u8).unwrap();
            w.write(4, 2u8).unwrap();
            rice(w, 2, &[0, -5, 3]);
        });
        // 120, 130 - 5 = 125, 2*125 - 120 + 3 = 133
        assert_eq!(decode(&data, 5, 16).unwrap(), vec![100, 110, 120, 125, 133]);
    }

    #[test]
    fn test_lpc_reserved_precision() {
        let data = bits(|w| {
            w.write(1, 0u8).unwrap();
            w.write(6, 0b100000u8).unwrap();
            w.write_bit(false).unwrap();
            w.write(16, 0u16).unwrap();
            w.write(4, 0x0Fu8).unwrap();
            w.write(16, 0u16).unwrap();
        });
        assert!(matches!(decode(&data, 4, 16), Err(Error::InvalidSubframe(_))));
    }

    #[test]
    fn test_lpc_negative_shift() {
        let data = bits(|w| {
            w.write(1, 0u8).unwrap();
            w.write(6, 0b100000u8).unwrap();
            w.write_bit(false).unwrap();
            w.write(16, 0u16).unwrap();
            w.write(4, 3u8).unwrap();
            w.write(5, 0b10000u8).unwrap();
            w.write(16, 0u16).unwrap();
        });
        assert!(matches!(decode(&data, 4, 16), Err(Error::InvalidSubframe(_))));
    }

    #[test]
    fn test_reserved_type() {
        let data = bits(|w| {
            w.write(1, 0u8).unwrap();
            w.write(6, 0b000010u8).unwrap();
            w.write(9, 0u16).unwrap();
        });
        assert!(matches!(decode(&data, 4, 16), Err(Error::Reserved(_))));
    }

    #[test]
    fn test_partitions_must_divide_block() {
        let data = bits(|w| {
            w.write(1, 0u8).unwrap();
            w.write(6, 0b001000u8).unwrap();
            w.write_bit(false).unwrap();
            w.write(2, 0u8).unwrap();
            w.write(4, 2u8).unwrap(); // 4 partitions of a 6-sample block
            w.write(16, 0u16).unwrap();
        });
        assert!(matches!(decode(&data, 6, 16), Err(Error::InvalidResidual(_))));
    }

    #[test]
    fn test_truncated_subframe() {
        let data = bits(|w| {
            w.write(8, 0b0000_0010u8).unwrap();
            w.write(8, 0u8).unwrap();
        });
        assert!(matches!(decode(&data, 4, 16), Err(Error::Io(_))));
    }
}
