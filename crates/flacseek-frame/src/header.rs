//! Frame header parsing.
//!
//! Header layout:
//! - 14: sync code `0b11111111111110`, 1: reserved, 1: blocking strategy
//! - 4: block size code, 4: sample rate code
//! - 4: channel assignment, 3: sample size code, 1: reserved
//! - UTF-8 coded frame number (fixed) or first sample number (variable)
//! - optional 8/16-bit block size, optional 8/16-bit sample rate
//! - 8: CRC-8 of everything above

use std::io::{self, Read, Write};

use crate::crc::{crc16, crc8, CrcReader};
use crate::{Error, Result};

/// Stream-wide defaults for header fields coded as "see STREAMINFO".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamParams {
    pub sample_rate: u32,
    pub bits_per_sample: u8,
}

/// How block sizes vary across the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockingStrategy {
    /// Constant block size; headers carry a frame number.
    Fixed,
    /// Variable block size; headers carry the first sample number.
    Variable,
}

/// Channel layout and stereo decorrelation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelAssignment {
    /// 1-8 independently coded channels.
    Independent(u8),
    LeftSide,
    SideRight,
    MidSide,
}

impl ChannelAssignment {
    /// Number of channels.
    pub fn channels(self) -> u8 {
        match self {
            Self::Independent(n) => n,
            _ => 2,
        }
    }

    /// Index of the side channel, which is coded with one extra bit.
    pub fn side_channel(self) -> Option<usize> {
        match self {
            Self::Independent(_) => None,
            Self::LeftSide | Self::MidSide => Some(1),
            Self::SideRight => Some(0),
        }
    }

    fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0..=7 => Self::Independent(code + 1),
            8 => Self::LeftSide,
            9 => Self::SideRight,
            10 => Self::MidSide,
            _ => return Err(Error::Reserved("channel assignment")),
        })
    }

    fn code(self) -> Result<u8> {
        Ok(match self {
            Self::Independent(n @ 1..=8) => n - 1,
            Self::Independent(n) => {
                return Err(Error::unsupported(format!("{} independent channels", n)))
            }
            Self::LeftSide => 8,
            Self::SideRight => 9,
            Self::MidSide => 10,
        })
    }
}

/// Parsed frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameHeader {
    pub blocking_strategy: BlockingStrategy,
    /// Frame number (fixed blocking) or first sample number (variable).
    pub number: u64,
    /// Samples per channel in this frame.
    pub block_size: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    pub channels: ChannelAssignment,
    pub bits_per_sample: u8,
    /// CRC-16 over the header bytes, continued by the body.
    #[cfg_attr(feature = "serialize", serde(skip))]
    pub(crate) crc16: u16,
}

impl FrameHeader {
    /// Create a header for encoding.
    pub fn new(
        blocking_strategy: BlockingStrategy,
        number: u64,
        block_size: u16,
        sample_rate: u32,
        channels: ChannelAssignment,
        bits_per_sample: u8,
    ) -> Self {
        Self {
            blocking_strategy,
            number,
            block_size,
            sample_rate,
            channels,
            bits_per_sample,
            crc16: 0,
        }
    }

    /// Read a frame header.
    ///
    /// Returns `Ok(None)` when the reader is exhausted before the first
    /// header byte: the graceful end of the frame sequence.
    pub fn read<R: Read>(reader: &mut R, params: &StreamParams) -> Result<Option<Self>> {
        let mut reader = CrcReader::new(reader);

        let mut first = [0u8; 1];
        loop {
            match reader.read(&mut first) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let mut fixed = [0u8; 3];
        reader.read_exact(&mut fixed)?;

        let sync = u16::from_be_bytes([first[0], fixed[0]]);
        if sync & 0xFFFC != 0xFFF8 {
            return Err(Error::InvalidSync(sync >> 2));
        }
        if sync & 0x02 != 0 {
            return Err(Error::Reserved("frame header bit after sync code"));
        }
        let blocking_strategy = if sync & 0x01 == 0 {
            BlockingStrategy::Fixed
        } else {
            BlockingStrategy::Variable
        };

        let block_code = fixed[1] >> 4;
        let rate_code = fixed[1] & 0x0F;
        let channels = ChannelAssignment::from_code(fixed[2] >> 4)?;
        let size_code = (fixed[2] >> 1) & 0x07;
        if fixed[2] & 0x01 != 0 {
            return Err(Error::Reserved("frame header bit after sample size"));
        }

        let number = read_utf8_number(&mut reader)?;

        let block_size = match block_code {
            0 => return Err(Error::Reserved("block size code 0")),
            1 => 192,
            2..=5 => 576 << (block_code - 2),
            6 => u16::from(read_u8(&mut reader)?) + 1,
            7 => {
                let raw = read_u16(&mut reader)?;
                if raw == u16::MAX {
                    return Err(Error::Reserved("block size 65536"));
                }
                raw + 1
            }
            _ => 256 << (block_code - 8),
        };

        let sample_rate = match rate_code {
            0 => params.sample_rate,
            1 => 88_200,
            2 => 176_400,
            3 => 192_000,
            4 => 8_000,
            5 => 16_000,
            6 => 22_050,
            7 => 24_000,
            8 => 32_000,
            9 => 44_100,
            10 => 48_000,
            11 => 96_000,
            12 => u32::from(read_u8(&mut reader)?) * 1000,
            13 => u32::from(read_u16(&mut reader)?),
            14 => u32::from(read_u16(&mut reader)?) * 10,
            _ => return Err(Error::Reserved("sample rate code 15")),
        };

        let bits_per_sample = match size_code {
            0 if params.bits_per_sample == 0 => {
                return Err(Error::unsupported(
                    "sample size deferred to STREAMINFO, which is unknown",
                ))
            }
            0 => params.bits_per_sample,
            1 => 8,
            2 => 12,
            3 => return Err(Error::Reserved("sample size code 3")),
            4 => 16,
            5 => 20,
            6 => 24,
            _ => 32,
        };

        let computed = reader.crc8();
        let stored = read_u8(&mut reader)?;
        if computed != stored {
            return Err(Error::HeaderCrcMismatch { computed, stored });
        }

        Ok(Some(Self {
            blocking_strategy,
            number,
            block_size,
            sample_rate,
            channels,
            bits_per_sample,
            crc16: reader.crc16(),
        }))
    }

    /// Encode the header, including its CRC-8.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(16);
        let strategy_bit = match self.blocking_strategy {
            BlockingStrategy::Fixed => 0,
            BlockingStrategy::Variable => 1,
        };
        out.extend_from_slice(&[0xFF, 0xF8 | strategy_bit]);

        let (block_code, block_tail) = block_size_code(self.block_size)?;
        let (rate_code, rate_tail) = sample_rate_code(self.sample_rate);
        let size_code = sample_size_code(self.bits_per_sample);
        out.push(block_code << 4 | rate_code);
        out.push(self.channels.code()? << 4 | size_code << 1);

        write_utf8_number(&mut out, self.number)?;
        out.extend_from_slice(&block_tail);
        out.extend_from_slice(&rate_tail);
        out.push(crc8(&out));
        Ok(out)
    }

    /// Write the encoded header, returning the CRC-16 of its bytes.
    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> Result<u16> {
        let bytes = self.encode()?;
        writer.write_all(&bytes)?;
        Ok(crc16(&bytes))
    }

    /// First sample number of this frame.
    ///
    /// Fixed-blocking headers carry a frame number, so the stream's nominal
    /// block size is needed to convert it.
    pub fn first_sample(&self, nominal_block_size: u16) -> u64 {
        match self.blocking_strategy {
            BlockingStrategy::Fixed => self.number * u64::from(nominal_block_size),
            BlockingStrategy::Variable => self.number,
        }
    }
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

/// Decode the extended UTF-8 number (up to 7 bytes, 36 bits).
fn read_utf8_number<R: Read>(reader: &mut R) -> Result<u64> {
    let first = read_u8(reader)?;
    let len = first.leading_ones();
    if len == 0 {
        return Ok(u64::from(first));
    }
    if len == 1 || len > 7 {
        return Err(Error::Reserved("UTF-8 coded number prefix"));
    }

    let mut value = u64::from(first & (0x7F >> len));
    for _ in 1..len {
        let byte = read_u8(reader)?;
        if byte & 0xC0 != 0x80 {
            return Err(Error::Reserved("UTF-8 coded number continuation byte"));
        }
        value = value << 6 | u64::from(byte & 0x3F);
    }
    Ok(value)
}

fn write_utf8_number(out: &mut Vec<u8>, value: u64) -> Result<()> {
    if value < 0x80 {
        out.push(value as u8);
        return Ok(());
    }
    if value >= 1 << 36 {
        return Err(Error::unsupported(format!("frame number {} exceeds 36 bits", value)));
    }

    // Payload bits available: 5 + 6 for two bytes, one less per prefix bit after.
    let len = (2..=7u32)
        .find(|&len| value < 1u64 << (6 * (len - 1) + (7 - len)))
        .unwrap_or(7);
    let prefix = !(0xFFu8 >> len);
    out.push(prefix | (value >> (6 * (len - 1))) as u8);
    for i in (0..len - 1).rev() {
        out.push(0x80 | ((value >> (6 * i)) & 0x3F) as u8);
    }
    Ok(())
}

fn block_size_code(block_size: u16) -> Result<(u8, Vec<u8>)> {
    let code = match block_size {
        0 => return Err(Error::unsupported("block size 0")),
        192 => 1,
        576 => 2,
        1152 => 3,
        2304 => 4,
        4608 => 5,
        256 => 8,
        512 => 9,
        1024 => 10,
        2048 => 11,
        4096 => 12,
        8192 => 13,
        16384 => 14,
        32768 => 15,
        n if n <= 256 => return Ok((6, vec![(n - 1) as u8])),
        n => return Ok((7, (n - 1).to_be_bytes().to_vec())),
    };
    Ok((code, Vec::new()))
}

fn sample_rate_code(sample_rate: u32) -> (u8, Vec<u8>) {
    let code = match sample_rate {
        88_200 => 1,
        176_400 => 2,
        192_000 => 3,
        8_000 => 4,
        16_000 => 5,
        22_050 => 6,
        24_000 => 7,
        32_000 => 8,
        44_100 => 9,
        48_000 => 10,
        96_000 => 11,
        r if r % 1000 == 0 && r / 1000 <= 0xFF => return (12, vec![(r / 1000) as u8]),
        r if r <= 0xFFFF => return (13, (r as u16).to_be_bytes().to_vec()),
        r if r % 10 == 0 && r / 10 <= 0xFFFF => {
            return (14, ((r / 10) as u16).to_be_bytes().to_vec())
        }
        _ => 0,
    };
    (code, Vec::new())
}

fn sample_size_code(bits_per_sample: u8) -> u8 {
    match bits_per_sample {
        8 => 1,
        12 => 2,
        16 => 4,
        20 => 5,
        24 => 6,
        32 => 7,
        _ => 0,
    }
}
