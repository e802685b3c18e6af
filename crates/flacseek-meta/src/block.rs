//! Metadata block headers and bodies.
//!
//! Every metadata block starts with a 4-byte header:
//! - 1 bit: last-metadata-block flag
//! - 7 bits: block type
//! - 24 bits: body length in bytes (big-endian)

use std::fmt;
use std::io::{self, Read, Write};

use crate::cursor::ByteCursor;
use crate::{
    CueSheet, Error, Picture, Result, SeekTable, StreamInfo, VorbisComment,
};

/// Largest body a 24-bit length field can describe.
pub const MAX_BLOCK_LENGTH: u32 = (1 << 24) - 1;

/// Metadata block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockType {
    StreamInfo,
    Padding,
    Application,
    SeekTable,
    VorbisComment,
    CueSheet,
    Picture,
    /// Types 7..=126, reserved for future use.
    Reserved(u8),
}

impl BlockType {
    /// Decode a 7-bit block type. Type 127 is invalid.
    pub fn from_u8(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Self::StreamInfo,
            1 => Self::Padding,
            2 => Self::Application,
            3 => Self::SeekTable,
            4 => Self::VorbisComment,
            5 => Self::CueSheet,
            6 => Self::Picture,
            7..=126 => Self::Reserved(value),
            _ => return Err(Error::InvalidBlockType),
        })
    }

    /// The 7-bit type code.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::StreamInfo => 0,
            Self::Padding => 1,
            Self::Application => 2,
            Self::SeekTable => 3,
            Self::VorbisComment => 4,
            Self::CueSheet => 5,
            Self::Picture => 6,
            Self::Reserved(value) => value,
        }
    }

    /// Whether this type is one the format reserves for future use.
    pub fn is_reserved(self) -> bool {
        matches!(self, Self::Reserved(_))
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamInfo => write!(f, "STREAMINFO"),
            Self::Padding => write!(f, "PADDING"),
            Self::Application => write!(f, "APPLICATION"),
            Self::SeekTable => write!(f, "SEEKTABLE"),
            Self::VorbisComment => write!(f, "VORBIS_COMMENT"),
            Self::CueSheet => write!(f, "CUESHEET"),
            Self::Picture => write!(f, "PICTURE"),
            Self::Reserved(value) => write!(f, "RESERVED({})", value),
        }
    }
}

/// Metadata block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockHeader {
    /// Whether this is the last metadata block before the audio frames.
    pub is_last: bool,
    /// Block type.
    pub block_type: BlockType,
    /// Body length in bytes.
    pub length: u32,
}

impl BlockHeader {
    /// Size of an encoded header in bytes.
    pub const SIZE: u64 = 4;

    /// Read a block header.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;

        Ok(Self {
            is_last: buf[0] & 0x80 != 0,
            block_type: BlockType::from_u8(buf[0] & 0x7F)?,
            length: u32::from_be_bytes([0, buf[1], buf[2], buf[3]]),
        })
    }

    /// Write the header.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.length > MAX_BLOCK_LENGTH {
            return Err(Error::BlockTooLarge(self.length as usize));
        }
        let len = self.length.to_be_bytes();
        let flag = if self.is_last { 0x80 } else { 0 };
        writer.write_all(&[flag | self.block_type.as_u8(), len[1], len[2], len[3]])?;
        Ok(())
    }

    /// Discard the body that follows this header.
    pub fn skip_body<R: Read>(&self, reader: &mut R) -> Result<()> {
        let length = u64::from(self.length);
        let skipped = io::copy(&mut reader.by_ref().take(length), &mut io::sink())?;
        if skipped != length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} block truncated: {} of {} bytes", self.block_type, skipped, length),
            )
            .into());
        }
        Ok(())
    }

    /// Read the body that follows this header.
    pub fn read_body<R: Read>(&self, reader: &mut R) -> Result<BlockBody> {
        let mut data = vec![0u8; self.length as usize];
        reader.read_exact(&mut data)?;
        BlockBody::decode(self.block_type, data)
    }
}

/// Decoded metadata block body.
///
/// Reserved block types are not an error: their bytes are kept verbatim in
/// [`BlockBody::Unknown`] so the chain can be walked past them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockBody {
    StreamInfo(StreamInfo),
    /// Padding of the given length.
    Padding(u32),
    Application { id: u32, data: Vec<u8> },
    SeekTable(SeekTable),
    VorbisComment(VorbisComment),
    CueSheet(CueSheet),
    Picture(Picture),
    Unknown { block_type: u8, data: Vec<u8> },
}

impl BlockBody {
    /// Decode a body of the given type from its raw bytes.
    pub fn decode(block_type: BlockType, data: Vec<u8>) -> Result<Self> {
        Ok(match block_type {
            BlockType::StreamInfo => Self::StreamInfo(StreamInfo::decode(&data)?),
            BlockType::Padding => Self::Padding(data.len() as u32),
            BlockType::Application => {
                let mut cursor = ByteCursor::new(&data, block_type);
                let id = cursor.u32_be()?;
                Self::Application {
                    id,
                    data: cursor.rest().to_vec(),
                }
            }
            BlockType::SeekTable => Self::SeekTable(SeekTable::decode(&data)?),
            BlockType::VorbisComment => Self::VorbisComment(VorbisComment::decode(&data)?),
            BlockType::CueSheet => Self::CueSheet(CueSheet::decode(&data)?),
            BlockType::Picture => Self::Picture(Picture::decode(&data)?),
            BlockType::Reserved(value) => Self::Unknown {
                block_type: value,
                data,
            },
        })
    }

    /// Block type of this body.
    pub fn block_type(&self) -> BlockType {
        match self {
            Self::StreamInfo(_) => BlockType::StreamInfo,
            Self::Padding(_) => BlockType::Padding,
            Self::Application { .. } => BlockType::Application,
            Self::SeekTable(_) => BlockType::SeekTable,
            Self::VorbisComment(_) => BlockType::VorbisComment,
            Self::CueSheet(_) => BlockType::CueSheet,
            Self::Picture(_) => BlockType::Picture,
            Self::Unknown { block_type, .. } => BlockType::Reserved(*block_type),
        }
    }

    /// Serialize the body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Self::StreamInfo(info) => info.write(&mut out)?,
            Self::Padding(len) => out.resize(*len as usize, 0),
            Self::Application { id, data } => {
                out.extend_from_slice(&id.to_be_bytes());
                out.extend_from_slice(data);
            }
            Self::SeekTable(table) => table.write(&mut out)?,
            Self::VorbisComment(comment) => comment.write(&mut out)?,
            Self::CueSheet(sheet) => sheet.write(&mut out)?,
            Self::Picture(picture) => picture.write(&mut out)?,
            Self::Unknown { data, .. } => out.extend_from_slice(data),
        }
        if out.len() > MAX_BLOCK_LENGTH as usize {
            return Err(Error::BlockTooLarge(out.len()));
        }
        Ok(out)
    }
}

/// A metadata block: header plus decoded body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub header: BlockHeader,
    pub body: BlockBody,
}

impl Block {
    /// Build a block around a body, computing the header length.
    pub fn new(body: BlockBody, is_last: bool) -> Result<Self> {
        let length = body.encode()?.len() as u32;
        Ok(Self {
            header: BlockHeader {
                is_last,
                block_type: body.block_type(),
                length,
            },
            body,
        })
    }

    /// Read a complete block (header and body).
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let header = BlockHeader::read(reader)?;
        let body = header.read_body(reader)?;
        Ok(Self { header, body })
    }

    /// Write the block. The header length is recomputed from the body.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let data = self.body.encode()?;
        let header = BlockHeader {
            is_last: self.header.is_last,
            block_type: self.body.block_type(),
            length: data.len() as u32,
        };
        header.write(writer)?;
        writer.write_all(&data)?;
        Ok(())
    }

    /// Whether this block is flagged as the last metadata block.
    pub fn is_last(&self) -> bool {
        self.header.is_last
    }
}
