//! CUESHEET block.

use std::io::Write;

use crate::cursor::ByteCursor;
use crate::{BlockType, Error, Result};

/// Bytes reserved after the CD flag (7 bits + 258 bytes).
const HEADER_RESERVED: usize = 258;
/// Bytes reserved after the track flags (6 bits + 13 bytes).
const TRACK_RESERVED: usize = 13;
/// Bytes reserved after each index point number.
const INDEX_RESERVED: usize = 3;

/// Embedded cue sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CueSheet {
    /// Media catalog number, NUL padding stripped.
    pub catalog_number: String,
    /// Lead-in samples (CD-DA only).
    pub lead_in_samples: u64,
    /// Whether the sheet describes a Compact Disc.
    pub is_cd: bool,
    /// Tracks, ending with the lead-out track.
    pub tracks: Vec<CueTrack>,
}

/// A cue sheet track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CueTrack {
    /// Track offset in samples from the beginning of the stream.
    pub offset: u64,
    /// Track number (170 or 255 for the lead-out).
    pub number: u8,
    /// ISRC, NUL padding stripped.
    pub isrc: String,
    pub is_audio: bool,
    pub pre_emphasis: bool,
    pub indices: Vec<CueIndex>,
}

/// A track index point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CueIndex {
    /// Offset in samples relative to the track offset.
    pub offset: u64,
    pub number: u8,
}

fn trim_nul(bytes: &[u8], field: &'static str) -> Result<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8(bytes[..end].to_vec()).map_err(|_| Error::InvalidUtf8(field))
}

fn pad_nul<W: Write>(writer: &mut W, value: &str, width: usize, field: &'static str) -> Result<()> {
    if value.len() > width {
        return Err(Error::invalid_field(
            field,
            format!("{} bytes exceeds {}", value.len(), width),
        ));
    }
    writer.write_all(value.as_bytes())?;
    writer.write_all(&vec![0u8; width - value.len()])?;
    Ok(())
}

impl CueSheet {
    /// Decode a CUESHEET body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data, BlockType::CueSheet);

        let catalog_number = trim_nul(cursor.take(128)?, "catalog number")?;
        let lead_in_samples = cursor.u64_be()?;
        let is_cd = cursor.u8()? & 0x80 != 0;
        cursor.take(HEADER_RESERVED)?;

        let track_count = cursor.u8()?;
        let mut tracks = Vec::with_capacity(track_count as usize);
        for _ in 0..track_count {
            let offset = cursor.u64_be()?;
            let number = cursor.u8()?;
            let isrc = trim_nul(cursor.take(12)?, "ISRC")?;
            let flags = cursor.u8()?;
            cursor.take(TRACK_RESERVED)?;

            let index_count = cursor.u8()?;
            let mut indices = Vec::with_capacity(index_count as usize);
            for _ in 0..index_count {
                let offset = cursor.u64_be()?;
                let number = cursor.u8()?;
                cursor.take(INDEX_RESERVED)?;
                indices.push(CueIndex { offset, number });
            }

            tracks.push(CueTrack {
                offset,
                number,
                isrc,
                is_audio: flags & 0x80 == 0,
                pre_emphasis: flags & 0x40 != 0,
                indices,
            });
        }
        cursor.finish()?;

        Ok(Self {
            catalog_number,
            lead_in_samples,
            is_cd,
            tracks,
        })
    }

    /// Write the CUESHEET body.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.tracks.len() > u8::MAX as usize {
            return Err(Error::invalid_field("track count", self.tracks.len().to_string()));
        }

        pad_nul(writer, &self.catalog_number, 128, "catalog number")?;
        writer.write_all(&self.lead_in_samples.to_be_bytes())?;
        writer.write_all(&[if self.is_cd { 0x80 } else { 0 }])?;
        writer.write_all(&[0u8; HEADER_RESERVED])?;
        writer.write_all(&[self.tracks.len() as u8])?;

        for track in &self.tracks {
            if track.indices.len() > u8::MAX as usize {
                return Err(Error::invalid_field(
                    "index count",
                    track.indices.len().to_string(),
                ));
            }
            writer.write_all(&track.offset.to_be_bytes())?;
            writer.write_all(&[track.number])?;
            pad_nul(writer, &track.isrc, 12, "ISRC")?;
            let mut flags = 0u8;
            if !track.is_audio {
                flags |= 0x80;
            }
            if track.pre_emphasis {
                flags |= 0x40;
            }
            writer.write_all(&[flags])?;
            writer.write_all(&[0u8; TRACK_RESERVED])?;
            writer.write_all(&[track.indices.len() as u8])?;
            for index in &track.indices {
                writer.write_all(&index.offset.to_be_bytes())?;
                writer.write_all(&[index.number])?;
                writer.write_all(&[0u8; INDEX_RESERVED])?;
            }
        }
        Ok(())
    }

    /// The lead-out track, if present.
    pub fn lead_out(&self) -> Option<&CueTrack> {
        self.tracks.last()
    }
}
