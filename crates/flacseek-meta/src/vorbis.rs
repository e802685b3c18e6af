//! VORBIS_COMMENT block.
//!
//! Unlike the rest of the format, the lengths in this block are
//! little-endian: the layout is shared with Vorbis streams.

use std::io::Write;

use crate::cursor::ByteCursor;
use crate::{BlockType, Error, Result};

/// Human-readable tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct VorbisComment {
    /// Name of the encoder that produced the stream.
    pub vendor: String,
    /// `NAME=value` entries in stream order.
    pub comments: Vec<String>,
}

impl VorbisComment {
    /// Decode a VORBIS_COMMENT body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data, BlockType::VorbisComment);

        let vendor_len = cursor.u32_le()?;
        let vendor = cursor.string(vendor_len, "vendor string")?;

        let count = cursor.u32_le()?;
        // Each entry needs at least its 4-byte length.
        if count as usize > data.len() / 4 {
            return Err(Error::invalid_field(
                "comment count",
                format!("{} entries in a {}-byte block", count, data.len()),
            ));
        }

        let mut comments = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = cursor.u32_le()?;
            comments.push(cursor.string(len, "comment")?);
        }
        cursor.finish()?;

        Ok(Self { vendor, comments })
    }

    /// Write the VORBIS_COMMENT body.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&(self.vendor.len() as u32).to_le_bytes())?;
        writer.write_all(self.vendor.as_bytes())?;
        writer.write_all(&(self.comments.len() as u32).to_le_bytes())?;
        for comment in &self.comments {
            writer.write_all(&(comment.len() as u32).to_le_bytes())?;
            writer.write_all(comment.as_bytes())?;
        }
        Ok(())
    }

    /// Iterate over `(name, value)` pairs. Entries without `=` are skipped.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.comments.iter().filter_map(|c| c.split_once('='))
    }

    /// First value of a field, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}
