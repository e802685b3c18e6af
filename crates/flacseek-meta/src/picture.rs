//! PICTURE block.

use std::io::Write;

use crate::cursor::ByteCursor;
use crate::{BlockType, Result};

/// Embedded picture, such as cover art.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Picture {
    /// Picture type code (0-20, ID3v2 APIC semantics).
    pub picture_type: u32,
    pub mime_type: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
    /// Color depth in bits per pixel.
    pub depth: u32,
    /// Number of colors for indexed formats, 0 otherwise.
    pub colors: u32,
    #[cfg_attr(feature = "serialize", serde(skip))]
    pub data: Vec<u8>,
}

impl Picture {
    /// Decode a PICTURE body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data, BlockType::Picture);

        let picture_type = cursor.u32_be()?;
        let mime_len = cursor.u32_be()?;
        let mime_type = cursor.string(mime_len, "MIME type")?;
        let description_len = cursor.u32_be()?;
        let description = cursor.string(description_len, "picture description")?;
        let width = cursor.u32_be()?;
        let height = cursor.u32_be()?;
        let depth = cursor.u32_be()?;
        let colors = cursor.u32_be()?;
        let data_len = cursor.u32_be()?;
        let picture = cursor.take(data_len as usize)?.to_vec();
        cursor.finish()?;

        Ok(Self {
            picture_type,
            mime_type,
            description,
            width,
            height,
            depth,
            colors,
            data: picture,
        })
    }

    /// Write the PICTURE body.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.picture_type.to_be_bytes())?;
        writer.write_all(&(self.mime_type.len() as u32).to_be_bytes())?;
        writer.write_all(self.mime_type.as_bytes())?;
        writer.write_all(&(self.description.len() as u32).to_be_bytes())?;
        writer.write_all(self.description.as_bytes())?;
        writer.write_all(&self.width.to_be_bytes())?;
        writer.write_all(&self.height.to_be_bytes())?;
        writer.write_all(&self.depth.to_be_bytes())?;
        writer.write_all(&self.colors.to_be_bytes())?;
        writer.write_all(&(self.data.len() as u32).to_be_bytes())?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Whether this is the front cover (type 3).
    pub fn is_front_cover(&self) -> bool {
        self.picture_type == 3
    }
}
