//! Bounds-checked reads over an in-memory block body.

use crate::{BlockType, Error, Result};

pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    block_type: BlockType,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(data: &'a [u8], block_type: BlockType) -> Self {
        Self {
            data,
            pos: 0,
            block_type,
        }
    }

    fn short(&self) -> Error {
        Error::InvalidLength {
            block_type: self.block_type,
            length: self.data.len() as u32,
        }
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or_else(|| self.short())?;
        if end > self.data.len() {
            return Err(self.short());
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub(crate) fn u64_be(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    pub(crate) fn u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    /// Length-prefixed UTF-8 string.
    pub(crate) fn string(&mut self, len: u32, field: &'static str) -> Result<String> {
        let bytes = self.take(len as usize)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidUtf8(field))
    }

    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos..];
        self.pos = self.data.len();
        bytes
    }

    /// Fail unless the whole body was consumed.
    pub(crate) fn finish(self) -> Result<()> {
        if self.pos != self.data.len() {
            return Err(self.short());
        }
        Ok(())
    }
}
