//! Position-tracking source wrapper.

use std::io::{self, Read, Seek, SeekFrom};

/// Reader that knows its position by counting consumed bytes.
///
/// Sequential sources have no position query, so the count starts at zero
/// when the session is created. Seekable sources start from their actual
/// position and re-synchronise on every seek.
#[derive(Debug)]
pub struct TrackedReader<R> {
    inner: R,
    position: u64,
}

impl<R> TrackedReader<R> {
    /// Wrap `inner`, which is currently at `position`.
    pub fn new(inner: R, position: u64) -> Self {
        Self { inner, position }
    }

    /// Bytes consumed since the start of the source (or since wrapping).
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Get a reference to the wrapped source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwrap the source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for TrackedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<R: Seek> Seek for TrackedReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.position = self.inner.seek(pos)?;
        Ok(self.position)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }
}
