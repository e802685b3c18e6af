//! Frame checksums.
//!
//! - CRC-8, polynomial `x^8 + x^2 + x + 1` (0x07), covers the frame header
//! - CRC-16, polynomial `x^16 + x^15 + x^2 + 1` (0x8005), covers the whole frame
//!
//! Both start from zero and are not reflected.

use std::io::{self, Read};

const CRC8_TABLE: [u8; 256] = crc8_table();
const CRC16_TABLE: [u16; 256] = crc16_table();

const fn crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x07 } else { crc << 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const fn crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x8005 } else { crc << 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

fn update8(crc: u8, data: &[u8]) -> u8 {
    data.iter().fold(crc, |crc, &b| CRC8_TABLE[(crc ^ b) as usize])
}

fn update16(crc: u16, data: &[u8]) -> u16 {
    data.iter().fold(crc, |crc, &b| {
        (crc << 8) ^ CRC16_TABLE[((crc >> 8) as u8 ^ b) as usize]
    })
}

/// CRC-8 of a byte slice.
pub fn crc8(data: &[u8]) -> u8 {
    update8(0, data)
}

/// CRC-16 of a byte slice.
pub fn crc16(data: &[u8]) -> u16 {
    update16(0, data)
}

/// Reader that checksums every byte passing through it.
pub(crate) struct CrcReader<R> {
    inner: R,
    crc8: u8,
    crc16: u16,
}

impl<R: Read> CrcReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self::resume(inner, 0)
    }

    /// Continue a CRC-16 computed over earlier bytes of the same frame.
    pub(crate) fn resume(inner: R, crc16: u16) -> Self {
        Self {
            inner,
            crc8: 0,
            crc16,
        }
    }

    pub(crate) fn crc8(&self) -> u8 {
        self.crc8
    }

    pub(crate) fn crc16(&self) -> u16 {
        self.crc16
    }
}

impl<R: Read> Read for CrcReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.crc8 = update8(self.crc8, &buf[..n]);
        self.crc16 = update16(self.crc16, &buf[..n]);
        Ok(n)
    }
}
