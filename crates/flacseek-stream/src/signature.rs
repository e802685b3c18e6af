//! Stream preamble verification.
//!
//! A stream starts with `fLaC`. Some files carry an ID3v2 tag in front of
//! it, laid out as:
//! - 3: `ID3`, 2: version, 1: flags
//! - 4: synchsafe size of the tag body
//!
//! The tag is skipped without being parsed.

use std::io::{self, Read};

use crate::{Error, Result};

/// Magic bytes opening every FLAC stream.
pub const SIGNATURE: [u8; 4] = *b"fLaC";

const ID3_MAGIC: &[u8; 3] = b"ID3";

/// Decode a synchsafe integer: 7 payload bits per byte, high bit ignored.
pub fn synchsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0, |acc, &b| acc << 7 | u32::from(b & 0x7F))
}

/// Verify the stream signature, skipping a leading ID3v2 tag.
///
/// Reads exactly 4 bytes when there is no tag, or `10 + size + 4` bytes when
/// a tag of declared `size` precedes the signature. Returns the declared size
/// of a skipped tag.
pub fn verify_signature<R: Read>(reader: &mut R) -> Result<Option<u32>> {
    let mut found = [0u8; 4];
    reader.read_exact(&mut found)?;

    let mut tag_size = None;
    if found[..3] == ID3_MAGIC[..] {
        // found[3] is the major version; minor version and flags follow
        let mut rest = [0u8; 2];
        reader.read_exact(&mut rest)?;
        let mut size = [0u8; 4];
        reader.read_exact(&mut size)?;
        let size = synchsafe(size);

        tracing::debug!("Skipping ID3v2.{} tag of {} bytes", found[3], size);
        let skipped = io::copy(&mut reader.by_ref().take(u64::from(size)), &mut io::sink())?;
        if skipped < u64::from(size) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("ID3v2 tag truncated after {} of {} bytes", skipped, size),
            )
            .into());
        }

        tag_size = Some(size);
        reader.read_exact(&mut found)?;
    }

    if found != SIGNATURE {
        return Err(Error::InvalidSignature {
            expected: SIGNATURE,
            found,
        });
    }
    Ok(tag_size)
}
