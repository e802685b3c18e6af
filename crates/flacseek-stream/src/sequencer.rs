//! Metadata block sequencing.
//!
//! Walks the block chain between the signature and the first frame. The
//! first block must be STREAMINFO; the walk ends after the block whose
//! header carries the last-block flag.

use std::io::Read;

use flacseek_meta::{Block, BlockHeader, BlockType, StreamInfo};

use crate::{Error, Result};

/// What to do with metadata blocks after STREAMINFO.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum MetadataMode {
    /// Discard block bodies by their declared length.
    #[default]
    Skip,
    /// Decode and keep every block, including reserved types as opaque bytes.
    Retain,
}

/// A block header together with its body when retained.
#[derive(Debug)]
pub(crate) struct SequencedBlock {
    pub(crate) header: BlockHeader,
    pub(crate) block: Option<Block>,
}

/// Read the mandatory STREAMINFO block.
///
/// Returns the stream properties and whether the block was flagged last.
pub(crate) fn read_stream_info<R: Read>(reader: &mut R) -> Result<(StreamInfo, bool)> {
    let header = BlockHeader::read(reader)?;
    if header.block_type != BlockType::StreamInfo {
        return Err(Error::malformed_stream_info(format!(
            "first metadata block is {}",
            header.block_type
        )));
    }
    if header.length != StreamInfo::LENGTH {
        return Err(Error::malformed_stream_info(format!(
            "block length {} instead of {}",
            header.length,
            StreamInfo::LENGTH
        )));
    }

    let mut data = [0u8; StreamInfo::LENGTH as usize];
    reader.read_exact(&mut data)?;
    let info = StreamInfo::decode(&data).map_err(|e| Error::malformed_stream_info(e.to_string()))?;
    Ok((info, header.is_last))
}

/// Read the next block header and retain or skip its body.
pub(crate) fn next_block<R: Read>(reader: &mut R, mode: MetadataMode) -> Result<SequencedBlock> {
    let header = BlockHeader::read(reader)?;
    if header.block_type.is_reserved() {
        tracing::debug!(
            "Unrecognized metadata block type {} ({} bytes)",
            header.block_type,
            header.length
        );
    }

    let block = match mode {
        MetadataMode::Skip => {
            header.skip_body(reader)?;
            None
        }
        MetadataMode::Retain => {
            let body = header.read_body(reader)?;
            Some(Block { header, body })
        }
    };
    Ok(SequencedBlock { header, block })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flacseek_meta::{BlockBody, SeekPoint, SeekTable};
    use std::io::Cursor;

    fn info() -> StreamInfo {
        StreamInfo {
            min_block_size: 4096,
            max_block_size: 4096,
            min_frame_size: 0,
            max_frame_size: 0,
            sample_rate: 44_100,
            channels: 2,
            bits_per_sample: 16,
            total_samples: 12_288,
            md5: [0; 16],
        }
    }

    fn encode(blocks: &[Block]) -> Vec<u8> {
        let mut out = Vec::new();
        for block in blocks {
            block.write(&mut out).unwrap();
        }
        out
    }

    #[test]
    fn test_stream_info_first() {
        let data = encode(&[Block::new(BlockBody::StreamInfo(info()), true).unwrap()]);
        let (parsed, is_last) = read_stream_info(&mut Cursor::new(data)).unwrap();
        assert_eq!(parsed, info());
        assert!(is_last);
    }

    #[test]
    fn test_wrong_first_block() {
        let data = encode(&[Block::new(BlockBody::Padding(34), true).unwrap()]);
        let err = read_stream_info(&mut Cursor::new(data)).unwrap_err();
        assert!(matches!(err, Error::MalformedStreamInfo(_)));
    }

    #[test]
    fn test_bad_stream_info_length() {
        let header = BlockHeader {
            is_last: true,
            block_type: BlockType::StreamInfo,
            length: 30,
        };
        let mut data = Vec::new();
        header.write(&mut data).unwrap();
        data.extend([0u8; 30]);
        let err = read_stream_info(&mut Cursor::new(data)).unwrap_err();
        assert!(matches!(err, Error::MalformedStreamInfo(_)));
    }

    #[test]
    fn test_skip_mode_consumes_body() {
        let data = encode(&[
            Block::new(BlockBody::Padding(100), false).unwrap(),
            Block::new(BlockBody::Application { id: 7, data: vec![1, 2] }, true).unwrap(),
        ]);
        let mut cursor = Cursor::new(data);

        let first = next_block(&mut cursor, MetadataMode::Skip).unwrap();
        assert!(first.block.is_none());
        assert_eq!(first.header.block_type, BlockType::Padding);
        assert_eq!(cursor.position(), 4 + 100);

        let second = next_block(&mut cursor, MetadataMode::Skip).unwrap();
        assert!(second.header.is_last);
        assert_eq!(cursor.position(), 4 + 100 + 4 + 6);
    }

    #[test]
    fn test_retain_mode_keeps_unknown() {
        let table = SeekTable {
            points: vec![SeekPoint::new(0, 0, 4096)],
        };
        let data = encode(&[
            Block::new(
                BlockBody::Unknown {
                    block_type: 42,
                    data: vec![9; 5],
                },
                false,
            )
            .unwrap(),
            Block::new(BlockBody::SeekTable(table.clone()), true).unwrap(),
        ]);
        let mut cursor = Cursor::new(data);

        let unknown = next_block(&mut cursor, MetadataMode::Retain).unwrap();
        let block = unknown.block.unwrap();
        assert_eq!(block.header.block_type, BlockType::Reserved(42));
        assert_eq!(
            block.body,
            BlockBody::Unknown {
                block_type: 42,
                data: vec![9; 5]
            }
        );

        let seek = next_block(&mut cursor, MetadataMode::Retain).unwrap();
        assert_eq!(seek.block.unwrap().body, BlockBody::SeekTable(table));
    }

    #[test]
    fn test_truncated_body() {
        let mut data = encode(&[Block::new(BlockBody::Padding(100), true).unwrap()]);
        data.truncate(50);
        assert!(next_block(&mut Cursor::new(data.clone()), MetadataMode::Skip).is_err());
        assert!(next_block(&mut Cursor::new(data), MetadataMode::Retain).is_err());
    }
}
