//! Synthetic FLAC files for CLI tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use flacseek_frame::{encode_frame, BlockingStrategy, ChannelAssignment, FrameHeader};
use flacseek_meta::{Block, BlockBody, SeekPoint, SeekTable, StreamInfo};

pub const BLOCK_SIZE: u16 = 4096;

/// Encode `frames` fixed-blocking stereo frames, optionally with a SEEKTABLE
/// holding a point for every frame.
pub fn flac_bytes(frames: u64, with_seek_table: bool) -> Vec<u8> {
    let mut encoded = Vec::new();
    for n in 0..frames {
        let header = FrameHeader::new(
            BlockingStrategy::Fixed,
            n,
            BLOCK_SIZE,
            44_100,
            ChannelAssignment::Independent(2),
            16,
        );
        let first = n * u64::from(BLOCK_SIZE);
        let channel: Vec<i32> = (0..u64::from(BLOCK_SIZE))
            .map(|i| ((first + i) % 512) as i32 - 256)
            .collect();
        encoded.push(encode_frame(&header, &[channel.clone(), channel]).unwrap());
    }

    let info = StreamInfo {
        min_block_size: BLOCK_SIZE,
        max_block_size: BLOCK_SIZE,
        min_frame_size: 0,
        max_frame_size: 0,
        sample_rate: 44_100,
        channels: 2,
        bits_per_sample: 16,
        total_samples: frames * u64::from(BLOCK_SIZE),
        md5: [0; 16],
    };

    let mut bytes = b"fLaC".to_vec();
    Block::new(BlockBody::StreamInfo(info), !with_seek_table)
        .unwrap()
        .write(&mut bytes)
        .unwrap();

    if with_seek_table {
        let mut offset = 0u64;
        let mut points = Vec::new();
        for (n, frame) in encoded.iter().enumerate() {
            points.push(SeekPoint::new(n as u64 * u64::from(BLOCK_SIZE), offset, BLOCK_SIZE));
            offset += frame.len() as u64;
        }
        Block::new(BlockBody::SeekTable(SeekTable { points }), true)
            .unwrap()
            .write(&mut bytes)
            .unwrap();
    }

    for frame in encoded {
        bytes.extend(frame);
    }
    bytes
}

/// Write a fixture into `dir` and return its path.
pub fn write_flac(dir: &Path, name: &str, frames: u64, with_seek_table: bool) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, flac_bytes(frames, with_seek_table)).unwrap();
    path
}
