//! Synthetic FLAC streams for integration tests.

#![allow(dead_code)]

use flacseek_frame::{encode_frame, BlockingStrategy, ChannelAssignment, FrameHeader};
use flacseek_meta::{Block, BlockBody, StreamInfo};

/// An encoded stream and where its pieces landed.
pub struct Fixture {
    pub bytes: Vec<u8>,
    /// Absolute offset of the first frame header.
    pub data_start: u64,
    /// Offset of every frame, relative to `data_start`.
    pub frame_offsets: Vec<u64>,
    pub total_samples: u64,
}

/// Builder for synthetic streams of uncompressed stereo frames.
pub struct FixtureBuilder {
    id3_size: Option<u32>,
    blocks: Vec<BlockBody>,
    block_sizes: Vec<u16>,
    channels: ChannelAssignment,
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self {
            id3_size: None,
            blocks: Vec::new(),
            block_sizes: Vec::new(),
            channels: ChannelAssignment::Independent(2),
        }
    }

    /// Prepend an ID3v2 tag with a body of `size` bytes.
    pub fn id3(mut self, size: u32) -> Self {
        self.id3_size = Some(size);
        self
    }

    /// Add a metadata block after STREAMINFO.
    pub fn block(mut self, body: BlockBody) -> Self {
        self.blocks.push(body);
        self
    }

    /// Add `count` frames of `block_size` samples.
    pub fn frames(mut self, count: usize, block_size: u16) -> Self {
        self.block_sizes.extend(std::iter::repeat(block_size).take(count));
        self
    }

    /// Stereo decorrelation mode used for every frame.
    pub fn channels(mut self, channels: ChannelAssignment) -> Self {
        self.channels = channels;
        self
    }

    pub fn build(self) -> Fixture {
        let mut bytes = Vec::new();
        if let Some(size) = self.id3_size {
            bytes.extend(b"ID3\x04\x00\x00");
            bytes.extend([
                (size >> 21) as u8 & 0x7F,
                (size >> 14) as u8 & 0x7F,
                (size >> 7) as u8 & 0x7F,
                size as u8 & 0x7F,
            ]);
            bytes.extend(vec![0u8; size as usize]);
        }
        bytes.extend(b"fLaC");

        let total_samples: u64 = self.block_sizes.iter().map(|&b| u64::from(b)).sum();
        let max_block = self.block_sizes.iter().copied().max().unwrap_or(4096);
        let info = StreamInfo {
            min_block_size: self.block_sizes.iter().copied().min().unwrap_or(4096),
            max_block_size: max_block,
            min_frame_size: 0,
            max_frame_size: 0,
            sample_rate: 44_100,
            channels: 2,
            bits_per_sample: 16,
            total_samples,
            md5: [0; 16],
        };

        let extra = self.blocks.len();
        Block::new(BlockBody::StreamInfo(info), extra == 0)
            .unwrap()
            .write(&mut bytes)
            .unwrap();
        for (i, body) in self.blocks.into_iter().enumerate() {
            Block::new(body, i + 1 == extra)
                .unwrap()
                .write(&mut bytes)
                .unwrap();
        }

        let data_start = bytes.len() as u64;
        let mut frame_offsets = Vec::new();
        let mut first_sample = 0u64;
        for &block_size in &self.block_sizes {
            frame_offsets.push(bytes.len() as u64 - data_start);
            let header = FrameHeader::new(
                BlockingStrategy::Variable,
                first_sample,
                block_size,
                44_100,
                self.channels,
                16,
            );
            bytes.extend(encode_frame(&header, &samples(first_sample, block_size)).unwrap());
            first_sample += u64::from(block_size);
        }

        Fixture {
            bytes,
            data_start,
            frame_offsets,
            total_samples,
        }
    }
}

/// Deterministic stereo samples for a frame, derived from its first sample.
pub fn samples(first_sample: u64, block_size: u16) -> Vec<Vec<i32>> {
    let left = (0..u64::from(block_size))
        .map(|i| ((first_sample + i) % 2000) as i32 - 1000)
        .collect();
    let right = (0..u64::from(block_size))
        .map(|i| ((first_sample + i) * 7 % 3000) as i32 - 1500)
        .collect();
    vec![left, right]
}
