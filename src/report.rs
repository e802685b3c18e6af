//! Serializable summaries of a stream session, printed by the CLI.

use flacseek_stream::{FrameHeader, SeekIndex, SeekOrigin, SeekPoint, Stream, StreamInfo};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Stream properties and the metadata chain.
#[derive(Debug, Clone, Serialize)]
pub struct StreamReport {
    pub path: PathBuf,
    pub info: StreamInfo,
    pub duration_secs: f64,
    pub id3_tag_size: Option<u32>,
    pub data_start: u64,
    pub blocks: Vec<BlockSummary>,
}

/// One metadata block after STREAMINFO.
#[derive(Debug, Clone, Serialize)]
pub struct BlockSummary {
    pub block_type: String,
    pub length: u32,
    pub is_last: bool,
}

impl StreamReport {
    pub fn new<R>(path: impl Into<PathBuf>, stream: &Stream<R>) -> Self {
        let info = stream.info().clone();
        Self {
            path: path.into(),
            duration_secs: info.duration_secs(),
            id3_tag_size: stream.id3_tag_size(),
            data_start: stream.data_start(),
            blocks: stream
                .blocks()
                .iter()
                .map(|block| BlockSummary {
                    block_type: block.header.block_type.to_string(),
                    length: block.header.length,
                    is_last: block.is_last(),
                })
                .collect(),
            info,
        }
    }
}

/// Where a seek table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSource {
    Embedded,
    Synthesized,
}

/// Seek points as used by a session.
#[derive(Debug, Clone, Serialize)]
pub struct SeekTableReport {
    pub source: TableSource,
    pub points: Vec<SeekPoint>,
}

impl SeekTableReport {
    pub fn new(source: TableSource, index: &SeekIndex) -> Self {
        Self {
            source,
            points: index.points().to_vec(),
        }
    }
}

/// Outcome of a seek.
#[derive(Debug, Clone, Serialize)]
pub struct SeekReport {
    pub target: i64,
    pub origin: String,
    pub achieved_sample: u64,
    /// Absolute byte position of the frame reached.
    pub position: u64,
    pub frame: Option<FrameHeader>,
}

impl SeekReport {
    pub fn new(
        target: i64,
        origin: SeekOrigin,
        achieved_sample: u64,
        position: u64,
        frame: Option<FrameHeader>,
    ) -> Self {
        let origin = match origin {
            SeekOrigin::Start => "start",
            SeekOrigin::Current => "current",
            SeekOrigin::End => "end",
        };
        Self {
            target,
            origin: origin.to_string(),
            achieved_sample,
            position,
            frame,
        }
    }
}

/// Stream length, if STREAMINFO declares both rate and sample count.
pub fn duration(info: &StreamInfo) -> Option<Duration> {
    if info.sample_rate == 0 || !info.has_total_samples() {
        return None;
    }
    let secs = info.total_samples / u64::from(info.sample_rate);
    let rem = info.total_samples % u64::from(info.sample_rate);
    let nanos = rem * 1_000_000_000 / u64::from(info.sample_rate);
    Some(Duration::new(secs, nanos as u32))
}

/// Format a duration as `HH:MM:SS.mmm`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let mins = secs / 60;
    let hours = mins / 60;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        hours,
        mins % 60,
        secs % 60,
        duration.subsec_millis()
    )
}
