//! Stream sessions.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use flacseek_frame::{Frame, FrameHeader, StreamParams};
use flacseek_meta::{Block, BlockBody, StreamInfo};

use crate::seek::{SeekIndex, SeekIndexBuilder, SeekOrigin, DEFAULT_TARGET_SIZE};
use crate::sequencer::{self, MetadataMode};
use crate::signature::verify_signature;
use crate::source::TrackedReader;
use crate::{Error, Result};

/// An open FLAC stream: properties, metadata and a positioned source.
///
/// Frames are read from the source's current position. Seekable sessions
/// can be repositioned by sample with [`Stream::seek`]; the seek index is
/// taken from the stream's SEEKTABLE block (retain mode only) or
/// synthesized by scanning every frame the first time it is needed.
#[derive(Debug)]
pub struct Stream<R> {
    reader: TrackedReader<R>,
    info: StreamInfo,
    blocks: Vec<Block>,
    seek_index: Option<SeekIndex>,
    seek_table_size: usize,
    data_start: u64,
    seekable: bool,
    tag_size: Option<u32>,
}

/// Construction failure.
///
/// Carries the partially built session when STREAMINFO was parsed before
/// the failure, so callers can inspect what was read.
pub struct ParseFailure<R> {
    pub error: Error,
    pub stream: Option<Box<Stream<R>>>,
}

impl<R> ParseFailure<R> {
    fn new(error: Error, stream: Option<Stream<R>>) -> Self {
        Self {
            error,
            stream: stream.map(Box::new),
        }
    }

    /// Discard the partial session and keep the error.
    pub fn into_error(self) -> Error {
        self.error
    }
}

impl<R> fmt::Debug for ParseFailure<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseFailure")
            .field("error", &self.error)
            .field("partial", &self.stream.is_some())
            .finish()
    }
}

impl<R> fmt::Display for ParseFailure<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl<R> std::error::Error for ParseFailure<R> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<R> From<ParseFailure<R>> for Error {
    fn from(failure: ParseFailure<R>) -> Self {
        failure.error
    }
}

/// Builder for stream sessions.
#[derive(Debug, Clone)]
pub struct StreamBuilder {
    mode: MetadataMode,
    seek_table_size: usize,
}

impl StreamBuilder {
    /// Create a new builder: skip metadata, default seek table size.
    pub fn new() -> Self {
        Self {
            mode: MetadataMode::Skip,
            seek_table_size: DEFAULT_TARGET_SIZE,
        }
    }

    /// Set how metadata blocks after STREAMINFO are handled.
    pub fn metadata_mode(mut self, mode: MetadataMode) -> Self {
        self.mode = mode;
        self
    }

    /// Retain (decode and keep) or skip metadata blocks.
    pub fn retain_metadata(self, retain: bool) -> Self {
        self.metadata_mode(if retain {
            MetadataMode::Retain
        } else {
            MetadataMode::Skip
        })
    }

    /// Set the maximum synthesized seek table size. 0 disables synthesis.
    pub fn seek_table_size(mut self, size: usize) -> Self {
        self.seek_table_size = size;
        self
    }

    /// Build a sequential session. Offsets count from the source's current
    /// position; seeking is unsupported.
    pub fn build<R: Read>(self, reader: R) -> std::result::Result<Stream<R>, ParseFailure<R>> {
        self.read_preamble(TrackedReader::new(reader, 0), false)
    }

    /// Build a seekable session. Offsets are absolute positions in the source.
    pub fn build_seekable<R: Read + Seek>(
        self,
        mut reader: R,
    ) -> std::result::Result<Stream<R>, ParseFailure<R>> {
        let start = match reader.stream_position() {
            Ok(start) => start,
            Err(e) => return Err(ParseFailure::new(e.into(), None)),
        };
        self.read_preamble(TrackedReader::new(reader, start), true)
    }

    fn read_preamble<R: Read>(
        self,
        mut reader: TrackedReader<R>,
        seekable: bool,
    ) -> std::result::Result<Stream<R>, ParseFailure<R>> {
        let tag_size = match verify_signature(&mut reader) {
            Ok(size) => size,
            Err(e) => return Err(ParseFailure::new(e, None)),
        };
        let (info, mut is_last) = match sequencer::read_stream_info(&mut reader) {
            Ok(parsed) => parsed,
            Err(e) => return Err(ParseFailure::new(e, None)),
        };

        let mut stream = Stream {
            reader,
            info,
            blocks: Vec::new(),
            seek_index: None,
            seek_table_size: self.seek_table_size,
            data_start: 0,
            seekable,
            tag_size,
        };

        while !is_last {
            let next = match sequencer::next_block(&mut stream.reader, self.mode) {
                Ok(next) => next,
                Err(e) => {
                    stream.data_start = stream.reader.position();
                    return Err(ParseFailure::new(e, Some(stream)));
                }
            };
            is_last = next.header.is_last;
            if let Some(block) = next.block {
                stream.adopt_seek_table(&block);
                stream.blocks.push(block);
            }
        }

        stream.data_start = stream.reader.position();
        tracing::debug!(
            "Parsed FLAC metadata: {} Hz, {} channels, {} samples, {} blocks retained, frames at {}",
            stream.info.sample_rate,
            stream.info.channels,
            stream.info.total_samples,
            stream.blocks.len(),
            stream.data_start
        );
        Ok(stream)
    }
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Read> Stream<R> {
    /// Create a sequential session, skipping metadata after STREAMINFO.
    pub fn new(reader: R) -> std::result::Result<Self, ParseFailure<R>> {
        StreamBuilder::new().build(reader)
    }

    /// Create a sequential session that retains every metadata block.
    pub fn parse(reader: R) -> std::result::Result<Self, ParseFailure<R>> {
        StreamBuilder::new().retain_metadata(true).build(reader)
    }

    /// Parse the next frame header.
    ///
    /// Returns `Ok(None)` when the source ends at a frame boundary. Finish the
    /// frame with [`Stream::read_frame_body`] before reading the next header.
    pub fn next_header(&mut self) -> Result<Option<FrameHeader>> {
        let params = self.params();
        Ok(FrameHeader::read(&mut self.reader, &params)?)
    }

    /// Decode the body of a frame whose header was just read.
    pub fn read_frame_body(&mut self, header: FrameHeader) -> Result<Frame> {
        Ok(Frame::read_body(&mut self.reader, header)?)
    }

    /// Parse and decode the next frame.
    ///
    /// Returns `Ok(None)` when the source ends at a frame boundary.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        let params = self.params();
        Ok(Frame::read(&mut self.reader, &params)?)
    }

    /// Iterate over the remaining frames. Iteration stops after an error.
    pub fn frames(&mut self) -> Frames<'_, R> {
        Frames {
            stream: self,
            done: false,
        }
    }
}

impl<R> Stream<R> {
    /// Stream properties from STREAMINFO.
    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    /// Metadata blocks after STREAMINFO, in stream order. Empty in skip mode.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Offset of the first frame header.
    ///
    /// Absolute for seekable sessions; relative to the source's position at
    /// construction for sequential ones.
    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// Current source position, on the same scale as [`Stream::data_start`].
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Declared size of an ID3v2 tag skipped before the signature.
    pub fn id3_tag_size(&self) -> Option<u32> {
        self.tag_size
    }

    /// Whether [`Stream::seek`] is available.
    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    /// Maximum synthesized seek table size; 0 when synthesis is disabled.
    pub fn seek_table_size(&self) -> usize {
        self.seek_table_size
    }

    /// The seek index, if one was embedded or has been synthesized.
    pub fn seek_index(&self) -> Option<&SeekIndex> {
        self.seek_index.as_ref()
    }

    /// Unwrap the underlying source, at its current position.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn params(&self) -> StreamParams {
        StreamParams {
            sample_rate: self.info.sample_rate,
            bits_per_sample: self.info.bits_per_sample,
        }
    }

    /// Use an embedded SEEKTABLE block as the seek index.
    ///
    /// The first non-empty table wins; a table of only placeholders leaves
    /// the index to be synthesized.
    fn adopt_seek_table(&mut self, block: &Block) {
        if self.seek_index.is_some() {
            return;
        }
        if let BlockBody::SeekTable(table) = &block.body {
            let index = SeekIndex::from_table(table);
            if !index.is_empty() {
                tracing::debug!("Using embedded seek table with {} points", index.len());
                self.seek_index = Some(index);
            }
        }
    }
}

impl<R: Read + Seek> Stream<R> {
    /// Create a seekable session that retains metadata and synthesizes a
    /// seek table of up to 100 points when the stream has none.
    pub fn new_seekable(reader: R) -> std::result::Result<Self, ParseFailure<R>> {
        StreamBuilder::new()
            .retain_metadata(true)
            .seek_table_size(DEFAULT_TARGET_SIZE)
            .build_seekable(reader)
    }

    /// Seek to the frame containing (or nearest before) a target sample.
    ///
    /// The target is resolved against `origin` and looked up with a floor
    /// search: the achieved sample never exceeds the target, except when the
    /// target lies at or before the first indexed point, which is then used.
    /// A target exactly on a later point resolves to the point before it. The
    /// source is left at the start of the chosen frame and its first sample
    /// number is returned.
    ///
    /// The first seek on a stream without a seek table scans every frame.
    /// That scan restores the source position when done; if restoring fails,
    /// the error is returned and the position is unspecified.
    pub fn seek(&mut self, sample: i64, origin: SeekOrigin) -> Result<u64> {
        if !self.seekable {
            return Err(Error::SeekUnsupported("source is not seekable"));
        }

        let data_start = self.data_start;
        let total_samples = self.info.total_samples;
        let position = self.reader.position().saturating_sub(data_start);

        let point = self
            .seek_table()?
            .resolve(sample, origin, total_samples, position)
            .ok_or(Error::SeekUnsupported("seek table is empty"))?;

        tracing::trace!(
            "Seek {} from {:?} resolved to sample {} at offset {}",
            sample,
            origin,
            point.sample_number,
            point.offset
        );
        self.reader.seek(SeekFrom::Start(data_start + point.offset))?;
        Ok(point.sample_number)
    }

    /// Get the seek index, synthesizing it on first use.
    pub fn seek_table(&mut self) -> Result<&SeekIndex> {
        if self.seek_index.is_none() {
            if !self.seekable {
                return Err(Error::SeekUnsupported("source is not seekable"));
            }
            if self.seek_table_size == 0 {
                return Err(Error::SeekUnsupported(
                    "stream has no seek table and synthesis is disabled",
                ));
            }
            let index = self.build_seek_index()?;
            self.seek_index = Some(index);
        }
        self.seek_index
            .as_ref()
            .ok_or(Error::SeekUnsupported("stream has no seek table"))
    }

    fn build_seek_index(&mut self) -> Result<SeekIndex> {
        let restore = self.reader.position();
        let scanned = self.scan_frames();
        let restored = self.reader.seek(SeekFrom::Start(restore));

        match (scanned, restored) {
            (Ok(index), Ok(_)) => Ok(index),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(restore_err)) => {
                tracing::warn!(
                    "Failed to restore position {} after seek table scan: {}",
                    restore,
                    restore_err
                );
                Err(e)
            }
        }
    }

    fn scan_frames(&mut self) -> Result<SeekIndex> {
        self.reader.seek(SeekFrom::Start(self.data_start))?;

        let params = self.params();
        let mut builder = SeekIndexBuilder::new().target_size(self.seek_table_size);
        loop {
            let offset = self.reader.position() - self.data_start;
            match Frame::read(&mut self.reader, &params)? {
                Some(frame) => builder.push_frame(offset, frame.header.block_size),
                None => break,
            }
        }

        let frames = builder.frame_count();
        let index = builder.build();
        tracing::info!(
            "Synthesized seek table: {} frames scanned, {} points kept",
            frames,
            index.len()
        );
        Ok(index)
    }
}

impl Stream<BufReader<File>> {
    /// Open a file as a sequential session, skipping metadata.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file))?)
    }

    /// Open a file as a sequential session retaining all metadata.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::parse(BufReader::new(file))?)
    }

    /// Open a file as a seekable session.
    pub fn open_seekable<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new_seekable(BufReader::new(file))?)
    }
}

/// Iterator over the remaining frames of a stream.
pub struct Frames<'a, R> {
    stream: &'a mut Stream<R>,
    done: bool,
}

impl<R: Read> Iterator for Frames<'_, R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.stream.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
