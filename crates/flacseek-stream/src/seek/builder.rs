//! Seek index synthesis from scanned frames.

use flacseek_meta::SeekPoint;

use super::SeekIndex;

/// Default upper bound on synthesized seek points.
pub const DEFAULT_TARGET_SIZE: usize = 100;

/// Builder that collects one point per frame and down-samples on build.
#[derive(Debug, Clone)]
pub struct SeekIndexBuilder {
    target_size: usize,
    points: Vec<SeekPoint>,
    next_sample: u64,
}

impl SeekIndexBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            points: Vec::new(),
            next_sample: 0,
        }
    }

    /// Set the target number of points.
    pub fn target_size(mut self, size: usize) -> Self {
        self.target_size = size;
        self
    }

    /// Record a frame starting at `offset` (relative to the first frame)
    /// that holds `block_size` samples.
    pub fn push_frame(&mut self, offset: u64, block_size: u16) {
        self.points
            .push(SeekPoint::new(self.next_sample, offset, block_size));
        self.next_sample += u64::from(block_size);
    }

    /// Number of frames recorded so far.
    pub fn frame_count(&self) -> usize {
        self.points.len()
    }

    /// Samples covered by the recorded frames.
    pub fn total_samples(&self) -> u64 {
        self.next_sample
    }

    /// Keep every `stride`-th recorded point.
    ///
    /// The stride is at least `total / target`, raised when needed so that
    /// at most `target + 1` points survive. Point 0 is always kept.
    pub fn stride(total: usize, target: usize) -> usize {
        if total <= target || target == 0 {
            return 1;
        }
        (total / target).max(total.div_ceil(target + 1)).max(1)
    }

    /// Down-sample the recorded points into an index.
    pub fn build(self) -> SeekIndex {
        let stride = Self::stride(self.points.len(), self.target_size);
        let points = self.points.into_iter().step_by(stride).collect();
        SeekIndex::new(points)
    }
}

impl Default for SeekIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}
