//! Seek index and seek resolution.
//!
//! A [`SeekIndex`] is a sparse, sample-ordered list of seek points. Offsets
//! are relative to the first frame header. Resolution finds the first point
//! at or after a target sample and steps back to the point before it (a
//! floor search); the first point is used when there is nothing before it.

mod builder;

pub use builder::{SeekIndexBuilder, DEFAULT_TARGET_SIZE};

use flacseek_meta::{SeekPoint, SeekTable};

use crate::Error;

/// Reference position for a seek target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum SeekOrigin {
    /// Target is an absolute sample number.
    Start,
    /// Target is relative to the sample at the current source position.
    ///
    /// The current sample is approximated by the first seek point at or
    /// after the current byte offset, so relative seeks drift by up to the
    /// distance between neighbouring points.
    Current,
    /// Target is relative to the total sample count; normally negative.
    End,
}

impl TryFrom<i32> for SeekOrigin {
    type Error = Error;

    /// Map the conventional whence codes: 0 start, 1 current, 2 end.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Start),
            1 => Ok(Self::Current),
            2 => Ok(Self::End),
            other => Err(Error::InvalidSeekMode(other)),
        }
    }
}

/// Immutable index of seek points, ordered by sample number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SeekIndex {
    points: Vec<SeekPoint>,
}

impl SeekIndex {
    /// Create an index from points already ordered by sample number.
    pub fn new(points: Vec<SeekPoint>) -> Self {
        Self { points }
    }

    /// Create a builder for synthesizing an index from frame positions.
    pub fn builder() -> SeekIndexBuilder {
        SeekIndexBuilder::new()
    }

    /// Adopt an embedded seek table, dropping placeholder points.
    pub fn from_table(table: &SeekTable) -> Self {
        Self::new(table.real_points().copied().collect())
    }

    /// Convert back to a SEEKTABLE body.
    pub fn to_table(&self) -> SeekTable {
        SeekTable {
            points: self.points.clone(),
        }
    }

    /// All seek points.
    pub fn points(&self) -> &[SeekPoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the index has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the points.
    pub fn iter(&self) -> impl Iterator<Item = &SeekPoint> {
        self.points.iter()
    }

    /// Point preceding the first one at or after `sample`.
    ///
    /// A target at or before the first point resolves to the first point; a
    /// target past every point resolves to the last one. A target equal to a
    /// later point's sample resolves to the point before it. `None` only for
    /// an empty index.
    pub fn floor(&self, sample: u64) -> Option<&SeekPoint> {
        match self.points.partition_point(|p| p.sample_number < sample) {
            0 => self.points.first(),
            idx => self.points.get(idx - 1),
        }
    }

    /// First point whose offset is at or after `offset`.
    pub fn at_or_after_offset(&self, offset: u64) -> Option<&SeekPoint> {
        self.points.iter().find(|p| p.offset >= offset)
    }

    /// Resolve a seek target to a seek point.
    ///
    /// `position` is the current byte offset relative to the first frame,
    /// used by [`SeekOrigin::Current`]. When no point lies at or after it,
    /// the last point is returned as-is. Negative absolute targets clamp to
    /// sample 0.
    pub fn resolve(
        &self,
        target: i64,
        origin: SeekOrigin,
        total_samples: u64,
        position: u64,
    ) -> Option<SeekPoint> {
        let base = match origin {
            SeekOrigin::Start => 0,
            SeekOrigin::End => i128::from(total_samples),
            SeekOrigin::Current => match self.at_or_after_offset(position) {
                Some(point) => i128::from(point.sample_number),
                None => return self.points.last().copied(),
            },
        };

        let absolute = (base + i128::from(target)).clamp(0, i128::from(u64::MAX)) as u64;
        self.floor(absolute).copied()
    }
}

impl From<&SeekTable> for SeekIndex {
    fn from(table: &SeekTable) -> Self {
        Self::from_table(table)
    }
}
