//! Unit space and launch sizing for the fill engine.
//!
//! A fill pass is a 3-D space of independent units: query `i`, offset `j`
//! into that query's located interval range, and offset `k` into the
//! interval's clipped span. Flat unit indices decode with `i` varying
//! fastest, then `j`, then `k`.

use crate::error::{Result, ValuesError};
use crate::locate::LocatedRanges;
use crate::query::QueryBatch;
use crate::track::{Track, TrackValue};

/// Default cap on units per group.
pub const DEFAULT_GROUP_WIDTH: usize = 512;

/// Extent of the unit space for one fill pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridDims {
    pub batch_size: usize,
    pub sequence_length: usize,
    /// Upper bound on intervals any query needs scanned.
    pub max_number_intervals: usize,
    /// Upper bound on cells a single interval covers within one row.
    pub max_interval_length: usize,
}

impl GridDims {
    /// Derive the unit space from located ranges.
    ///
    /// Both bounds are capped at the sequence length: a window of `L` bp can
    /// overlap at most `L` disjoint intervals, and no interval covers more
    /// than `L` cells of a row.
    pub fn new<V: TrackValue>(
        track: &Track<V>,
        batch: &QueryBatch,
        ranges: &LocatedRanges,
    ) -> Self {
        let sequence_length = batch.sequence_length() as usize;
        Self {
            batch_size: batch.len(),
            sequence_length,
            max_number_intervals: sequence_length.min(ranges.max_span()),
            max_interval_length: sequence_length.min(track.max_interval_length() as usize),
        }
    }

    /// Total number of units, failing if the product overflows.
    pub fn total_units(&self) -> Result<usize> {
        self.batch_size
            .checked_mul(self.max_number_intervals)
            .and_then(|n| n.checked_mul(self.max_interval_length))
            .ok_or(ValuesError::GridOverflow {
                batch_size: self.batch_size,
                max_number_intervals: self.max_number_intervals,
                max_interval_length: self.max_interval_length,
            })
    }

    /// True when the pass has no work at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.batch_size == 0 || self.max_number_intervals == 0 || self.max_interval_length == 0
    }

    /// Decode a flat unit index. Must not be called on an empty grid.
    #[inline]
    pub fn decode(&self, flat: usize) -> Unit {
        let per_k = self.batch_size * self.max_number_intervals;
        Unit {
            query: flat % self.batch_size,
            interval_offset: (flat / self.batch_size) % self.max_number_intervals,
            position_offset: flat / per_k,
        }
    }
}

/// One `(query, interval-offset, position-offset)` unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    pub query: usize,
    pub interval_offset: usize,
    pub position_offset: usize,
}

impl Unit {
    /// The row-relative column and value this unit writes, or `None` when
    /// the unit is a no-op.
    ///
    /// The unit writes only if its position offset falls inside the clipped
    /// span of its interval.
    #[inline]
    pub fn cell<V: TrackValue>(
        &self,
        track: &Track<V>,
        batch: &QueryBatch,
        ranges: &LocatedRanges,
    ) -> Option<(usize, V)> {
        let span = clip(track, batch, ranges, self.query, self.interval_offset)?;
        let position = span.start + self.position_offset;
        (position < span.end).then_some((position, span.value))
    }
}

/// Row-relative `[start, end)` cells one interval covers in one query row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedSpan<V> {
    pub start: usize,
    pub end: usize,
    pub value: V,
}

impl<V> ClippedSpan<V> {
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Clip the `interval_offset`-th located interval of `query` to the window.
///
/// Returns `None` when the offset runs past the located range. The span end
/// never exceeds the window length; the span may be empty.
#[inline]
pub fn clip<V: TrackValue>(
    track: &Track<V>,
    batch: &QueryBatch,
    ranges: &LocatedRanges,
    query: usize,
    interval_offset: usize,
) -> Option<ClippedSpan<V>> {
    if query >= batch.len() {
        return None;
    }

    let cursor = ranges.found_starts[query] + interval_offset;
    if cursor >= ranges.found_ends[query] {
        return None;
    }

    let query_start = batch.starts()[query];
    let query_end = batch.ends()[query];

    Some(ClippedSpan {
        start: track.starts()[cursor].saturating_sub(query_start) as usize,
        end: track.ends()[cursor].min(query_end).saturating_sub(query_start) as usize,
        value: track.values()[cursor],
    })
}

/// Group layout covering a flat unit space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchConfig {
    pub groups: usize,
    pub group_width: usize,
}

impl LaunchConfig {
    /// Cover `units` with groups of at most `max_group_width`.
    ///
    /// A single group is sized exactly; more groups use the full width and
    /// may overshoot the unit count.
    pub fn for_units(units: usize, max_group_width: usize) -> Self {
        let max_group_width = max_group_width.max(1);
        let groups = units.div_ceil(max_group_width);
        let group_width = if groups == 1 { units } else { max_group_width };
        Self {
            groups,
            group_width,
        }
    }

    /// Number of slots launched, overshoot included.
    #[inline]
    pub fn total_slots(&self) -> usize {
        self.groups * self.group_width
    }
}
