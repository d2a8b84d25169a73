//! Overlap locator: per-query index ranges into a track.
//!
//! For each query window `[qs, qe)` the locator finds the half-open range
//! `[found_start, found_end)` of track intervals that can overlap it:
//!
//! - `found_start` is the first interval whose end is past `qs`
//! - `found_end` is the first interval whose start is at or past `qe`
//!
//! Both are binary searches over the sorted track arrays, independent
//! across queries.

use crate::query::QueryBatch;
use crate::track::{Track, TrackValue};
use rayon::prelude::*;
use std::ops::Range;

/// Minimum number of queries before the searches run on the rayon pool.
/// Below this threshold, sequential search is faster than the fork/join.
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Located interval ranges, one `[found_start, found_end)` pair per query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocatedRanges {
    pub found_starts: Vec<usize>,
    pub found_ends: Vec<usize>,
}

impl LocatedRanges {
    /// Number of queries.
    #[inline]
    pub fn len(&self) -> usize {
        self.found_starts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.found_starts.is_empty()
    }

    /// Interval index range for query `i`.
    #[inline]
    pub fn range(&self, i: usize) -> Range<usize> {
        self.found_starts[i]..self.found_ends[i]
    }

    /// Number of candidate intervals for query `i`.
    #[inline]
    pub fn span(&self, i: usize) -> usize {
        self.found_ends[i].saturating_sub(self.found_starts[i])
    }

    /// Largest candidate count across the batch, 0 for an empty batch.
    pub fn max_span(&self) -> usize {
        (0..self.len()).map(|i| self.span(i)).max().unwrap_or(0)
    }
}

/// Right-biased search: first index whose end is greater than `query_start`.
#[inline]
fn search_found_start(ends: &[u64], query_start: u64) -> usize {
    ends.partition_point(|&end| end <= query_start)
}

/// Left-biased search: first index whose start is not less than `query_end`.
#[inline]
fn search_found_end(starts: &[u64], query_end: u64) -> usize {
    starts.partition_point(|&start| start < query_end)
}

/// Locate the candidate interval range of every query in the batch.
///
/// Relies on the track being sorted and disjoint (so both `starts` and
/// `ends` are ascending). Inputs are not validated; out-of-range queries
/// simply produce empty ranges.
pub fn locate<V: TrackValue>(track: &Track<V>, batch: &QueryBatch) -> LocatedRanges {
    let starts = track.starts();
    let ends = track.ends();

    let (found_starts, found_ends) = if batch.len() >= PARALLEL_THRESHOLD {
        let found_starts = batch
            .starts()
            .par_iter()
            .map(|&qs| search_found_start(ends, qs))
            .collect();
        let found_ends = batch
            .ends()
            .par_iter()
            .map(|&qe| search_found_end(starts, qe))
            .collect();
        (found_starts, found_ends)
    } else {
        let found_starts = batch
            .starts()
            .iter()
            .map(|&qs| search_found_start(ends, qs))
            .collect();
        let found_ends = batch
            .ends()
            .iter()
            .map(|&qe| search_found_end(starts, qe))
            .collect();
        (found_starts, found_ends)
    };

    LocatedRanges {
        found_starts,
        found_ends,
    }
}
