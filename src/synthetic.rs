//! Synthetic tracks and query batches.
//!
//! Generated tracks always satisfy the sorted, disjoint precondition, and
//! generated batches always share one span, so they can be fed straight to
//! the fill engine. Pass a seeded RNG for reproducible data.

use crate::query::QueryBatch;
use crate::track::Track;
use rand::Rng;
use std::ops::RangeInclusive;

/// Generate a sorted, pairwise-disjoint track of `n` intervals.
///
/// Interval lengths are drawn from `len` (a zero lower bound is raised to
/// 1) and the gaps before each interval from `gap`. Values are drawn from
/// `[0.5, 100)` so covered cells are never zero.
pub fn random_track<R: Rng>(
    rng: &mut R,
    n: usize,
    len: RangeInclusive<u64>,
    gap: RangeInclusive<u64>,
) -> Track<f32> {
    let len = (*len.start()).max(1)..=(*len.end()).max(1);
    let mut track = Track::empty();
    let mut cursor = 0u64;

    for _ in 0..n {
        let start = cursor + rng.gen_range(gap.clone());
        let end = start + rng.gen_range(len.clone());
        let value = rng.gen_range(0.5f32..100.0);
        track.push(start, end, value);
        cursor = end;
    }

    track
}

/// Generate `n` windows of `sequence_length` bp starting anywhere in
/// `[0, coord_max]`.
pub fn random_batch<R: Rng>(
    rng: &mut R,
    n: usize,
    sequence_length: u64,
    coord_max: u64,
) -> QueryBatch {
    let starts = (0..n).map(|_| rng.gen_range(0..=coord_max)).collect();
    QueryBatch::from_starts(starts, sequence_length)
}
