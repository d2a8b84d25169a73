//! Sequential reference sweeps used to cross-check the fill engine.

use crate::locate::locate;
use crate::query::QueryBatch;
use crate::track::{Track, TrackValue};
use ndarray::Array2;

/// For each query, scan its located intervals in order and copy each
/// clipped range into the row. No parallelism.
pub fn fill_reference<V: TrackValue>(track: &Track<V>, batch: &QueryBatch) -> Array2<V> {
    let sequence_length = batch.sequence_length();
    let mut out = Array2::zeros((batch.len(), sequence_length as usize));
    let ranges = locate(track, batch);

    for i in 0..batch.len() {
        let query_start = batch.starts()[i];
        let query_end = batch.ends()[i];
        for cursor in ranges.range(i) {
            let clipped_start = track.starts()[cursor].max(query_start);
            let clipped_end = track.ends()[cursor].min(query_end);
            for coord in clipped_start..clipped_end {
                out[[i, (coord - query_start) as usize]] = track.values()[cursor];
            }
        }
    }

    out
}

/// Brute force: every output cell looks up its coordinate with a linear scan
/// of the whole track. Independent of the locator.
pub fn fill_brute_force<V: TrackValue>(track: &Track<V>, batch: &QueryBatch) -> Array2<V> {
    let sequence_length = batch.sequence_length();
    let mut out = Array2::zeros((batch.len(), sequence_length as usize));

    for i in 0..batch.len() {
        for p in 0..sequence_length {
            let coord = batch.starts()[i] + p;
            if let Some((_, _, value)) = track.iter().find(|&(s, e, _)| s <= coord && coord < e) {
                out[[i, p as usize]] = value;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{random_batch, random_track};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_reference_matches_brute_force() {
        let mut rng = SmallRng::seed_from_u64(3);
        let track = random_track(&mut rng, 150, 1..=40, 0..=15);
        let batch = random_batch(&mut rng, 20, 50, 5_000);

        assert_eq!(
            fill_reference(&track, &batch),
            fill_brute_force(&track, &batch)
        );
    }
}
