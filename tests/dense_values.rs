//! Property tests for the locator and fill engine.
//!
//! These tests check the dense output against concrete scenarios and against
//! a brute-force per-cell lookup on randomized tracks and batches.

use ndarray::{s, Array2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use trackfill::synthetic::{random_batch, random_track};
use trackfill::{allocate_output, intervals_to_values, locate, FillEngine, QueryBatch, Track};

/// Value of the interval covering `coord`, found by a linear scan.
fn covering_value(track: &Track<f32>, coord: u64) -> f32 {
    track
        .iter()
        .find(|&(s, e, _)| s <= coord && coord < e)
        .map_or(0.0, |(_, _, v)| v)
}

fn brute_force(track: &Track<f32>, batch: &QueryBatch) -> Array2<f32> {
    let len = batch.sequence_length() as usize;
    Array2::from_shape_fn((batch.len(), len), |(i, p)| {
        covering_value(track, batch.starts()[i] + p as u64)
    })
}

fn fill(track: &Track<f32>, batch: &QueryBatch) -> Array2<f32> {
    let mut out = allocate_output(batch);
    intervals_to_values(track, batch, &mut out).unwrap();
    out
}

fn sample_track() -> Track<f32> {
    Track::new(vec![0, 10, 20], vec![5, 15, 25], vec![1.0, 2.0, 3.0]).unwrap()
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn test_window_over_middle_interval() {
    let batch = QueryBatch::new(vec![8], vec![18]).unwrap();
    let out = fill(&sample_track(), &batch);

    assert_eq!(
        out.row(0).to_vec(),
        vec![0.0, 0.0, 2.0, 2.0, 2.0, 2.0, 2.0, 0.0, 0.0, 0.0]
    );
}

#[test]
fn test_window_outside_all_intervals() {
    let batch = QueryBatch::new(vec![1_000], vec![1_010]).unwrap();
    let out = fill(&sample_track(), &batch);

    assert_eq!(out.row(0).len(), 10);
    assert!(out.iter().all(|&v| v == 0.0));
}

#[test]
fn test_window_in_gap_between_intervals() {
    let batch = QueryBatch::new(vec![5], vec![10]).unwrap();
    let out = fill(&sample_track(), &batch);
    assert!(out.iter().all(|&v| v == 0.0));
}

#[test]
fn test_window_covering_whole_track() {
    let batch = QueryBatch::new(vec![0], vec![26]).unwrap();
    let out = fill(&sample_track(), &batch);

    assert_eq!(out.slice(s![0, 0..5]).to_vec(), vec![1.0; 5]);
    assert_eq!(out.slice(s![0, 5..10]).to_vec(), vec![0.0; 5]);
    assert_eq!(out.slice(s![0, 10..15]).to_vec(), vec![2.0; 5]);
    assert_eq!(out.slice(s![0, 15..20]).to_vec(), vec![0.0; 5]);
    assert_eq!(out.slice(s![0, 20..25]).to_vec(), vec![3.0; 5]);
    assert_eq!(out[[0, 25]], 0.0);
}

// =============================================================================
// Clipping
// =============================================================================

#[test]
fn test_interval_extending_left_is_clipped() {
    let track = Track::from_records(vec![(0, 12, 5.0f32)]);
    let batch = QueryBatch::new(vec![10], vec![15]).unwrap();
    let out = fill(&track, &batch);

    assert_eq!(out.row(0).to_vec(), vec![5.0, 5.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_interval_extending_right_is_clipped() {
    let track = Track::from_records(vec![(13, 100, 5.0f32)]);
    let batch = QueryBatch::new(vec![10], vec![15]).unwrap();
    let out = fill(&track, &batch);

    assert_eq!(out.row(0).to_vec(), vec![0.0, 0.0, 0.0, 5.0, 5.0]);
}

#[test]
fn test_interval_fully_inside_contributes_whole_span() {
    let track = Track::from_records(vec![(11, 13, 5.0f32)]);
    let batch = QueryBatch::new(vec![10], vec![15]).unwrap();
    let out = fill(&track, &batch);

    assert_eq!(out.row(0).to_vec(), vec![0.0, 5.0, 5.0, 0.0, 0.0]);
}

#[test]
fn test_adjacent_intervals_meet_without_gap() {
    let track = Track::from_records(vec![(0, 3, 1.0f32), (3, 6, 2.0)]);
    let batch = QueryBatch::new(vec![1], vec![5]).unwrap();
    let out = fill(&track, &batch);

    assert_eq!(out.row(0).to_vec(), vec![1.0, 1.0, 2.0, 2.0]);
}

// =============================================================================
// Zero default and degenerate inputs
// =============================================================================

#[test]
fn test_empty_located_range_gives_zero_row() {
    let mut rng = SmallRng::seed_from_u64(11);
    let track = random_track(&mut rng, 300, 1..=20, 1..=30);
    let batch = random_batch(&mut rng, 200, 16, 12_000);
    let ranges = locate(&track, &batch);
    let out = fill(&track, &batch);

    for i in 0..batch.len() {
        if ranges.span(i) == 0 {
            assert!(out.row(i).iter().all(|&v| v == 0.0), "row {} not zero", i);
        }
    }
}

#[test]
fn test_empty_track_and_batch() {
    let out = fill(&Track::empty(), &QueryBatch::from_starts(vec![0, 5], 8));
    assert_eq!(out.dim(), (2, 8));
    assert!(out.iter().all(|&v| v == 0.0));

    let out = fill(&sample_track(), &QueryBatch::default());
    assert_eq!(out.dim(), (0, 0));
}

// =============================================================================
// Disjoint coverage, idempotence, reference equivalence
// =============================================================================

#[test]
fn test_disjoint_coverage() {
    let mut rng = SmallRng::seed_from_u64(21);
    let track = random_track(&mut rng, 500, 1..=25, 0..=10);
    let batch = random_batch(&mut rng, 64, 100, 9_000);
    let out = fill(&track, &batch);

    for (i, row) in out.rows().into_iter().enumerate() {
        // Each non-zero cell belongs to exactly one interval
        let mut covered = 0;
        for (p, &v) in row.iter().enumerate() {
            let coord = batch.starts()[i] + p as u64;
            let hits = track.iter().filter(|&(s, e, _)| s <= coord && coord < e).count();
            assert!(hits <= 1);
            if v != 0.0 {
                assert_eq!(hits, 1);
                covered += 1;
            }
        }
        assert!(covered <= batch.sequence_length() as usize);
    }
}

#[test]
fn test_idempotent_on_reused_buffer() {
    let mut rng = SmallRng::seed_from_u64(31);
    let track = random_track(&mut rng, 400, 1..=40, 0..=20);
    let batch = random_batch(&mut rng, 50, 64, 15_000);

    let mut out = allocate_output(&batch);
    let engine = FillEngine::new();
    engine.fill(&track, &batch, &mut out).unwrap();
    let first = out.clone();

    // Dirty the buffer; the engine must re-zero it
    out.fill(-1.0);
    engine.fill(&track, &batch, &mut out).unwrap();

    assert_eq!(first, out);
    assert_eq!(
        first.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
        out.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
    );
}

#[test]
fn test_matches_brute_force_randomized() {
    let mut rng = SmallRng::seed_from_u64(41);
    for round in 0..25 {
        let n = rng.gen_range(0..300);
        let len_max = rng.gen_range(1..80);
        let gap_max = rng.gen_range(0..40);
        let seq_len = rng.gen_range(1..150);
        let windows = rng.gen_range(1..40);
        let track = random_track(&mut rng, n, 1..=len_max, 0..=gap_max);
        let batch = random_batch(&mut rng, windows, seq_len, 20_000);

        assert_eq!(fill(&track, &batch), brute_force(&track, &batch), "round {}", round);
    }
}

#[test]
fn test_grid_walk_matches_parallel_for_many_widths() {
    let mut rng = SmallRng::seed_from_u64(51);
    let track = random_track(&mut rng, 250, 1..=60, 0..=15);
    let batch = random_batch(&mut rng, 19, 90, 10_000);
    let expected = fill(&track, &batch);

    for width in [1, 7, 64, 512, 100_000] {
        let mut out = allocate_output(&batch);
        FillEngine::new()
            .with_group_width(width)
            .fill_grid(&track, &batch, &mut out)
            .unwrap();
        assert_eq!(out, expected, "group width {}", width);
    }
}

// =============================================================================
// Row independence
// =============================================================================

#[test]
fn test_rows_independent_of_batch_composition() {
    let mut rng = SmallRng::seed_from_u64(61);
    let track = random_track(&mut rng, 600, 1..=30, 0..=30);
    let batch = random_batch(&mut rng, 40, 48, 18_000);
    let together = fill(&track, &batch);

    // Each row must equal the row of a single-window batch
    for i in 0..batch.len() {
        let single = QueryBatch::from_starts(vec![batch.starts()[i]], 48);
        let alone = fill(&track, &single);
        assert_eq!(together.row(i), alone.row(0), "row {}", i);
    }

    // Reversing the batch reverses the rows
    let reversed: Vec<u64> = batch.starts().iter().rev().copied().collect();
    let reversed_out = fill(&track, &QueryBatch::from_starts(reversed, 48));
    for i in 0..batch.len() {
        assert_eq!(together.row(i), reversed_out.row(batch.len() - 1 - i));
    }
}

#[test]
fn test_integer_value_type() {
    let track = Track::from_records(vec![(2, 4, 7u8), (4, 5, 9)]);
    let batch = QueryBatch::new(vec![1], vec![6]).unwrap();
    let mut out = allocate_output(&batch);

    intervals_to_values(&track, &batch, &mut out).unwrap();

    assert_eq!(out.row(0).to_vec(), vec![0u8, 7, 7, 9, 0]);
}
