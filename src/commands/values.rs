//! The `values` command: dense per-window values from a bedGraph track.
//!
//! Windows may come from any number of chromosomes. They are grouped into
//! one batch per chromosome, each batch is filled against that
//! chromosome's track, and rows are written back in input order. Windows on
//! chromosomes absent from the track produce all-zero rows.

use crate::bedgraph::{read_track_set, TrackSet};
use crate::error::Result;
use crate::fill::{allocate_output, FillEngine, FillStats};
use crate::grid::DEFAULT_GROUP_WIDTH;
use crate::output::{write_values_npy, ValuesWriter};
use crate::windows::{common_span, group_by_chromosome, read_windows, Window};
use ndarray::{Array2, Axis};
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Statistics from a values run.
#[derive(Debug, Default, Clone)]
pub struct ValuesStats {
    pub windows: usize,
    pub sequence_length: u64,
    pub chromosomes: usize,
    pub missing_chromosomes: usize,
    pub track_intervals: usize,
    pub fill: FillStats,
}

impl fmt::Display for ValuesStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Windows: {}, Length: {}, Chroms: {} ({} not in track), Track intervals: {}, Units: {}, Cells written: {}",
            self.windows,
            self.sequence_length,
            self.chromosomes,
            self.missing_chromosomes,
            self.track_intervals,
            self.fill.plan.units,
            self.fill.cells_written
        )
    }
}

/// Dense values command.
#[derive(Debug, Clone)]
pub struct ValuesCommand {
    /// Maximum units per group when sizing launches
    pub group_width: usize,
    /// Use the sequential flat-grid walk instead of the row-parallel pass
    pub grid: bool,
}

impl Default for ValuesCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuesCommand {
    pub fn new() -> Self {
        Self {
            group_width: DEFAULT_GROUP_WIDTH,
            grid: false,
        }
    }

    /// Engine for `tracks`; tracks already validated at load are not
    /// checked again per chromosome.
    fn engine(&self, tracks: &TrackSet) -> FillEngine {
        let engine = FillEngine::new().with_group_width(self.group_width);
        let validate = engine.validate && !tracks.is_validated();
        engine.with_validation(validate)
    }

    /// Compute the `(windows, sequence_length)` array for `windows`.
    pub fn compute(&self, tracks: &TrackSet, windows: &[Window]) -> Result<(Array2<f32>, ValuesStats)> {
        let sequence_length = common_span(windows)?;
        let mut out = Array2::<f32>::zeros((windows.len(), sequence_length as usize));
        let mut stats = ValuesStats {
            windows: windows.len(),
            sequence_length,
            track_intervals: tracks.total_intervals(),
            ..Default::default()
        };

        let engine = self.engine(tracks);
        for group in group_by_chromosome(windows)? {
            stats.chromosomes += 1;

            let Some(track) = tracks.get(&group.chrom) else {
                log::warn!(
                    "{}: not in track, {} window(s) left at zero",
                    group.chrom,
                    group.rows.len()
                );
                stats.missing_chromosomes += 1;
                continue;
            };

            let mut block = allocate_output::<f32>(&group.batch);
            let fill = if self.grid {
                engine.fill_grid_with_stats(track, &group.batch, &mut block)?
            } else {
                engine.fill_with_stats(track, &group.batch, &mut block)?
            };
            log::debug!("{}: {}", group.chrom, fill);
            stats.fill += &fill;

            for (local, &row) in group.rows.iter().enumerate() {
                out.index_axis_mut(Axis(0), row)
                    .assign(&block.index_axis(Axis(0), local));
            }
        }

        log::info!("values: {}", stats);
        Ok((out, stats))
    }

    /// Run on files, writing tab-separated rows to `output`.
    pub fn run<P: AsRef<Path>, W: Write>(
        &self,
        track_path: P,
        windows_path: P,
        output: &mut W,
    ) -> Result<ValuesStats> {
        let tracks = read_track_set(track_path)?;
        let windows = read_windows(windows_path)?;
        let (values, stats) = self.compute(&tracks, &windows)?;

        let mut writer = ValuesWriter::new(output);
        writer.write_all(&windows, &values)?;
        writer.flush()?;

        Ok(stats)
    }

    /// Run on files, writing the dense array to a `.npy` file.
    pub fn run_npy<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        track_path: P,
        windows_path: P,
        npy_path: Q,
    ) -> Result<ValuesStats> {
        let tracks = read_track_set(track_path)?;
        let windows = read_windows(windows_path)?;
        let (values, stats) = self.compute(&tracks, &windows)?;

        write_values_npy(npy_path, &values)?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bedgraph::{parse_track_set, BedGraphRecord};
    use crate::config;
    use crate::error::ValuesError;
    use serial_test::serial;
    use crate::windows::parse_windows;
    use ndarray::array;

    fn sample_tracks() -> TrackSet {
        parse_track_set("chr1\t0\t5\t1\nchr1\t10\t15\t2\nchr1\t20\t25\t3\nchr2\t0\t3\t9\n")
            .unwrap()
    }

    #[test]
    fn test_compute_multi_chrom_keeps_input_order() {
        let windows = parse_windows("chr2\t0\t4\nchr1\t8\t12\nchrX\t0\t4\nchr1\t22\t26\n").unwrap();
        let (values, stats) = ValuesCommand::new().compute(&sample_tracks(), &windows).unwrap();

        assert_eq!(
            values,
            array![
                [9.0, 9.0, 9.0, 0.0],
                [0.0, 0.0, 2.0, 2.0],
                [0.0, 0.0, 0.0, 0.0],
                [3.0, 3.0, 3.0, 0.0]
            ]
        );
        assert_eq!(stats.windows, 4);
        assert_eq!(stats.chromosomes, 3);
        assert_eq!(stats.missing_chromosomes, 1);
        assert_eq!(stats.fill.cells_written, 3 + 2 + 3);
    }

    #[test]
    fn test_grid_mode_matches() {
        let windows = parse_windows("chr1\t3\t13\nchr1\t12\t22\nchr2\t1\t11\n").unwrap();
        let tracks = sample_tracks();

        let (parallel, _) = ValuesCommand::new().compute(&tracks, &windows).unwrap();
        let grid_cmd = ValuesCommand {
            group_width: 7,
            grid: true,
        };
        let (grid, _) = grid_cmd.compute(&tracks, &windows).unwrap();

        assert_eq!(parallel, grid);
    }

    #[test]
    fn test_grid_mode_reports_stats() {
        let tracks = parse_track_set("chr1\t0\t5\t1\nchr1\t10\t15\t2\n").unwrap();
        let windows = parse_windows("chr1\t8\t18\n").unwrap();

        let (_, parallel) = ValuesCommand::new().compute(&tracks, &windows).unwrap();
        let grid_cmd = ValuesCommand {
            group_width: DEFAULT_GROUP_WIDTH,
            grid: true,
        };
        let (_, grid) = grid_cmd.compute(&tracks, &windows).unwrap();

        assert_eq!(parallel.fill.plan.units, 5);
        assert_eq!(parallel.fill.cells_written, 5);
        assert_eq!(grid.fill, parallel.fill);
        assert_eq!(grid.to_string(), parallel.to_string());
    }

    #[test]
    #[serial]
    fn test_engine_skips_revalidating_loaded_tracks() {
        config::set_validate_inputs(true);
        let loaded = parse_track_set("chr1\t0\t5\t1\nchr1\t10\t15\t2\n");
        let engine_for_loaded = loaded.as_ref().map(|t| ValuesCommand::new().engine(t));

        let mut pushed = TrackSet::new();
        pushed.push(BedGraphRecord {
            chrom: "chr1".to_string(),
            start: 0,
            end: 5,
            value: 1.0,
        });
        let engine_for_pushed = ValuesCommand::new().engine(&pushed);
        config::set_validate_inputs(false);

        let loaded = loaded.as_ref().unwrap();
        assert!(loaded.is_validated());
        assert!(!engine_for_loaded.unwrap().validate);

        assert!(!pushed.is_validated());
        assert!(engine_for_pushed.validate);

        // Validation off: nothing is checked either way
        assert!(!ValuesCommand::new().engine(&pushed).validate);
    }

    #[test]
    fn test_non_uniform_windows_rejected() {
        let windows = parse_windows("chr1\t0\t10\nchr1\t0\t11\n").unwrap();
        let result = ValuesCommand::new().compute(&sample_tracks(), &windows);
        assert!(matches!(result, Err(ValuesError::NonUniformSpan { .. })));
    }

    #[test]
    fn test_no_windows() {
        let (values, stats) = ValuesCommand::new().compute(&sample_tracks(), &[]).unwrap();
        assert_eq!(values.dim(), (0, 0));
        assert_eq!(stats.chromosomes, 0);
    }
}
