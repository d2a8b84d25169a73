//! Parallel fill engine: dense per-window values from a sparse track.
//!
//! The engine locates each window's candidate intervals, sizes the unit
//! space from the located ranges, zeroes the output, and scatters each
//! interval's value over its clipped span in the window's row.
//!
//! # Race freedom
//!
//! Track intervals are pairwise disjoint, so within one row every interval
//! writes a disjoint run of cells, and rows never share cells. The output
//! is split into per-row mutable slices and rows are filled in parallel on
//! the rayon pool; no unit ever touches another row's slice. Small batches
//! carve each row further into per-span slices with `split_at_mut`.

use crate::config;
use crate::error::{Result, ValuesError};
use crate::grid::{clip, ClippedSpan, GridDims, LaunchConfig, DEFAULT_GROUP_WIDTH};
use crate::locate::{locate, LocatedRanges};
use crate::query::QueryBatch;
use crate::track::{Track, TrackValue};
use ndarray::Array2;
use rayon::prelude::*;
use std::fmt;

/// Sizing of one fill pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillPlan {
    pub dims: GridDims,
    pub units: usize,
    pub launch: LaunchConfig,
}

/// Statistics from a fill pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FillStats {
    pub plan: FillPlan,
    pub cells_written: usize,
}

impl fmt::Display for FillStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Windows: {}, Length: {}, Max intervals: {}, Max span: {}, Units: {}, Groups: {}x{}, Cells written: {}",
            self.plan.dims.batch_size,
            self.plan.dims.sequence_length,
            self.plan.dims.max_number_intervals,
            self.plan.dims.max_interval_length,
            self.plan.units,
            self.plan.launch.groups,
            self.plan.launch.group_width,
            self.cells_written
        )
    }
}

impl std::ops::AddAssign<&FillStats> for FillStats {
    fn add_assign(&mut self, other: &FillStats) {
        self.plan.dims.batch_size += other.plan.dims.batch_size;
        self.plan.dims.sequence_length = self
            .plan
            .dims
            .sequence_length
            .max(other.plan.dims.sequence_length);
        self.plan.dims.max_number_intervals = self
            .plan
            .dims
            .max_number_intervals
            .max(other.plan.dims.max_number_intervals);
        self.plan.dims.max_interval_length = self
            .plan
            .dims
            .max_interval_length
            .max(other.plan.dims.max_interval_length);
        self.plan.units += other.plan.units;
        self.plan.launch.groups += other.plan.launch.groups;
        self.plan.launch.group_width = self
            .plan
            .launch
            .group_width
            .max(other.plan.launch.group_width);
        self.cells_written += other.cells_written;
    }
}

/// Allocate a zeroed output buffer shaped for `batch`.
pub fn allocate_output<V: TrackValue>(batch: &QueryBatch) -> Array2<V> {
    Array2::zeros((batch.len(), batch.sequence_length() as usize))
}

/// Fill `out` with dense values using the default engine.
///
/// Convenience wrapper around [`FillEngine::fill`].
pub fn intervals_to_values<'a, V: TrackValue>(
    track: &Track<V>,
    batch: &QueryBatch,
    out: &'a mut Array2<V>,
) -> Result<&'a mut Array2<V>> {
    FillEngine::new().fill(track, batch, out)
}

/// The dense fill engine.
#[derive(Debug, Clone)]
pub struct FillEngine {
    /// Maximum units per group when sizing a launch
    pub group_width: usize,
    /// Check the track precondition before filling
    pub validate: bool,
}

impl Default for FillEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FillEngine {
    /// Create an engine with the default group width. Validation follows
    /// [`config::is_validate_inputs`].
    pub fn new() -> Self {
        Self {
            group_width: DEFAULT_GROUP_WIDTH,
            validate: config::is_validate_inputs(),
        }
    }

    pub fn with_group_width(mut self, group_width: usize) -> Self {
        self.group_width = group_width.max(1);
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Size the unit space and launch for already-located ranges.
    pub fn plan<V: TrackValue>(
        &self,
        track: &Track<V>,
        batch: &QueryBatch,
        ranges: &LocatedRanges,
    ) -> Result<FillPlan> {
        let dims = GridDims::new(track, batch, ranges);
        let units = dims.total_units()?;
        let launch = LaunchConfig::for_units(units, self.group_width);
        Ok(FillPlan {
            dims,
            units,
            launch,
        })
    }

    /// Fill `out` in place and return it for chaining.
    pub fn fill<'a, V: TrackValue>(
        &self,
        track: &Track<V>,
        batch: &QueryBatch,
        out: &'a mut Array2<V>,
    ) -> Result<&'a mut Array2<V>> {
        self.fill_with_stats(track, batch, out)?;
        Ok(out)
    }

    /// Fill `out` in place, row-parallel, and report what the pass did.
    ///
    /// When the batch has fewer rows than the pool has threads, each row is
    /// further split into its interval spans and those are filled in
    /// parallel.
    pub fn fill_with_stats<V: TrackValue>(
        &self,
        track: &Track<V>,
        batch: &QueryBatch,
        out: &mut Array2<V>,
    ) -> Result<FillStats> {
        let (ranges, plan) = self.prepare(track, batch, out)?;
        let dims = plan.dims;

        if dims.is_empty() || dims.sequence_length == 0 {
            return Ok(FillStats {
                plan,
                cells_written: 0,
            });
        }
        let cells = out.as_slice_mut().ok_or(ValuesError::NonContiguousOutput)?;

        let split_rows =
            dims.max_number_intervals > 1 && dims.batch_size < rayon::current_num_threads();
        if split_rows {
            log::trace!("splitting {} row(s) across interval spans", dims.batch_size);
        }

        let cells_written = cells
            .par_chunks_mut(dims.sequence_length)
            .enumerate()
            .map(|(i, row)| {
                let spans = (0..dims.max_number_intervals)
                    .map_while(|j| clip(track, batch, &ranges, i, j));
                if split_rows {
                    fill_row_split(row, spans)
                } else {
                    fill_row(row, spans)
                }
            })
            .sum();

        let stats = FillStats {
            plan,
            cells_written,
        };
        log::debug!("fill: {}", stats);
        Ok(stats)
    }

    /// Fill `out` by walking every slot of the flat launch sequentially.
    ///
    /// Each slot decodes its own unit and applies the per-unit rule, so
    /// overshoot slots past the unit count are exercised as no-ops. Slow;
    /// meant for debugging launches.
    pub fn fill_grid<'a, V: TrackValue>(
        &self,
        track: &Track<V>,
        batch: &QueryBatch,
        out: &'a mut Array2<V>,
    ) -> Result<&'a mut Array2<V>> {
        self.fill_grid_with_stats(track, batch, out)?;
        Ok(out)
    }

    /// [`FillEngine::fill_grid`], reporting the plan and the cells written.
    pub fn fill_grid_with_stats<V: TrackValue>(
        &self,
        track: &Track<V>,
        batch: &QueryBatch,
        out: &mut Array2<V>,
    ) -> Result<FillStats> {
        let (ranges, plan) = self.prepare(track, batch, out)?;
        let dims = plan.dims;

        if dims.is_empty() {
            return Ok(FillStats {
                plan,
                cells_written: 0,
            });
        }
        let cells = out.as_slice_mut().ok_or(ValuesError::NonContiguousOutput)?;

        let mut cells_written = 0;
        for slot in 0..plan.launch.total_slots() {
            let unit = dims.decode(slot);
            if let Some((column, value)) = unit.cell(track, batch, &ranges) {
                cells[unit.query * dims.sequence_length + column] = value;
                cells_written += 1;
            }
        }

        let stats = FillStats {
            plan,
            cells_written,
        };
        log::debug!("fill_grid: {}", stats);
        Ok(stats)
    }

    /// Shared setup: validate, check the output shape, zero it, locate and plan.
    fn prepare<V: TrackValue>(
        &self,
        track: &Track<V>,
        batch: &QueryBatch,
        out: &mut Array2<V>,
    ) -> Result<(LocatedRanges, FillPlan)> {
        if self.validate {
            track.validate()?;
        }

        let expected = (batch.len(), batch.sequence_length() as usize);
        if out.dim() != expected {
            return Err(ValuesError::OutputShape {
                expected,
                found: out.dim(),
            });
        }
        if !out.is_standard_layout() {
            return Err(ValuesError::NonContiguousOutput);
        }

        out.fill(V::zero());

        let ranges = locate(track, batch);
        let plan = self.plan(track, batch, &ranges)?;
        log::trace!(
            "plan: {} units in {} groups of {}",
            plan.units,
            plan.launch.groups,
            plan.launch.group_width
        );
        Ok((ranges, plan))
    }
}

/// Write each span's value over its cells, one span after another.
fn fill_row<V: TrackValue>(row: &mut [V], spans: impl Iterator<Item = ClippedSpan<V>>) -> usize {
    let mut written = 0;
    for span in spans {
        if span.is_empty() {
            continue;
        }
        row[span.start..span.end].fill(span.value);
        written += span.len();
    }
    written
}

/// Carve `row` into one disjoint slice per span and fill them in parallel.
///
/// Spans arrive in track order, so each starts at or after the previous
/// end. A span reaching back into an earlier one (unsorted, unvalidated
/// input) is trimmed to the uncarved tail.
fn fill_row_split<V: TrackValue>(
    row: &mut [V],
    spans: impl Iterator<Item = ClippedSpan<V>>,
) -> usize {
    let mut pieces = Vec::new();
    let mut rest = row;
    let mut offset = 0;

    for span in spans {
        let start = span.start.max(offset);
        let end = span.end.min(offset + rest.len());
        if start >= end {
            continue;
        }
        let (_, tail) = std::mem::take(&mut rest).split_at_mut(start - offset);
        let (piece, tail) = tail.split_at_mut(end - start);
        pieces.push((piece, span.value));
        rest = tail;
        offset = end;
    }

    pieces
        .into_par_iter()
        .map(|(piece, value)| {
            piece.fill(value);
            piece.len()
        })
        .sum()
}
