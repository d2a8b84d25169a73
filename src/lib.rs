//! trackfill: dense per-window values from sparse genomic signal tracks.
//!
//! A track is a sorted list of non-overlapping `[start, end) -> value`
//! intervals (bedGraph style). Given a batch of equal-length query windows,
//! trackfill produces a `(windows, sequence_length)` array where cell
//! `[i, p]` holds the value of the interval covering `start_i + p`, or zero.
//!
//! # Features
//!
//! - **Binary-search locator**: per-window interval ranges in O(log n)
//! - **Row-parallel fill**: Rayon scatter with disjoint per-row writes
//! - **Any numeric value type**: `f32`, `f64`, integers via `num-traits`
//!
//! # Example
//!
//! ```rust
//! use trackfill::{allocate_output, intervals_to_values, QueryBatch, Track};
//!
//! let track = Track::new(vec![0, 10, 20], vec![5, 15, 25], vec![1.0f32, 2.0, 3.0]).unwrap();
//! let batch = QueryBatch::new(vec![8], vec![18]).unwrap();
//!
//! let mut out = allocate_output(&batch);
//! intervals_to_values(&track, &batch, &mut out).unwrap();
//!
//! assert_eq!(out.row(0).to_vec(), vec![0.0, 0.0, 2.0, 2.0, 2.0, 2.0, 2.0, 0.0, 0.0, 0.0]);
//! ```

pub mod bedgraph;
pub mod commands;
pub mod config;
pub mod error;
pub mod fill;
pub mod grid;
pub mod locate;
pub mod output;
pub mod query;
pub mod synthetic;
pub mod track;
pub mod windows;

#[cfg(test)]
mod reference;

// Re-export commonly used types
pub use error::{Result, ValuesError};
pub use fill::{allocate_output, intervals_to_values, FillEngine, FillStats};
pub use locate::{locate, LocatedRanges};
pub use query::QueryBatch;
pub use track::{Track, TrackValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bedgraph::{read_track_set, TrackSet};
    pub use crate::commands::{GenerateCommand, ValuesCommand};
    pub use crate::error::{Result, ValuesError};
    pub use crate::fill::{allocate_output, intervals_to_values, FillEngine};
    pub use crate::grid::{GridDims, LaunchConfig};
    pub use crate::locate::{locate, LocatedRanges};
    pub use crate::query::QueryBatch;
    pub use crate::track::Track;
    pub use crate::windows::{read_windows, Window};
}
