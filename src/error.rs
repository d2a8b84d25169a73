//! Error type shared by the locator, the fill engine and the file surface.

use std::io;
use thiserror::Error;

/// Errors that can occur while building inputs or filling dense values.
#[derive(Error, Debug)]
pub enum ValuesError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Length mismatch for {what}: expected {expected}, got {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Query {index} spans {found} bp but the batch sequence length is {expected} bp")]
    NonUniformSpan {
        index: usize,
        expected: u64,
        found: u64,
    },

    #[error("Query {index} is invalid: end ({end}) < start ({start})")]
    InvalidQuery { index: usize, start: u64, end: u64 },

    #[error("Output has shape {found:?} but the batch needs {expected:?}")]
    OutputShape {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Output array must be in standard (row-major, contiguous) layout")]
    NonContiguousOutput,

    #[error("Track not sorted: interval {index} starts before the interval preceding it")]
    UnsortedTrack { index: usize },

    #[error("Track interval {index} overlaps the interval preceding it")]
    OverlappingIntervals { index: usize },

    #[error("Track interval {index} is empty (end <= start)")]
    EmptyInterval { index: usize },

    #[error("Grid of {batch_size} x {max_number_intervals} x {max_interval_length} units overflows usize")]
    GridOverflow {
        batch_size: usize,
        max_number_intervals: usize,
        max_interval_length: usize,
    },

    #[error("Failed to write npy output: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),
}

pub type Result<T> = std::result::Result<T, ValuesError>;
