//! Batches of fixed-length query windows.

use crate::error::{Result, ValuesError};

/// A batch of query windows that all share one span.
///
/// The uniform span is enforced on construction, so
/// [`QueryBatch::sequence_length`] can be read off the first window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryBatch {
    starts: Vec<u64>,
    ends: Vec<u64>,
}

impl QueryBatch {
    /// Create a batch from window starts and ends.
    pub fn new(starts: Vec<u64>, ends: Vec<u64>) -> Result<Self> {
        if ends.len() != starts.len() {
            return Err(ValuesError::LengthMismatch {
                what: "query ends",
                expected: starts.len(),
                found: ends.len(),
            });
        }

        if let (Some(&first_start), Some(&first_end)) = (starts.first(), ends.first()) {
            if first_end < first_start {
                return Err(ValuesError::InvalidQuery {
                    index: 0,
                    start: first_start,
                    end: first_end,
                });
            }
            let expected = first_end - first_start;
            for (idx, (&start, &end)) in starts.iter().zip(&ends).enumerate().skip(1) {
                if end < start {
                    return Err(ValuesError::InvalidQuery { index: idx, start, end });
                }
                if end - start != expected {
                    return Err(ValuesError::NonUniformSpan {
                        index: idx,
                        expected,
                        found: end - start,
                    });
                }
            }
        }

        Ok(Self { starts, ends })
    }

    /// Create a batch of windows of `sequence_length` bp beginning at `starts`.
    pub fn from_starts(starts: Vec<u64>, sequence_length: u64) -> Self {
        let ends = starts.iter().map(|&s| s + sequence_length).collect();
        Self { starts, ends }
    }

    #[inline]
    pub fn starts(&self) -> &[u64] {
        &self.starts
    }

    #[inline]
    pub fn ends(&self) -> &[u64] {
        &self.ends
    }

    /// Number of windows in the batch.
    #[inline]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Span of every window, measured on the first one. 0 for an empty batch.
    #[inline]
    pub fn sequence_length(&self) -> u64 {
        match (self.starts.first(), self.ends.first()) {
            (Some(&start), Some(&end)) => end - start,
            _ => 0,
        }
    }
}
