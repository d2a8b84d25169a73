//! Interval-encoded signal tracks.

use crate::error::{Result, ValuesError};
use num_traits::Zero;

/// Value types that can be stored in a [`Track`] and scattered into a dense
/// output buffer.
pub trait TrackValue: Copy + Zero + Send + Sync {}

impl<T: Copy + Zero + Send + Sync> TrackValue for T {}

/// A sparse signal track: index-aligned `[start, end) -> value` records.
/// Uses 0-based, half-open coordinates (BED format).
///
/// Intervals are expected to be sorted by start and pairwise disjoint.
/// This is not checked on construction; call [`Track::validate`] when the
/// input is not trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<V> {
    starts: Vec<u64>,
    ends: Vec<u64>,
    values: Vec<V>,
}

impl<V: TrackValue> Track<V> {
    /// Create a track from three index-aligned vectors.
    pub fn new(starts: Vec<u64>, ends: Vec<u64>, values: Vec<V>) -> Result<Self> {
        if ends.len() != starts.len() {
            return Err(ValuesError::LengthMismatch {
                what: "track ends",
                expected: starts.len(),
                found: ends.len(),
            });
        }
        if values.len() != starts.len() {
            return Err(ValuesError::LengthMismatch {
                what: "track values",
                expected: starts.len(),
                found: values.len(),
            });
        }
        Ok(Self {
            starts,
            ends,
            values,
        })
    }

    /// Create an empty track.
    pub fn empty() -> Self {
        Self {
            starts: Vec::new(),
            ends: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build a track from `(start, end, value)` records.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64, V)>,
    {
        let mut track = Self::empty();
        for (start, end, value) in records {
            track.push(start, end, value);
        }
        track
    }

    /// Append one record. The caller keeps the records sorted.
    #[inline]
    pub fn push(&mut self, start: u64, end: u64, value: V) {
        self.starts.push(start);
        self.ends.push(end);
        self.values.push(value);
    }

    #[inline]
    pub fn starts(&self) -> &[u64] {
        &self.starts
    }

    #[inline]
    pub fn ends(&self) -> &[u64] {
        &self.ends
    }

    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Get the number of intervals.
    #[inline]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Check if the track has no intervals.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Longest interval in the track, 0 for an empty track.
    pub fn max_interval_length(&self) -> u64 {
        self.starts
            .iter()
            .zip(&self.ends)
            .map(|(&s, &e)| e.saturating_sub(s))
            .max()
            .unwrap_or(0)
    }

    /// Iterate over `(start, end, value)` records.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64, V)> + '_ {
        self.starts
            .iter()
            .zip(&self.ends)
            .zip(&self.values)
            .map(|((&s, &e), &v)| (s, e, v))
    }

    /// Check the sorted, non-empty, pairwise-disjoint precondition.
    ///
    /// Returns the first offending interval index.
    pub fn validate(&self) -> Result<()> {
        for (idx, (&start, &end)) in self.starts.iter().zip(&self.ends).enumerate() {
            if end <= start {
                return Err(ValuesError::EmptyInterval { index: idx });
            }
            if idx > 0 {
                if start < self.starts[idx - 1] {
                    return Err(ValuesError::UnsortedTrack { index: idx });
                }
                if start < self.ends[idx - 1] {
                    return Err(ValuesError::OverlappingIntervals { index: idx });
                }
            }
        }
        Ok(())
    }
}

impl<V: TrackValue> Default for Track<V> {
    fn default() -> Self {
        Self::empty()
    }
}
