//! Query windows read from BED3 files and grouped into per-chromosome batches.

use crate::bedgraph::{fields, is_header, parse_position};
use crate::error::{Result, ValuesError};
use crate::query::QueryBatch;
use rustc_hash::FxHashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A query window. 0-based, half-open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Window {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Window {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.start, self.end)
    }
}

/// Read windows from any reader. Columns past the third are ignored.
pub fn read_windows_from<R: Read>(reader: R) -> Result<Vec<Window>> {
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::with_capacity(256);
    let mut line_number = 0;
    let mut windows = Vec::new();

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        line_number += 1;

        let line = buffer.trim_ascii();
        if is_header(line) {
            continue;
        }

        let mut it = fields(line);
        let (chrom, start, end) = match (it.next(), it.next(), it.next()) {
            (Some(c), Some(s), Some(e)) => (c, s, e),
            _ => {
                return Err(ValuesError::Parse {
                    line: line_number,
                    message: format!("Expected at least 3 fields, got {}", fields(line).count()),
                })
            }
        };
        let start = parse_position(start, "start", line_number)?;
        let end = parse_position(end, "end", line_number)?;
        if start > end {
            return Err(ValuesError::Parse {
                line: line_number,
                message: format!("Start ({}) > end ({})", start, end),
            });
        }

        windows.push(Window {
            chrom: String::from_utf8_lossy(chrom).into_owned(),
            start,
            end,
        });
    }

    Ok(windows)
}

/// Read windows from a BED file.
pub fn read_windows<P: AsRef<Path>>(path: P) -> Result<Vec<Window>> {
    read_windows_from(File::open(path)?)
}

/// Parse windows from a string (useful for testing).
pub fn parse_windows(content: &str) -> Result<Vec<Window>> {
    read_windows_from(content.as_bytes())
}

/// The span shared by all windows, 0 when there are none.
pub fn common_span(windows: &[Window]) -> Result<u64> {
    let Some(first) = windows.first() else {
        return Ok(0);
    };
    let expected = first.len();
    for (idx, w) in windows.iter().enumerate().skip(1) {
        if w.len() != expected {
            return Err(ValuesError::NonUniformSpan {
                index: idx,
                expected,
                found: w.len(),
            });
        }
    }
    Ok(expected)
}

/// Windows of one chromosome, with each window's row in the input order.
#[derive(Debug, Clone)]
pub struct ChromBatch {
    pub chrom: String,
    pub rows: Vec<usize>,
    pub batch: QueryBatch,
}

/// Group windows by chromosome, preserving first-appearance order of
/// chromosomes and input order within each chromosome.
pub fn group_by_chromosome(windows: &[Window]) -> Result<Vec<ChromBatch>> {
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();

    for (row, w) in windows.iter().enumerate() {
        let slot = *index.entry(w.chrom.as_str()).or_insert_with(|| {
            groups.push((w.chrom.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }

    groups
        .into_iter()
        .map(|(chrom, rows)| {
            let starts = rows.iter().map(|&r| windows[r].start).collect();
            let ends = rows.iter().map(|&r| windows[r].end).collect();
            Ok(ChromBatch {
                chrom: chrom.to_string(),
                rows,
                batch: QueryBatch::new(starts, ends)?,
            })
        })
        .collect()
}
