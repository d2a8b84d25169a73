//! bedGraph track reader.
//!
//! Reads `chrom start end value` records into one [`Track`] per chromosome.
//! Large files are memory-mapped and split on newlines with `memchr`;
//! small files and stdin go through a buffered line reader.

use crate::config;
use crate::error::{Result, ValuesError};
use crate::track::Track;
use memchr::memchr;
use memmap2::Mmap;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Minimum file size to use mmap (smaller files use buffered I/O)
const MMAP_THRESHOLD: u64 = 64 * 1024;

/// Minimum records to trigger parallel parsing
const PARALLEL_THRESHOLD: usize = 10_000;

/// One bedGraph record.
#[derive(Debug, Clone, PartialEq)]
pub struct BedGraphRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub value: f32,
}

/// True for blank, comment, `track` and `browser` lines.
#[inline]
pub(crate) fn is_header(line: &[u8]) -> bool {
    line.is_empty()
        || line[0] == b'#'
        || line.starts_with(b"track")
        || line.starts_with(b"browser")
}

/// Split on tabs or spaces, dropping empty fields.
#[inline]
pub(crate) fn fields(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|&b| b == b'\t' || b == b' ')
        .filter(|f| !f.is_empty())
}

pub(crate) fn parse_position(field: &[u8], name: &str, line: usize) -> Result<u64> {
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ValuesError::Parse {
            line,
            message: format!(
                "Invalid {} position: '{}'",
                name,
                String::from_utf8_lossy(field)
            ),
        })
}

/// Parse one non-header bedGraph line.
pub fn parse_line(line: &[u8], line_number: usize) -> Result<BedGraphRecord> {
    let mut it = fields(line);
    let (chrom, start, end, value) = match (it.next(), it.next(), it.next(), it.next()) {
        (Some(c), Some(s), Some(e), Some(v)) => (c, s, e, v),
        _ => {
            return Err(ValuesError::Parse {
                line: line_number,
                message: format!(
                    "Expected 4 fields (chrom, start, end, value), got {}",
                    fields(line).count()
                ),
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

    let value: f32 = std::str::from_utf8(value)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ValuesError::Parse {
            line: line_number,
            message: format!("Invalid value: '{}'", String::from_utf8_lossy(value)),
        })?;

    Ok(BedGraphRecord {
        chrom: String::from_utf8_lossy(chrom).into_owned(),
        start,
        end,
        value,
    })
}

/// A streaming bedGraph reader.
pub struct BedGraphReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: Vec<u8>,
}

impl BedGraphReader<File> {
    /// Open a bedGraph file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> BedGraphReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: Vec::with_capacity(256),
        }
    }

    /// Read the next record, skipping headers.
    pub fn read_record(&mut self) -> Result<Option<BedGraphRecord>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_until(b'\n', &mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim_ascii();
            if is_header(line) {
                continue;
            }

            return parse_line(line, self.line_number).map(Some);
        }
    }

    /// Get an iterator over all records.
    pub fn records(self) -> BedGraphRecordIter<R> {
        BedGraphRecordIter { reader: self }
    }
}

/// Iterator over bedGraph records.
pub struct BedGraphRecordIter<R: Read> {
    reader: BedGraphReader<R>,
}

impl<R: Read> Iterator for BedGraphRecordIter<R> {
    type Item = Result<BedGraphRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

/// Scan for non-header lines: `(line_number, start, end)` byte offsets.
pub(crate) fn find_line_offsets(data: &[u8]) -> Vec<(usize, usize, usize)> {
    let mut offsets = Vec::with_capacity(data.len() / 32);
    let mut pos = 0;
    let mut line_number = 0;

    while pos < data.len() {
        line_number += 1;
        let line_end = memchr(b'\n', &data[pos..]).map_or(data.len(), |off| pos + off);
        let line = data[pos..line_end].trim_ascii();
        if !is_header(line) {
            let start = line.as_ptr() as usize - data.as_ptr() as usize;
            offsets.push((line_number, start, start + line.len()));
        }
        pos = line_end + 1;
    }

    offsets
}

/// Per-chromosome tracks built from one bedGraph file.
#[derive(Debug, Clone, Default)]
pub struct TrackSet {
    tracks: FxHashMap<String, Track<f32>>,
    /// Chromosomes in order of first appearance
    order: Vec<String>,
    /// Set once every track passed `validate`; cleared by `push`
    validated: bool,
}

impl TrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records. Records of a chromosome are expected in ascending,
    /// non-overlapping order; with validation enabled each track is checked.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = BedGraphRecord>,
    {
        let mut set = Self::new();
        for rec in records {
            set.push(rec);
        }
        if config::is_validate_inputs() {
            set.validate()?;
            set.validated = true;
        }
        Ok(set)
    }

    /// Append one record to its chromosome's track.
    pub fn push(&mut self, rec: BedGraphRecord) {
        self.validated = false;
        if let Some(track) = self.tracks.get_mut(&rec.chrom) {
            track.push(rec.start, rec.end, rec.value);
            return;
        }
        let mut track = Track::empty();
        track.push(rec.start, rec.end, rec.value);
        self.order.push(rec.chrom.clone());
        self.tracks.insert(rec.chrom, track);
    }

    /// Check every chromosome's track, naming the chromosome on failure.
    pub fn validate(&self) -> Result<()> {
        for chrom in &self.order {
            self.tracks[chrom]
                .validate()
                .map_err(|e| ValuesError::InvalidFormat(format!("{}: {}", chrom, e)))?;
        }
        Ok(())
    }

    /// True when every track was checked sorted and non-overlapping at load.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn get(&self, chrom: &str) -> Option<&Track<f32>> {
        self.tracks.get(chrom)
    }

    /// Chromosomes in order of first appearance.
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Total number of intervals across chromosomes.
    pub fn total_intervals(&self) -> usize {
        self.tracks.values().map(|t| t.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Read a bedGraph file into per-chromosome tracks.
pub fn read_track_set<P: AsRef<Path>>(path: P) -> Result<TrackSet> {
    let file = File::open(path.as_ref())?;
    let file_size = file.metadata()?.len();

    if file_size >= MMAP_THRESHOLD {
        // SAFETY: the map is read-only and dropped before returning; the
        // file is not expected to be truncated while it is being parsed.
        let mmap = unsafe { Mmap::map(&file)? };
        parse_track_set_bytes(&mmap)
    } else {
        let records = BedGraphReader::new(file)
            .records()
            .collect::<Result<Vec<_>>>()?;
        TrackSet::from_records(records)
    }
}

/// Read bedGraph records from any reader (e.g. stdin).
pub fn read_track_set_from<R: Read>(reader: R) -> Result<TrackSet> {
    let records = BedGraphReader::new(reader)
        .records()
        .collect::<Result<Vec<_>>>()?;
    TrackSet::from_records(records)
}

/// Parse bedGraph content held in memory.
pub fn parse_track_set_bytes(data: &[u8]) -> Result<TrackSet> {
    let offsets = find_line_offsets(data);

    let records = if offsets.len() >= PARALLEL_THRESHOLD {
        offsets
            .par_iter()
            .map(|&(line, start, end)| parse_line(&data[start..end], line))
            .collect::<Result<Vec<_>>>()?
    } else {
        offsets
            .iter()
            .map(|&(line, start, end)| parse_line(&data[start..end], line))
            .collect::<Result<Vec<_>>>()?
    };

    TrackSet::from_records(records)
}

/// Parse bedGraph content from a string (useful for testing).
pub fn parse_track_set(content: &str) -> Result<TrackSet> {
    parse_track_set_bytes(content.as_bytes())
}
