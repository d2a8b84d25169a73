//! Writers for dense value rows.
//!
//! Text output uses itoa for coordinates and ryu for values to avoid
//! allocation per cell. Binary output is a `.npy` array of shape
//! `(windows, sequence_length)`.

use crate::error::Result;
use crate::windows::Window;
use ndarray::{Array2, ArrayView1};
use ndarray_npy::write_npy;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Buffer size for ValuesWriter (1MB default).
const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Tab-separated row writer: `chrom start end v0 v1 ... vN`.
pub struct ValuesWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    ryu_buf: ryu::Buffer,
}

impl<W: Write> ValuesWriter<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            ryu_buf: ryu::Buffer::new(),
        }
    }

    /// Write one window followed by its values.
    pub fn write_row(&mut self, window: &Window, values: ArrayView1<'_, f32>) -> Result<()> {
        self.writer.write_all(window.chrom.as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer
            .write_all(self.itoa_buf.format(window.start).as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer
            .write_all(self.itoa_buf.format(window.end).as_bytes())?;
        for &v in values.iter() {
            self.writer.write_all(b"\t")?;
            self.write_value(v)?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write every row of `values`, labelled by the matching window.
    pub fn write_all(&mut self, windows: &[Window], values: &Array2<f32>) -> Result<()> {
        for (window, row) in windows.iter().zip(values.rows()) {
            self.write_row(window, row)?;
        }
        Ok(())
    }

    /// Zero is written as `0` rather than `0.0` to keep sparse rows compact.
    #[inline]
    fn write_value(&mut self, v: f32) -> Result<()> {
        if v == 0.0 {
            self.writer.write_all(b"0")?;
        } else {
            self.writer.write_all(self.ryu_buf.format(v).as_bytes())?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Write the dense array as a `.npy` file.
pub fn write_values_npy<P: AsRef<Path>>(path: P, values: &Array2<f32>) -> Result<()> {
    write_npy(path, values)?;
    Ok(())
}
