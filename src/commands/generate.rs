//! Generate a synthetic bedGraph track and matching query windows.
//!
//! Writes `track.bedGraph` and `windows.bed` into the output directory.
//! Output is deterministic for a given seed.

use crate::error::{Result, ValuesError};
use crate::synthetic::{random_batch, random_track};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

/// Buffer size for I/O operations (8MB for better throughput)
const BUF_SIZE: usize = 8 * 1024 * 1024;

/// Configuration for the generate command.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub output_dir: PathBuf,
    pub intervals: usize,
    pub windows: usize,
    pub sequence_length: u64,
    pub chroms: usize,
    pub seed: u64,
    pub len_min: u64,
    pub len_max: u64,
    pub gap_max: u64,
    pub force: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./trackfill_data"),
            intervals: 100_000,
            windows: 1_000,
            sequence_length: 1_000,
            chroms: 3,
            seed: 42,
            len_min: 1,
            len_max: 500,
            gap_max: 200,
            force: false,
        }
    }
}

/// Statistics from generate operation.
#[derive(Debug, Default, Clone)]
pub struct GenerateStats {
    pub intervals: usize,
    pub windows: usize,
    pub chroms: usize,
    pub elapsed_secs: f64,
}

impl fmt::Display for GenerateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Intervals: {}, Windows: {}, Chroms: {}, Time: {:.2}s",
            self.intervals, self.windows, self.chroms, self.elapsed_secs
        )
    }
}

/// Synthetic dataset generator.
pub struct GenerateCommand {
    config: GenerateConfig,
}

impl GenerateCommand {
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    pub fn track_path(&self) -> PathBuf {
        self.config.output_dir.join("track.bedGraph")
    }

    pub fn windows_path(&self) -> PathBuf {
        self.config.output_dir.join("windows.bed")
    }

    pub fn run(&self) -> Result<GenerateStats> {
        let cfg = &self.config;
        if cfg.chroms == 0 {
            return Err(ValuesError::InvalidFormat(
                "--chroms must be at least 1".to_string(),
            ));
        }
        if cfg.len_min > cfg.len_max {
            return Err(ValuesError::InvalidFormat(format!(
                "--len-min ({}) > --len-max ({})",
                cfg.len_min, cfg.len_max
            )));
        }

        let track_path = self.track_path();
        let windows_path = self.windows_path();
        if !cfg.force && (track_path.exists() || windows_path.exists()) {
            return Err(ValuesError::InvalidFormat(format!(
                "Output files exist in {} (use --force to overwrite)",
                cfg.output_dir.display()
            )));
        }
        fs::create_dir_all(&cfg.output_dir)?;

        let start = Instant::now();
        let mut rng = SmallRng::seed_from_u64(cfg.seed);
        let mut track_out = BufWriter::with_capacity(BUF_SIZE, File::create(&track_path)?);
        let mut windows_out = BufWriter::with_capacity(BUF_SIZE, File::create(&windows_path)?);
        let mut itoa_buf = itoa::Buffer::new();
        let mut ryu_buf = ryu::Buffer::new();

        writeln!(track_out, "track type=bedGraph")?;

        for c in 0..cfg.chroms {
            let chrom = format!("chr{}", c + 1);
            // Spread the remainder over the first chromosomes
            let n_intervals = cfg.intervals / cfg.chroms + usize::from(c < cfg.intervals % cfg.chroms);
            let n_windows = cfg.windows / cfg.chroms + usize::from(c < cfg.windows % cfg.chroms);

            let track = random_track(&mut rng, n_intervals, cfg.len_min..=cfg.len_max, 0..=cfg.gap_max);
            for (s, e, v) in track.iter() {
                track_out.write_all(chrom.as_bytes())?;
                track_out.write_all(b"\t")?;
                track_out.write_all(itoa_buf.format(s).as_bytes())?;
                track_out.write_all(b"\t")?;
                track_out.write_all(itoa_buf.format(e).as_bytes())?;
                track_out.write_all(b"\t")?;
                track_out.write_all(ryu_buf.format(v).as_bytes())?;
                track_out.write_all(b"\n")?;
            }

            // Windows may run past the last interval so some rows end in zeros
            let extent = track.ends().last().copied().unwrap_or(0) + cfg.sequence_length;
            let batch = random_batch(&mut rng, n_windows, cfg.sequence_length, extent);
            for (&s, &e) in batch.starts().iter().zip(batch.ends()) {
                windows_out.write_all(chrom.as_bytes())?;
                windows_out.write_all(b"\t")?;
                windows_out.write_all(itoa_buf.format(s).as_bytes())?;
                windows_out.write_all(b"\t")?;
                windows_out.write_all(itoa_buf.format(e).as_bytes())?;
                windows_out.write_all(b"\n")?;
            }

            log::debug!("{}: {} intervals, {} windows", chrom, n_intervals, n_windows);
        }

        track_out.flush()?;
        windows_out.flush()?;

        let stats = GenerateStats {
            intervals: cfg.intervals,
            windows: cfg.windows,
            chroms: cfg.chroms,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        log::info!("generate: {}", stats);
        Ok(stats)
    }
}
