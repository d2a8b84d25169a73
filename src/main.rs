//! trackfill: dense per-window values from sparse genomic signal tracks
//!
//! Usage: trackfill <COMMAND> [OPTIONS]

use clap::{ArgAction, Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use trackfill::commands::{GenerateCommand, GenerateConfig, ValuesCommand};
use trackfill::error::ValuesError;
use trackfill::grid::DEFAULT_GROUP_WIDTH;

#[derive(Parser)]
#[command(name = "trackfill")]
#[command(version)]
#[command(about = "Dense per-window value arrays from sparse bedGraph tracks", long_about = None)]
struct Cli {
    /// Number of threads to use (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Check that tracks are sorted and non-overlapping before filling.
    /// By default the track is trusted, and unsorted or overlapping input
    /// produces unspecified values.
    #[arg(long, global = true)]
    validate: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dense values of a bedGraph track for each query window
    Values {
        /// Input bedGraph track (chrom, start, end, value)
        #[arg(short = 'i', long)]
        track: PathBuf,

        /// Query windows BED file; all windows must have the same length
        #[arg(short = 'w', long)]
        windows: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a .npy array to --output instead of text rows
        #[arg(long, requires = "output")]
        npy: bool,

        /// Maximum units per group when sizing launches
        #[arg(long, default_value_t = DEFAULT_GROUP_WIDTH)]
        group_width: usize,

        /// Fill with the sequential flat-grid walk (debugging)
        #[arg(long)]
        grid: bool,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Generate a synthetic track and query windows
    Generate {
        /// Output directory
        #[arg(short, long, default_value = "./trackfill_data")]
        output: PathBuf,

        /// Number of track intervals
        #[arg(long, default_value = "100000")]
        intervals: usize,

        /// Number of query windows
        #[arg(long, default_value = "1000")]
        windows: usize,

        /// Length of every query window
        #[arg(short = 'l', long, default_value = "1000")]
        sequence_length: u64,

        /// Number of chromosomes
        #[arg(long, default_value = "3")]
        chroms: usize,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Minimum interval length
        #[arg(long, default_value = "1")]
        len_min: u64,

        /// Maximum interval length
        #[arg(long, default_value = "500")]
        len_max: u64,

        /// Maximum gap between consecutive intervals
        #[arg(long, default_value = "200")]
        gap_max: u64,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Must be set before any engine or reader is built
    if cli.validate {
        trackfill::config::set_validate_inputs(true);
    }

    if let Some(n) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
        {
            eprintln!("Error: failed to initialize thread pool: {}", e);
            process::exit(1);
        }
    }

    let result = match cli.command {
        Commands::Values {
            track,
            windows,
            output,
            npy,
            group_width,
            grid,
            stats,
        } => run_values(track, windows, output, npy, group_width, grid, stats),

        Commands::Generate {
            output,
            intervals,
            windows,
            sequence_length,
            chroms,
            seed,
            len_min,
            len_max,
            gap_max,
            force,
            stats,
        } => {
            let config = GenerateConfig {
                output_dir: output,
                intervals,
                windows,
                sequence_length,
                chroms,
                seed,
                len_min,
                len_max,
                gap_max,
                force,
            };
            run_generate(config, stats)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_values(
    track: PathBuf,
    windows: PathBuf,
    output: Option<PathBuf>,
    npy: bool,
    group_width: usize,
    grid: bool,
    stats: bool,
) -> Result<(), ValuesError> {
    let cmd = ValuesCommand { group_width, grid };

    let result = match output {
        Some(path) if npy => cmd.run_npy(&track, &windows, &path)?,
        Some(path) => {
            let mut file = File::create(&path)?;
            let result = cmd.run(&track, &windows, &mut file)?;
            file.flush()?;
            result
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            cmd.run(&track, &windows, &mut handle)?
        }
    };

    if stats {
        eprintln!("Values stats: {}", result);
    }
    Ok(())
}

fn run_generate(config: GenerateConfig, stats: bool) -> Result<(), ValuesError> {
    let output_dir = config.output_dir.clone();
    let cmd = GenerateCommand::new(config);
    let result = cmd.run()?;

    eprintln!("Output directory: {}", output_dir.display());
    if stats {
        eprintln!("Generate stats: {}", result);
    }
    Ok(())
}
