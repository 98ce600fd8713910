//!
//! Command-line driver for calorimeter zero suppression.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

use clap::{Parser, Subcommand};

use calzs_algorithms::{suppress_frames, SuppressionStatistics, ZsConfig, ZsEnergy};
use calzs_io::{read_conditions, DigiFileReader, DigiFileWriter};
use calzs_qie::FrameFlavor;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    CalzsIo(#[from] calzs_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] calzs_core::Error),

    #[error("Parameter file error: {0}")]
    Params(#[from] serde_json::Error),
}

/// Calorimeter readout zero suppression.
#[derive(Parser)]
#[command(name = "calzs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suppress digi files against a conditions table
    Suppress {
        /// Input digi file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path (.csv for CSV, anything else binary)
        #[arg(short, long)]
        output: PathBuf,

        /// Conditions table with per-channel pedestals and gains
        #[arg(short, long)]
        conditions: PathBuf,

        /// JSON file with the full decision parameter set; overrides the
        /// individual flags below
        #[arg(long)]
        params: Option<PathBuf>,

        /// Decision threshold (ADC counts)
        #[arg(long, default_value = "8")]
        threshold: i32,

        /// First time slice of the summation window
        #[arg(long, default_value = "4")]
        first_sample: usize,

        /// Number of time slices summed
        #[arg(long, default_value = "2")]
        samples: usize,

        /// Also keep negative-going fluctuations past -threshold
        #[arg(long)]
        two_sided: bool,

        /// Flag failing frames but keep everything
        #[arg(long)]
        mark_and_pass: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a digi file
    Info {
        /// Input digi file
        input: PathBuf,
    },
}

fn load_params(path: &Path) -> Result<ZsConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Suppress {
            input,
            output,
            conditions,
            params,
            threshold,
            first_sample,
            samples,
            two_sided,
            mark_and_pass,
            verbose,
        } => {
            let config = match &params {
                Some(path) => load_params(path)?,
                None => ZsConfig::new()
                    .with_threshold(threshold)
                    .with_window(first_sample, samples)
                    .with_mark_and_pass(mark_and_pass)
                    .with_two_sided(two_sided),
            };

            if verbose {
                eprintln!("Processing {} file(s)...", input.len());
                eprintln!("Threshold: {} ADC counts", config.threshold);
                eprintln!(
                    "Window: [{}, {})",
                    config.first_sample,
                    config.first_sample + config.sample_count
                );
                eprintln!("Two-sided: {}", config.two_sided);
                eprintln!("Mark-and-pass: {}", config.mark_and_pass);
            }

            let start = Instant::now();

            let conditions = read_conditions(&conditions)?;
            if verbose {
                eprintln!("Conditions: {} channels", conditions.len());
            }

            let algo = ZsEnergy::new(config);
            let run = algo.prepare(&conditions);

            let mut writer = DigiFileWriter::create(&output)?;
            if verbose {
                eprintln!("Writing output to: {}", output.display());
            }
            let csv_output = output
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            let mut wrote_header = false;

            let mut totals = SuppressionStatistics::default();

            for path in &input {
                if verbose {
                    eprintln!("Reading: {}", path.display());
                }

                let reader = DigiFileReader::open(path)?;
                let frames = reader.read_all()?;
                let outcome = suppress_frames(&run, frames)?;

                if csv_output {
                    writer.write_retained_csv(&outcome.retained, !wrote_header)?;
                    wrote_header = true;
                } else {
                    writer.write_retained_binary(&outcome.retained)?;
                }

                if verbose {
                    eprintln!("  {} frames examined", outcome.statistics.frames_examined);
                    eprintln!("  {} frames kept", outcome.statistics.frames_kept);
                    eprintln!(
                        "  {} frames suppressed",
                        outcome.statistics.frames_suppressed
                    );
                }
                totals = totals.merge(outcome.statistics);
            }

            run.done();
            let elapsed = start.elapsed();

            println!(
                "Processed {} files in {:.2}s",
                input.len(),
                elapsed.as_secs_f64()
            );
            println!("Frames examined: {}", totals.frames_examined);
            println!("Frames kept: {}", totals.frames_kept);
            println!("Frames suppressed: {}", totals.frames_suppressed);
            if totals.frames_flagged > 0 {
                println!("Frames flagged: {}", totals.frames_flagged);
            }
            println!("Keep fraction: {:.3}", totals.keep_fraction());
        }

        Commands::Info { input } => {
            let reader = DigiFileReader::open(&input)?;
            let file_size = reader.file_size();
            let summary = reader.summarize()?;

            println!("File: {}", input.display());
            println!(
                "Size: {} bytes ({:.2} MB)",
                file_size,
                file_size as f64 / 1_000_000.0
            );
            println!("Frames: {}", summary.frame_count);

            for flavor in [
                FrameFlavor::Hbhe,
                FrameFlavor::Ho,
                FrameFlavor::Hf,
                FrameFlavor::Qie10,
                FrameFlavor::Qie11,
            ] {
                let count = summary.flavor_count(flavor);
                if count > 0 {
                    println!("  {:?}: {}", flavor, count);
                }
            }

            if let (Some(min), Some(max)) = (summary.adc_min, summary.adc_max) {
                println!("ADC range: {} - {}", min, max);
            }
        }
    }

    Ok(())
}
