//! Command-line interface components.

use crate::config::{CompressionAlgorithm, OutputFormat, ProcessorConfig};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "asos")]
#[command(
    about = "Decode NCDC 5-minute ASOS archives and rebuild regular series with corrected precipitation"
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory of raw report files (64010KPDX201601.dat) or a single file
    #[arg(value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Output directory for per-station files (default: ../series next to the input)
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// Output format (csv, parquet)
    #[arg(short, long, default_value = "csv")]
    pub format: String,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long, default_value = "snappy")]
    pub compression: String,

    /// Series cadence in minutes
    #[arg(long, default_value_t = crate::constants::DEFAULT_CADENCE_MINUTES)]
    pub cadence: u32,

    /// Number of batches processed concurrently (default: number of CPUs)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Search sub-directories for report files
    #[arg(short, long)]
    pub recursive: bool,

    /// Leave the uncorrected hourly accumulation out of the output
    #[arg(long)]
    pub no_raw_precip: bool,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Log level implied by the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Build the processing configuration from the flags
    pub fn to_config(&self) -> Result<ProcessorConfig> {
        let mut config = ProcessorConfig::default()
            .with_cadence_minutes(self.cadence)
            .with_output_format(OutputFormat::from_name(&self.format)?)
            .with_compression(CompressionAlgorithm::from_name(&self.compression)?);

        if let Some(workers) = self.workers {
            config = config.with_max_concurrent_batches(workers);
        }
        if self.recursive {
            config = config.with_recursive();
        }
        if self.no_raw_precip {
            config = config.without_raw_precipitation();
        }

        config.validate()?;
        Ok(config)
    }
}
