//! Main processing engine with modular architecture.
//!
//! Orchestrates the batch workflow using specialized modules for file
//! discovery, concurrent batch reconstruction, and per-station output.

pub mod discovery;
pub mod streaming;
pub mod writer;

#[cfg(test)]
pub mod tests;

pub use self::streaming::{BatchOutcome, process_batch_file, process_lines};

use self::{discovery::FileDiscovery, streaming::StreamingProcessor, writer::SeriesWriter};

use crate::config::ProcessorConfig;
use crate::error::{AsosError, Result};
use crate::models::ProcessingStats;
use crate::series::ObservationSeries;

use colored::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Main processor turning report archives into per-station series files
#[derive(Debug)]
pub struct BatchProcessor {
    input_path: PathBuf,
    output_dir: PathBuf,
    config: ProcessorConfig,
    station_count: usize,
}

impl BatchProcessor {
    /// Create a new batch processor
    ///
    /// Without an explicit output directory, files are written to `series/`
    /// next to the input.
    pub fn new(input_path: PathBuf, output_dir: Option<PathBuf>) -> Result<Self> {
        if !input_path.exists() {
            return Err(AsosError::InputNotFound { path: input_path });
        }

        let output_dir = output_dir.unwrap_or_else(|| default_output_dir(&input_path));

        Ok(Self {
            input_path,
            output_dir,
            config: ProcessorConfig::default(),
            station_count: 0,
        })
    }

    /// Configure the processor
    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Main processing entry point
    pub async fn process(&mut self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.config.validate()?;

        println!("{}", "Starting ASOS report processing".bright_green().bold());
        println!("  {} {}", "Input:".bright_cyan(), self.input_path.display());
        println!("  {} {}", "Output:".bright_cyan(), self.output_dir.display());

        // Step 1: Discover report files
        println!("\n{}", "Discovering report files...".bright_yellow());
        let mut discovery = FileDiscovery::new(self.input_path.clone(), self.config.recursive);
        let report_files = discovery.discover_report_files().await?;
        self.station_count = discovery.station_count();
        println!(
            "  {} {} report files from {} stations",
            "Found".bright_green(),
            report_files.len().to_string().bright_white().bold(),
            self.station_count.to_string().bright_white().bold()
        );

        if report_files.is_empty() {
            warn!("No report files found in {}", self.input_path.display());
            return Ok(ProcessingStats {
                processing_time_ms: start_time.elapsed().as_millis(),
                ..Default::default()
            });
        }

        // Step 2: Decode and reconstruct every batch
        println!("\n{}", "Processing batches...".bright_yellow());
        let streaming = StreamingProcessor::new(self.config.clone());
        let (outcomes, mut stats) = streaming.process_files_streaming(&report_files).await?;

        // Step 3: Assemble stations and write
        println!("\n{}", "Writing station series...".bright_yellow());
        let writer = SeriesWriter::new(self.output_dir.clone(), self.config.clone());
        for (station, parts) in group_by_station(outcomes) {
            let series = match ObservationSeries::concat(parts) {
                Ok(series) => series,
                Err(e) => {
                    error!("Could not assemble station {}: {}", station, e);
                    stats.files_failed += 1;
                    continue;
                }
            };

            if series.is_empty() {
                warn!("Station {} has no usable reports, nothing written", station);
                continue;
            }

            let (path, rows) = match writer.write_station(&station, &series) {
                Ok(written) => written,
                Err(e) => {
                    error!("Could not write station {}: {}", station, e);
                    stats.files_failed += 1;
                    continue;
                }
            };
            info!(
                "Wrote {} rows for {} (reset minute {})",
                rows,
                station,
                series
                    .reset_time
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "varies".to_string())
            );
            stats.stations_written += 1;
            stats.total_rows += rows;
            stats.output_paths.push(path);
        }

        let total_time = start_time.elapsed().as_millis();
        print_summary(&stats, total_time);

        Ok(ProcessingStats {
            processing_time_ms: total_time,
            ..stats
        })
    }
}

/// `series/` beside the input directory (or beside the input file's directory)
fn default_output_dir(input_path: &Path) -> PathBuf {
    let base = if input_path.is_file() {
        input_path.parent().unwrap_or_else(|| Path::new("."))
    } else {
        input_path
    };
    base.parent()
        .unwrap_or_else(|| Path::new("."))
        .join("series")
}

/// Collect batch series per station, in batch-key order
fn group_by_station(outcomes: Vec<BatchOutcome>) -> BTreeMap<String, Vec<ObservationSeries>> {
    let mut stations: BTreeMap<String, Vec<ObservationSeries>> = BTreeMap::new();
    for outcome in outcomes {
        stations
            .entry(outcome.key.station)
            .or_default()
            .push(outcome.series);
    }
    stations
}

fn print_summary(stats: &ProcessingStats, total_time: u128) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        total_time.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Reports parsed:".bright_cyan(),
        stats.batch.reports_parsed.to_string().bright_white()
    );
    if stats.batch.reports_skipped > 0 {
        println!(
            "  {} {}",
            "Reports skipped:".bright_yellow(),
            stats.batch.reports_skipped.to_string().bright_yellow()
        );
        for message in stats.batch.skipped_messages.iter().take(5) {
            println!("    {}", message.bright_black());
        }
    }
    println!(
        "  {} {} unparsed, {} malformed",
        "Groups:".bright_cyan(),
        stats.batch.unparsed_groups.to_string().bright_white(),
        stats.batch.malformed_groups.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Stations written:".bright_cyan(),
        stats.stations_written.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Total rows:".bright_cyan(),
        stats.total_rows.to_string().bright_white().bold()
    );
}
