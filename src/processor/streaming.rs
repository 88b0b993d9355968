//! Streaming processing module for report batches
//!
//! Each discovered file is one batch (a station-month). Batches are decoded
//! and reconstructed concurrently; the lines inside a batch are handled
//! sequentially.

use crate::config::ProcessorConfig;
use crate::constants::MAX_SKIPPED_MESSAGES;
use crate::error::{AsosError, Result};
use crate::metar;
use crate::models::{BatchKey, BatchStats, ProcessingStats};
use crate::series::{ObservationSeries, reconstruct_with_cadence};

use chrono::TimeDelta;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, error, warn};

/// Reconstructed series of one batch file
#[derive(Debug)]
pub struct BatchOutcome {
    pub key: BatchKey,
    pub path: PathBuf,
    pub series: ObservationSeries,
    pub stats: BatchStats,
}

/// Streaming processor for report batches
#[derive(Debug)]
pub struct StreamingProcessor {
    config: ProcessorConfig,
}

impl StreamingProcessor {
    /// Create a new streaming processor
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Process files concurrently and return their outcomes ordered by batch key
    pub async fn process_files_streaming(
        &self,
        files: &[PathBuf],
    ) -> Result<(Vec<BatchOutcome>, ProcessingStats)> {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .map_err(|e| AsosError::configuration(format!("Invalid progress template: {}", e)))?
                .progress_chars("#>-"),
        );
        pb.set_message("Processing batches");

        let concurrent_limit = self.config.max_concurrent_batches.clamp(1, files.len().max(1));
        debug!(
            "Processing {} batches with concurrency {}",
            files.len(),
            concurrent_limit
        );

        let (mut outcomes, failed) = stream::iter(files)
            .map(|file_path| {
                let pb = pb.clone();
                let config = self.config.clone();
                async move {
                    if let Some(file_name) = file_path.file_name() {
                        pb.set_message(format!("Processing: {}", file_name.to_string_lossy()));
                    }

                    let result = task::spawn_blocking({
                        let file_path = file_path.clone();
                        move || process_batch_file(&file_path, &config)
                    })
                    .await
                    .map_err(|e| AsosError::ProcessingFailed {
                        path: file_path.clone(),
                        reason: format!("Batch task failed: {}", e),
                    })
                    .and_then(|result| result);
                    pb.inc(1);

                    match result {
                        Ok(outcome) => {
                            if outcome.series.is_empty() {
                                warn!("No usable reports in: {}", file_path.display());
                            } else {
                                debug!("Successfully processed: {}", file_path.display());
                            }
                            Ok(outcome)
                        }
                        Err(e) => {
                            error!("Failed to process {}: {:#}", file_path.display(), e);
                            Err(e)
                        }
                    }
                }
            })
            .buffer_unordered(concurrent_limit)
            .fold(
                (Vec::new(), 0usize),
                |(mut outcomes, failed), result| async move {
                    match result {
                        Ok(outcome) => {
                            outcomes.push(outcome);
                            (outcomes, failed)
                        }
                        Err(_) => (outcomes, failed + 1),
                    }
                },
            )
            .await;

        pb.finish_with_message("All batches processed");

        // completion order is arbitrary
        outcomes.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.path.cmp(&b.path)));

        let mut stats = ProcessingStats {
            files_processed: outcomes.len(),
            files_failed: failed,
            ..Default::default()
        };
        for outcome in &outcomes {
            stats.batch.merge(&outcome.stats);
        }

        Ok((outcomes, stats))
    }
}

/// Decode and reconstruct one batch file
pub fn process_batch_file(path: &Path, config: &ProcessorConfig) -> Result<BatchOutcome> {
    debug!("Processing batch file: {}", path.display());

    let key = BatchKey::from_path(path);
    let reader = BufReader::new(File::open(path)?);

    let mut lines = Vec::new();
    for line in reader.split(b'\n') {
        // archive files occasionally carry stray non-UTF-8 bytes
        lines.push(String::from_utf8_lossy(&line?).into_owned());
    }

    let (series, stats) = process_lines(&lines, &key, config.cadence())?;
    Ok(BatchOutcome {
        key,
        path: path.to_path_buf(),
        series,
        stats,
    })
}

/// Decode the lines of one batch and reconstruct its series
///
/// A line that fails to decode is skipped and counted; it never aborts
/// the batch. Lines without an envelope take year and month from the
/// batch key when the key carries a period.
pub fn process_lines<S: AsRef<str>>(
    lines: &[S],
    key: &BatchKey,
    cadence: TimeDelta,
) -> Result<(ObservationSeries, BatchStats)> {
    let mut stats = BatchStats::default();
    let mut observations = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        stats.lines_read += 1;

        let parsed = match (key.year, key.month) {
            (Some(year), Some(month)) => metar::parse_with_reference(line, year, month),
            _ => metar::parse(line),
        };

        match parsed {
            Ok(observation) => {
                for diagnostic in &observation.diagnostics {
                    debug!("{} line {}: {}", key, index + 1, diagnostic);
                }
                stats.unparsed_groups += observation.unparsed_groups.len();
                stats.malformed_groups += observation.malformed_count();
                stats.reports_parsed += 1;
                observations.push(observation);
            }
            Err(e) => {
                debug!("{} line {} skipped: {}", key, index + 1, e);
                stats.reports_skipped += 1;
                if stats.skipped_messages.len() < MAX_SKIPPED_MESSAGES {
                    stats
                        .skipped_messages
                        .push(format!("{} line {}: {}", key, index + 1, e));
                }
            }
        }
    }

    let series = reconstruct_with_cadence(observations, cadence)?;
    stats.duplicates_resolved = series.duplicates_resolved;
    stats.off_grid_dropped = series.off_grid_dropped;

    debug!(
        "{}: {} reports parsed, {} skipped, {} rows",
        key,
        stats.reports_parsed,
        stats.reports_skipped,
        series.len()
    );
    Ok((series, stats))
}
