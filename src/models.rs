//! Core data structures and types for ASOS processing.
//!
//! Defines the decoded observation record, non-fatal parse diagnostics,
//! batch identification and the statistics reported after processing.

use crate::constants::NCDC_FILE_PREFIX;
use crate::metar::MetarReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Non-fatal problems found while decoding a single report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Main-body text that no group rule recognises
    UnparsedGroup { group: String },
    /// Remark text that no remark rule recognises
    UnparsedRemark { group: String },
    /// A recognised group whose handler rejected the value
    MalformedGroup {
        rule: String,
        group: String,
        reason: String,
    },
}

impl Diagnostic {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Diagnostic::MalformedGroup { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnparsedGroup { group } => write!(f, "unparsed group '{}'", group),
            Diagnostic::UnparsedRemark { group } => write!(f, "unparsed remark '{}'", group),
            Diagnostic::MalformedGroup {
                rule,
                group,
                reason,
            } => write!(f, "malformed {} group '{}': {}", rule, group, reason),
        }
    }
}

/// Decoded fields of one raw report
///
/// Every field except `timestamp` is optional; an unreported quantity is
/// `None`, never a sentinel number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedObservation {
    pub timestamp: DateTime<Utc>,
    pub station_id: Option<String>,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Degrees Celsius
    pub dew_point: Option<f64>,
    /// Knots
    pub wind_speed: Option<f64>,
    /// Degrees true
    pub wind_direction: Option<f64>,
    /// Inches of mercury
    pub pressure: Option<f64>,
    /// Hourly cumulative accumulation in inches, as reported
    pub raw_precipitation: Option<f64>,
    /// Opacity fraction in [0, 1]
    pub sky_cover: Option<f64>,
    pub unparsed_groups: Vec<String>,
    /// Everything the grammar decoded, including remark values
    pub report: MetarReport,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedObservation {
    /// Build the flat observation from a decoded report
    pub fn from_report(
        timestamp: DateTime<Utc>,
        station_id: Option<String>,
        report: MetarReport,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            timestamp,
            station_id,
            temperature: report.temperature,
            dew_point: report.dew_point,
            wind_speed: report.wind.as_ref().and_then(|w| w.speed_knots),
            wind_direction: report.wind.as_ref().and_then(|w| w.direction),
            pressure: report.altimeter_inhg,
            raw_precipitation: report.precip_1hr,
            sky_cover: report.sky_cover(),
            unparsed_groups: report.unparsed_groups.clone(),
            report,
            diagnostics,
        }
    }

    /// Number of malformed-group diagnostics
    pub fn malformed_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_malformed()).count()
    }
}

/// Identifies one batch of reports (a station-month file)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchKey {
    pub station: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl BatchKey {
    /// Derive a batch key from an NCDC 5-minute file name
    ///
    /// `64010KPDX201601.dat` yields station `KPDX`, 2016-01. Any other name
    /// falls back to the file stem as station with no period.
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");

        if let Some(rest) = stem.strip_prefix(NCDC_FILE_PREFIX) {
            if rest.len() > 6 && rest.is_char_boundary(rest.len() - 6) {
                let (station, period) = rest.split_at(rest.len() - 6);
                let year = period.get(..4).and_then(|y| y.parse::<i32>().ok());
                let month = period
                    .get(4..)
                    .and_then(|m| m.parse::<u32>().ok())
                    .filter(|m| (1..=12).contains(m));
                if let (Some(year), Some(month)) = (year, month) {
                    return Self {
                        station: station.to_string(),
                        year: Some(year),
                        month: Some(month),
                    };
                }
            }
        }

        Self {
            station: stem.to_string(),
            year: None,
            month: None,
        }
    }
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.year, self.month) {
            (Some(year), Some(month)) => write!(f, "{} {}-{:02}", self.station, year, month),
            _ => write!(f, "{}", self.station),
        }
    }
}

/// Per-batch counts of what happened to the raw lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub lines_read: usize,
    pub reports_parsed: usize,
    pub reports_skipped: usize,
    pub unparsed_groups: usize,
    pub malformed_groups: usize,
    pub duplicates_resolved: usize,
    pub off_grid_dropped: usize,
    pub skipped_messages: Vec<String>,
}

impl BatchStats {
    /// Fold another batch's counts into this one
    pub fn merge(&mut self, other: &BatchStats) {
        self.lines_read += other.lines_read;
        self.reports_parsed += other.reports_parsed;
        self.reports_skipped += other.reports_skipped;
        self.unparsed_groups += other.unparsed_groups;
        self.malformed_groups += other.malformed_groups;
        self.duplicates_resolved += other.duplicates_resolved;
        self.off_grid_dropped += other.off_grid_dropped;
        self.skipped_messages
            .extend(other.skipped_messages.iter().cloned());
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub stations_written: usize,
    pub total_rows: usize,
    pub batch: BatchStats,
    pub output_paths: Vec<PathBuf>,
    pub processing_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_key_from_ncdc_name() {
        let key = BatchKey::from_path(Path::new("/data/raw/64010KPDX201601.dat"));
        assert_eq!(key.station, "KPDX");
        assert_eq!(key.year, Some(2016));
        assert_eq!(key.month, Some(1));
        assert_eq!(key.to_string(), "KPDX 2016-01");
    }

    #[test]
    fn test_batch_key_fallback() {
        let key = BatchKey::from_path(Path::new("portland.txt"));
        assert_eq!(key.station, "portland");
        assert_eq!(key.year, None);
        assert_eq!(key.to_string(), "portland");

        // month 13 is not a period
        let key = BatchKey::from_path(Path::new("64010KPDX201613.dat"));
        assert_eq!(key.station, "64010KPDX201613");
        assert_eq!(key.month, None);
    }

    #[test]
    fn test_batch_keys_sort_by_station_then_period() {
        let mut keys = vec![
            BatchKey::from_path(Path::new("64010KSEA201602.dat")),
            BatchKey::from_path(Path::new("64010KPDX201602.dat")),
            BatchKey::from_path(Path::new("64010KPDX201601.dat")),
        ];
        keys.sort();
        let labels: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(labels, vec!["KPDX 2016-01", "KPDX 2016-02", "KSEA 2016-02"]);
    }

    #[test]
    fn test_batch_stats_merge() {
        let mut total = BatchStats::default();
        let batch = BatchStats {
            lines_read: 10,
            reports_parsed: 9,
            reports_skipped: 1,
            skipped_messages: vec!["bad line".to_string()],
            ..Default::default()
        };
        total.merge(&batch);
        total.merge(&batch);
        assert_eq!(total.lines_read, 20);
        assert_eq!(total.reports_skipped, 2);
        assert_eq!(total.skipped_messages.len(), 2);
    }
}
