//! Regular time series reconstruction
//!
//! Turns a batch of decoded observations into a uniformly spaced series:
//!
//! - [`dedup`] - last-seen-wins deduplication and reindexing onto the cadence grid
//! - [`reset`] - inference of the minute at which the hourly rain counter zeroes
//! - [`precip`] - conversion of the cumulative counter to per-interval depths
//! - [`frame`] - the tabular (polars) view of a finished series
//!
//! Each batch is reconstructed on its own; batches of one station are joined
//! afterwards with [`ObservationSeries::concat`].

pub mod dedup;
pub mod frame;
pub mod precip;
pub mod reset;

#[cfg(test)]
pub mod tests;

pub use dedup::deduplicate_and_resample;
pub use precip::{SampleClass, classify_sample, difference_precipitation};
pub use reset::{ResetTime, infer_reset_time};

use crate::constants::DEFAULT_CADENCE_MINUTES;
use crate::error::{AsosError, Result};
use crate::models::ParsedObservation;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

/// One slot of the cadence grid
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub timestamp: DateTime<Utc>,
    /// `None` where no report exists for the slot
    pub observation: Option<ParsedObservation>,
    /// Corrected per-interval depth, filled by reconstruction
    pub precipitation: Option<f64>,
}

impl SeriesRow {
    pub(crate) fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            observation: None,
            precipitation: None,
        }
    }

    /// Hourly cumulative accumulation as reported
    pub fn raw_precipitation(&self) -> Option<f64> {
        self.observation.as_ref().and_then(|o| o.raw_precipitation)
    }

    /// Read one field of the observation, absent for an empty slot
    pub fn field(&self, get: impl Fn(&ParsedObservation) -> Option<f64>) -> Option<f64> {
        self.observation.as_ref().and_then(get)
    }
}

/// Timestamp-indexed observations at a fixed cadence
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    pub cadence: TimeDelta,
    /// Strictly increasing, one row per grid slot
    pub rows: Vec<SeriesRow>,
    /// Inferred gauge reset minute, set by reconstruction
    pub reset_time: Option<ResetTime>,
    /// Reports superseded by a later report with the same timestamp
    pub duplicates_resolved: usize,
    /// Reports whose timestamp fell between grid slots
    pub off_grid_dropped: usize,
}

impl ObservationSeries {
    pub fn empty(cadence: TimeDelta) -> Self {
        Self {
            cadence,
            rows: Vec::new(),
            reset_time: None,
            duplicates_resolved: 0,
            off_grid_dropped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.rows.first().map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.rows.last().map(|r| r.timestamp)
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    pub fn raw_precipitation(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(SeriesRow::raw_precipitation).collect()
    }

    pub fn precipitation(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.precipitation).collect()
    }

    /// Number of slots holding a report
    pub fn observed_count(&self) -> usize {
        self.rows.iter().filter(|r| r.observation.is_some()).count()
    }

    /// Infer the reset minute and overwrite the precipitation column with
    /// per-interval depths
    pub fn correct_precipitation(&mut self) -> Result<ResetTime> {
        let timestamps = self.timestamps();
        let raw = self.raw_precipitation();

        let reset_time = infer_reset_time(&timestamps, &raw)?;
        let corrected = difference_precipitation(&timestamps, &raw, reset_time, self.cadence)?;

        for (row, value) in self.rows.iter_mut().zip(corrected) {
            row.precipitation = value;
        }
        self.reset_time = Some(reset_time);

        debug!(
            "Corrected precipitation for {} rows with reset minute {}",
            self.rows.len(),
            reset_time
        );
        Ok(reset_time)
    }

    /// Join consecutive series (e.g. the months of one station)
    ///
    /// Parts are ordered by start time and any space between them is filled
    /// with absent rows. Overlapping parts or mixed cadences are rejected.
    pub fn concat(parts: Vec<ObservationSeries>) -> Result<ObservationSeries> {
        let cadence = parts
            .first()
            .map(|p| p.cadence)
            .unwrap_or_else(|| TimeDelta::minutes(i64::from(DEFAULT_CADENCE_MINUTES)));
        if let Some(other) = parts.iter().find(|p| p.cadence != cadence) {
            return Err(AsosError::reconstruction(format!(
                "cannot join series with cadences {} and {}",
                cadence, other.cadence
            )));
        }

        let mut combined = ObservationSeries::empty(cadence);
        let mut reset_times: Vec<Option<ResetTime>> = Vec::new();

        let mut parts: Vec<ObservationSeries> =
            parts.into_iter().filter(|p| !p.is_empty()).collect();
        parts.sort_by_key(|p| p.first_timestamp());

        for part in parts {
            combined.duplicates_resolved += part.duplicates_resolved;
            combined.off_grid_dropped += part.off_grid_dropped;
            reset_times.push(part.reset_time);

            if let (Some(last), Some(first)) = (combined.last_timestamp(), part.first_timestamp()) {
                if first <= last {
                    return Err(AsosError::reconstruction(format!(
                        "series overlap: {} starts before {}",
                        first, last
                    )));
                }
                let mut slot = last + cadence;
                while slot < first {
                    combined.rows.push(SeriesRow::empty(slot));
                    slot += cadence;
                }
            }
            combined.rows.extend(part.rows);
        }

        // a single reset minute only when every part agrees
        combined.reset_time = match reset_times.split_first() {
            Some((first, rest)) if rest.iter().all(|r| r == first) => *first,
            _ => None,
        };
        Ok(combined)
    }
}

/// Deduplicate, resample onto the default 5-minute grid and correct
/// precipitation
pub fn reconstruct(
    observations: impl IntoIterator<Item = ParsedObservation>,
) -> Result<ObservationSeries> {
    reconstruct_with_cadence(
        observations,
        TimeDelta::minutes(i64::from(DEFAULT_CADENCE_MINUTES)),
    )
}

/// [`reconstruct`] at a caller-chosen cadence
pub fn reconstruct_with_cadence(
    observations: impl IntoIterator<Item = ParsedObservation>,
    cadence: TimeDelta,
) -> Result<ObservationSeries> {
    let mut series = deduplicate_and_resample(observations, cadence)?;
    series.correct_precipitation()?;
    Ok(series)
}
