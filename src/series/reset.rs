//! Inference of the rain gauge's hourly reset minute
//!
//! The gauge reports a running total that zeroes once an hour at a
//! station-specific minute that is never transmitted. Within each clock
//! hour the smallest reading is the best candidate for "just after the
//! reset", so the minute at which those minima fall most often is taken as
//! the reset minute.

use crate::constants::DEFAULT_RESET_MINUTE;
use crate::error::{AsosError, Result};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Minute of the hour (0-59) at which the hourly counter resets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResetTime(u32);

impl ResetTime {
    pub fn new(minute: u32) -> Result<Self> {
        if minute < 60 {
            Ok(Self(minute))
        } else {
            Err(AsosError::reconstruction(format!(
                "reset minute must be 0-59, got {}",
                minute
            )))
        }
    }

    pub fn minute(self) -> u32 {
        self.0
    }
}

impl Default for ResetTime {
    fn default() -> Self {
        Self(DEFAULT_RESET_MINUTE)
    }
}

impl fmt::Display for ResetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{:02}", self.0)
    }
}

/// Lowest reading of one clock hour and where it was reached
#[derive(Debug, Clone, Copy)]
struct HourlyMinimum {
    value: f64,
    maximum: f64,
    first_at: DateTime<Utc>,
    /// First time the minimum was reached by a fall from the previous slot
    dropped_at: Option<DateTime<Utc>>,
}

impl HourlyMinimum {
    fn new(value: f64, at: DateTime<Utc>, dropped: bool) -> Self {
        Self {
            value,
            maximum: value,
            first_at: at,
            dropped_at: dropped.then_some(at),
        }
    }

    fn update(&mut self, value: f64, at: DateTime<Utc>, dropped: bool) {
        self.maximum = self.maximum.max(value);
        if value < self.value {
            *self = Self {
                maximum: self.maximum,
                ..Self::new(value, at, dropped)
            };
        } else if value == self.value && dropped && self.dropped_at.is_none() {
            self.dropped_at = Some(at);
        }
    }

    /// Minute this hour votes for, `None` for a flat hour
    fn vote(&self) -> Option<u32> {
        (self.maximum > self.value).then(|| self.dropped_at.unwrap_or(self.first_at).minute())
    }
}

/// Infer the reset minute from a batch's raw hourly accumulation
///
/// Every clock hour votes for the minute of its minimum reading. Among
/// equal minima the first one reached by a fall from the previous slot
/// wins (the previous slot may lie in the hour before), otherwise the
/// first occurrence. Hours whose readings never change carry no vote.
/// The most voted minute wins, the smallest minute among equal votes. A
/// batch without any nonzero reading resets at minute 0.
pub fn infer_reset_time(
    timestamps: &[DateTime<Utc>],
    raw_precipitation: &[Option<f64>],
) -> Result<ResetTime> {
    if timestamps.len() != raw_precipitation.len() {
        return Err(AsosError::reconstruction(format!(
            "{} timestamps but {} precipitation values",
            timestamps.len(),
            raw_precipitation.len()
        )));
    }

    let reading = |i: usize| raw_precipitation[i].filter(|v| !v.is_nan());

    if !(0..raw_precipitation.len()).any(|i| reading(i).is_some_and(|v| v != 0.0)) {
        return Ok(ResetTime::default());
    }

    let mut minima: BTreeMap<i64, HourlyMinimum> = BTreeMap::new();
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let Some(value) = reading(i) else {
            continue;
        };
        let dropped = i
            .checked_sub(1)
            .and_then(reading)
            .is_some_and(|previous| value < previous);

        minima
            .entry(timestamp.timestamp().div_euclid(3600))
            .and_modify(|minimum| minimum.update(value, timestamp, dropped))
            .or_insert_with(|| HourlyMinimum::new(value, timestamp, dropped));
    }

    let mut votes = [0usize; 60];
    for minute in minima.values().filter_map(HourlyMinimum::vote) {
        votes[minute as usize] += 1;
    }

    let mut best = 0;
    for minute in 1..votes.len() {
        if votes[minute] > votes[best] {
            best = minute;
        }
    }
    ResetTime::new(best as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_time_bounds() {
        assert_eq!(ResetTime::new(59).unwrap().minute(), 59);
        assert!(ResetTime::new(60).is_err());
        assert_eq!(ResetTime::default().minute(), 0);
        assert_eq!(ResetTime::new(5).unwrap().to_string(), ":05");
    }
}
