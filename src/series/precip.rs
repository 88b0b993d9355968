//! Conversion of the cumulative-within-hour counter to interval depths

use super::reset::ResetTime;
use crate::error::{AsosError, Result};
use chrono::{DateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// How one sample's corrected depth is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleClass {
    /// The raw reading is already the depth since the last reset
    Reset,
    /// Depth is the increase over the previous reading
    Accumulating,
    /// No reading
    Absent,
}

/// Classify one sample from its minute and the previous slot's reading
///
/// A reading is a fresh window when it lands on the reset minute, when
/// the counter went down (a reset fell between samples) or when there is
/// no previous reading to difference against (start of the series or of
/// a data chunk after a gap).
pub fn classify_sample(
    minute: u32,
    previous: Option<f64>,
    current: Option<f64>,
    reset_time: ResetTime,
) -> SampleClass {
    let Some(current) = current else {
        return SampleClass::Absent;
    };
    match previous {
        None => SampleClass::Reset,
        Some(_) if minute == reset_time.minute() => SampleClass::Reset,
        Some(previous) if current < previous => SampleClass::Reset,
        Some(_) => SampleClass::Accumulating,
    }
}

/// Per-interval precipitation depths from the raw hourly accumulation
///
/// Consecutive timestamps further apart than `cadence` start a new chunk,
/// exactly as an absent row between them would.
pub fn difference_precipitation(
    timestamps: &[DateTime<Utc>],
    raw_precipitation: &[Option<f64>],
    reset_time: ResetTime,
    cadence: TimeDelta,
) -> Result<Vec<Option<f64>>> {
    if timestamps.len() != raw_precipitation.len() {
        return Err(AsosError::reconstruction(format!(
            "{} timestamps but {} precipitation values",
            timestamps.len(),
            raw_precipitation.len()
        )));
    }
    if let Some(pair) = timestamps.windows(2).find(|pair| pair[1] <= pair[0]) {
        return Err(AsosError::reconstruction(format!(
            "timestamps are not strictly increasing at {}",
            pair[1]
        )));
    }

    let mut corrected = Vec::with_capacity(raw_precipitation.len());
    let mut previous: Option<(DateTime<Utc>, Option<f64>)> = None;

    for (&timestamp, &current) in timestamps.iter().zip(raw_precipitation) {
        let prior = previous
            .filter(|(at, _)| timestamp - *at <= cadence)
            .and_then(|(_, value)| value);

        corrected.push(
            match classify_sample(timestamp.minute(), prior, current, reset_time) {
                SampleClass::Reset => current,
                SampleClass::Accumulating => current.zip(prior).map(|(now, before)| now - before),
                SampleClass::Absent => None,
            },
        );
        previous = Some((timestamp, current));
    }

    Ok(corrected)
}
