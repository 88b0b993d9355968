//! Deduplication and reindexing onto the cadence grid

use super::{ObservationSeries, SeriesRow};
use crate::error::{AsosError, Result};
use crate::models::ParsedObservation;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// True when `timestamp` is a whole multiple of the cadence since the epoch
///
/// For cadences dividing the day this is the same grid as counting from
/// midnight.
fn on_grid(timestamp: DateTime<Utc>, cadence_seconds: i64) -> bool {
    timestamp.timestamp_subsec_nanos() == 0
        && timestamp.timestamp().rem_euclid(cadence_seconds) == 0
}

/// Build a regular series from a batch of observations
///
/// Observations sharing a timestamp collapse to the one seen last, which is
/// how corrected re-transmissions supersede originals. The grid runs from
/// the first to the last kept observation; slots without a report are
/// absent rows. Reports between slots (off-cadence specials) are dropped
/// and counted.
pub fn deduplicate_and_resample(
    observations: impl IntoIterator<Item = ParsedObservation>,
    cadence: TimeDelta,
) -> Result<ObservationSeries> {
    let cadence_seconds = cadence.num_seconds();
    if cadence_seconds <= 0 || cadence.subsec_nanos() != 0 {
        return Err(AsosError::configuration(format!(
            "Series cadence must be a positive number of seconds, got {}",
            cadence
        )));
    }

    let mut latest: BTreeMap<DateTime<Utc>, ParsedObservation> = BTreeMap::new();
    let mut duplicates_resolved = 0;
    for observation in observations {
        if latest.insert(observation.timestamp, observation).is_some() {
            duplicates_resolved += 1;
        }
    }

    let received = latest.len();
    latest.retain(|timestamp, _| on_grid(*timestamp, cadence_seconds));
    let off_grid_dropped = received - latest.len();

    let mut series = ObservationSeries::empty(cadence);
    series.duplicates_resolved = duplicates_resolved;
    series.off_grid_dropped = off_grid_dropped;

    let (Some(&first), Some(&last)) = (latest.keys().next(), latest.keys().next_back()) else {
        return Ok(series);
    };

    let slots = usize::try_from((last - first).num_seconds() / cadence_seconds)
        .unwrap_or_default()
        + 1;
    series.rows.reserve(slots);

    let mut slot = first;
    while slot <= last {
        series.rows.push(match latest.remove(&slot) {
            Some(observation) => SeriesRow {
                timestamp: slot,
                observation: Some(observation),
                precipitation: None,
            },
            None => SeriesRow::empty(slot),
        });
        slot += cadence;
    }

    debug!(
        "Resampled {} reports onto {} slots ({} duplicates, {} off-grid)",
        received,
        series.rows.len(),
        duplicates_resolved,
        off_grid_dropped
    );
    Ok(series)
}
