//! Tests for series reconstruction
//!
//! Synthetic gauge records with known reset minutes, duplicate and gap
//! handling, and the tabular output.

pub mod frame_tests;

use crate::metar::MetarReport;
use crate::models::ParsedObservation;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

pub(crate) fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2001, 1, day, hour, minute, 0).unwrap()
}

pub(crate) fn five_minutes() -> TimeDelta {
    TimeDelta::minutes(5)
}

/// Observation carrying only a temperature and an hourly accumulation
pub(crate) fn observation(
    timestamp: DateTime<Utc>,
    temperature: f64,
    raw_precipitation: Option<f64>,
) -> ParsedObservation {
    let report = MetarReport {
        station: Some("KPDX".to_string()),
        temperature: Some(temperature),
        precip_1hr: raw_precipitation,
        ..Default::default()
    };
    ParsedObservation::from_report(timestamp, Some("KPDX".to_string()), report, Vec::new())
}

/// Consecutive 5-minute timestamps
pub(crate) fn grid(start: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    (0..count)
        .map(|i| start + five_minutes() * i as i32)
        .collect()
}

pub(crate) fn assert_close(actual: &[Option<f64>], expected: &[Option<f64>]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        match (a, e) {
            (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "index {}: {} != {}", i, a, e),
            (None, None) => {}
            _ => panic!("index {}: {:?} != {:?}", i, a, e),
        }
    }
}
