//! NCDC DSI-6401 station-products envelope
//!
//! Lines in the 5-minute ASOS archive look like
//!
//! ```text
//! 24229KPDX PDX20010101000010001/01/01 00:00:31  5-MIN KPDX 010800Z 00000KT ...
//! ```
//!
//! The date and time sit at fixed offsets and are read as UTC, with no
//! offset applied. The METAR body follows the `HH:MM:SS` field after a
//! `5-MIN` (or `1-MIN`) tag.

use crate::constants::envelope::*;
use std::ops::Range;

/// Fields read from a line's fixed-width header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub station: &'a str,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    /// Report text with the cadence tag removed
    pub body: &'a str,
}

fn numeric<T: std::str::FromStr>(line: &str, range: Range<usize>) -> Option<T> {
    line.get(range)
        .filter(|field| field.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|field| field.parse().ok())
}

/// Split a line into its envelope and report body
///
/// Returns `None` when the line does not carry the fixed-width header,
/// e.g. a bare METAR.
pub fn split(line: &str) -> Option<Envelope<'_>> {
    if !TIME_SEPARATORS
        .iter()
        .all(|&offset| line.as_bytes().get(offset) == Some(&b':'))
    {
        return None;
    }

    let envelope = Envelope {
        station: line.get(STATION)?,
        year: numeric(line, YEAR)?,
        month: numeric(line, MONTH)?,
        day: numeric(line, DAY)?,
        hour: numeric(line, HOUR)?,
        minute: numeric(line, MINUTE)?,
        body: strip_cadence_tag(line.get(BODY_START..).unwrap_or_default()),
    };
    Some(envelope)
}

/// Drop a leading `5-MIN` style tag
fn strip_cadence_tag(body: &str) -> &str {
    let body = body.trim_start();
    match body.split_once(char::is_whitespace) {
        Some((tag, rest))
            if tag
                .strip_suffix("-MIN")
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())) =>
        {
            rest.trim_start()
        }
        _ => body,
    }
}
