//! Integration tests for the processor module
//!
//! Exercises the complete pipeline on small NCDC-style archives written to
//! temporary directories.

pub mod multi_station;

use std::fs;
use std::path::{Path, PathBuf};

/// One 5-minute archive line with an hourly accumulation of
/// `precip_hundredths` hundredths of an inch
pub fn report_line(
    station: &str,
    (year, month, day): (i32, u32, u32),
    (hour, minute): (u32, u32),
    precip_hundredths: u32,
) -> String {
    format!(
        "24229{st} {s3}{y:04}{m:02}{d:02}{h:02}{mi:02}10001/{m:02}/{yy:02} {h:02}:{mi:02}:31  5-MIN {st} {d:02}{h:02}{mi:02}Z 27005KT 10SM OVC020 10/08 A3000 RMK AO2 P{p:04}",
        st = station,
        s3 = &station[1..],
        y = year,
        yy = year % 100,
        m = month,
        d = day,
        h = hour,
        mi = minute,
        p = precip_hundredths,
    )
}

/// Lines for `count` consecutive 5-minute reports starting at the given hour
pub fn hour_of_reports(
    station: &str,
    date: (i32, u32, u32),
    hour: u32,
    count: u32,
    precip: impl Fn(u32) -> u32,
) -> Vec<String> {
    (0..count)
        .map(|i| report_line(station, date, (hour, i * 5), precip(i)))
        .collect()
}

/// Write a station-month file named the NCDC way
pub fn write_batch(dir: &Path, station: &str, year: i32, month: u32, lines: &[String]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("64010{}{:04}{:02}.dat", station, year, month));
    fs::write(&path, lines.join("\n")).unwrap();
    path
}
