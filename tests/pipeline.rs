//! End-to-end tests through the public API

use asos_processor::config::OutputFormat;
use asos_processor::{BatchProcessor, ProcessorConfig, parse, parse_with_reference, reconstruct};
use chrono::{TimeZone, Timelike, Utc};
use polars::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A 5-minute archive line for KORD with the given hourly accumulation
fn ord_line(day: u32, hour: u32, minute: u32, precip_hundredths: u32) -> String {
    format!(
        "94846KORD ORD2016{m:02}{d:02}{h:02}{mi:02}10001/{m:02}/16 {h:02}:{mi:02}:31  5-MIN KORD {d:02}{h:02}{mi:02}Z 18010G18KT 3SM -RA BR BKN008 OVC015 03/02 A2992 RMK AO2 P{p:04}",
        m = 3,
        d = day,
        h = hour,
        mi = minute,
        p = precip_hundredths,
    )
}

#[test]
fn test_parse_archive_line() {
    let observation = parse(&ord_line(14, 6, 35, 7)).unwrap();

    assert_eq!(
        observation.timestamp,
        Utc.with_ymd_and_hms(2016, 3, 14, 6, 35, 0).unwrap()
    );
    assert_eq!(observation.station_id.as_deref(), Some("KORD"));
    assert_eq!(observation.temperature, Some(3.0));
    assert_eq!(observation.dew_point, Some(2.0));
    assert_eq!(observation.wind_speed, Some(10.0));
    assert_eq!(observation.wind_direction, Some(180.0));
    assert!((observation.pressure.unwrap() - 29.92).abs() < 1e-9);
    assert_eq!(observation.sky_cover, Some(1.0));
    assert!((observation.raw_precipitation.unwrap() - 0.07).abs() < 1e-9);
    assert!(observation.unparsed_groups.is_empty());
    assert!(observation.diagnostics.is_empty());
}

#[test]
fn test_bare_metar_needs_reference_month() {
    let bare = "KORD 141651Z 18010KT 10SM FEW250 12/M01 A3012 RMK AO2 SLP201";

    assert!(parse(bare).is_err());

    let observation = parse_with_reference(bare, 2016, 3).unwrap();
    assert_eq!(observation.timestamp.hour(), 16);
    assert_eq!(observation.timestamp.minute(), 51);
    assert_eq!(observation.temperature, Some(12.0));
    assert_eq!(observation.dew_point, Some(-1.0));
    let slp = observation.report.sea_level_pressure_hpa.unwrap();
    assert!((slp - 1020.1).abs() < 1e-9);
}

#[test]
fn test_reconstruct_recovers_reset_minute() {
    // gauge resets at :20; it rains 0.01 in every 5 minutes for two hours
    let mut observations = Vec::new();
    for slot in 0..24u32 {
        let hour = 6 + slot / 12;
        let minute = (slot % 12) * 5;
        let since_reset = ((minute + 60 - 20) % 60) / 5 + 1;
        observations.push(parse(&ord_line(14, hour, minute, since_reset)).unwrap());
    }

    let series = reconstruct(observations).unwrap();

    assert_eq!(series.reset_time.map(|r| r.minute()), Some(20));
    let corrected = series.precipitation();
    // 06:00 opens the series, so its whole reading since the reset counts
    assert!((corrected[0].unwrap() - 0.09).abs() < 1e-9);
    for value in &corrected[1..] {
        assert!((value.unwrap() - 0.01).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_archive_to_parquet() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("6401-2016");
    fs::create_dir_all(&input).unwrap();

    let mut lines: Vec<String> = (0..12).map(|i| ord_line(14, 6, i * 5, i)).collect();
    // 06:20 is missing from the archive
    lines.remove(4);
    fs::write(input.join("64010KORD201603.dat"), lines.join("\n")).unwrap();

    let output = temp_dir.path().join("series");
    let config = ProcessorConfig::default().with_output_format(OutputFormat::Parquet);
    let mut processor = BatchProcessor::new(input, Some(output.clone()))
        .unwrap()
        .with_config(config);
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.stations_written, 1);
    assert_eq!(stats.total_rows, 12);

    let df = ParquetReader::new(fs::File::open(output.join("KORD.parquet")).unwrap())
        .finish()
        .unwrap();
    assert_eq!(
        df.get_column_names_str(),
        vec![
            "datetime",
            "temperature",
            "dew_point",
            "wind_speed",
            "wind_direction",
            "air_pressure",
            "sky_cover",
            "precipitation",
            "raw_precipitation"
        ]
    );

    let precipitation = df.column("precipitation").unwrap().f64().unwrap();
    assert_eq!(precipitation.get(4), None);
    // first reading after the gap is taken as a fresh window
    assert_eq!(precipitation.get(5), Some(0.05));
    assert!(precipitation.into_iter().flatten().all(|v| v >= 0.0));
}
