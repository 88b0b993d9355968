//! Whole-line parsing tests

use crate::error::AsosError;
use crate::metar::{parse, parse_with_reference};
use chrono::{TimeZone, Utc};

const FIVE_MINUTE_LINE: &str = "24229KPDX PDX20010101000010001/01/01 00:00:31  5-MIN KPDX 010800Z \
     27012G20KT 10SM -RA BKN035 OVC060 05/03 A2992 300 95 -1400 260/12 RMK AO2 P0012 T00500028";

#[test]
fn test_parse_five_minute_line() {
    let obs = parse(FIVE_MINUTE_LINE).unwrap();

    // envelope time is taken as UTC unshifted, not the 010800Z group
    assert_eq!(obs.timestamp, Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(obs.station_id.as_deref(), Some("KPDX"));
    assert_eq!(obs.temperature, Some(5.0));
    assert_eq!(obs.dew_point, Some(2.8));
    assert_eq!(obs.wind_speed, Some(12.0));
    assert_eq!(obs.wind_direction, Some(270.0));
    assert_eq!(obs.report.wind.as_ref().unwrap().gust_knots, Some(20.0));
    assert!((obs.pressure.unwrap() - 29.92).abs() < 1e-9);
    assert!((obs.raw_precipitation.unwrap() - 0.12).abs() < 1e-9);
    assert_eq!(obs.sky_cover, Some(1.0));
    assert_eq!(obs.unparsed_groups, vec!["300", "95", "-1400", "260/12"]);
    assert_eq!(obs.diagnostics.len(), 4);
    assert_eq!(obs.malformed_count(), 0);
}

#[test]
fn test_parse_is_idempotent() {
    let first = parse(FIVE_MINUTE_LINE).unwrap();
    let second = parse(FIVE_MINUTE_LINE).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_precipitation_is_absent_not_zero() {
    let line = "24229KPDX PDX20010101000510001/01/01 00:05:31  5-MIN KPDX 010805Z \
                27012KT 10SM CLR 05/03 A2992 RMK AO2";
    let obs = parse(line).unwrap();
    assert_eq!(obs.raw_precipitation, None);
    assert_eq!(
        obs.timestamp,
        Utc.with_ymd_and_hms(2001, 1, 1, 0, 5, 0).unwrap()
    );
}

#[test]
fn test_bare_metar_needs_reference_month() {
    let text = "METAR KPDX 010855Z 00000KT 10SM FEW010 OVC200 04/03 A3031 RMK AO2";

    match parse(text) {
        Err(AsosError::Parse { text: offending, .. }) => assert_eq!(offending, text),
        other => panic!("Expected parse error, got {:?}", other),
    }

    let obs = parse_with_reference(text, 2016, 1).unwrap();
    assert_eq!(obs.timestamp, Utc.with_ymd_and_hms(2016, 1, 1, 8, 55, 0).unwrap());
    assert_eq!(obs.station_id.as_deref(), Some("KPDX"));
    assert_eq!(obs.sky_cover, Some(1.0));
}

#[test]
fn test_unresolvable_timestamps_fail() {
    // no date/time group at all
    assert!(matches!(
        parse_with_reference("METAR KPDX 00000KT 10SM CLR", 2016, 1),
        Err(AsosError::Parse { .. })
    ));

    // February 31st
    assert!(matches!(
        parse_with_reference("METAR KPDX 310855Z 00000KT 10SM CLR", 2016, 2),
        Err(AsosError::Parse { .. })
    ));

    // month 13 in the envelope
    let line = "24229KPDX PDX20011301000010001/01/01 00:00:31  5-MIN KPDX 010800Z 00000KT";
    assert!(matches!(parse(line), Err(AsosError::Parse { .. })));
}

#[test]
fn test_empty_line_is_rejected() {
    assert!(matches!(parse(""), Err(AsosError::EmptyReport)));
    assert!(matches!(parse("   \r\n"), Err(AsosError::EmptyReport)));
}
