//! Remark grammar tests

use crate::metar::{IceAccretion, PeakWind, WindShift, decode_report};
use crate::models::Diagnostic;

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|value| (value - expected).abs() < 1e-6)
}

#[test]
fn test_common_automated_remarks() {
    let state = decode_report(
        "METAR KPDX 010855Z 00000KT 10SM FEW010 OVC200 04/03 A3031 \
         RMK AO2 SLP262 T00390028 53010 $",
    );
    let report = &state.report;

    assert_eq!(report.automated_station_type, Some(2));
    assert!(close(report.sea_level_pressure_hpa, 1026.2));
    // the precise temperature group overrides the whole-degree body group
    assert!(close(report.temperature, 3.9));
    assert!(close(report.dew_point, 2.8));

    let tendency = report.pressure_tendency.as_ref().unwrap();
    assert_eq!(tendency.characteristic, 3);
    assert!((tendency.change_hpa - 1.0).abs() < 1e-9);

    assert_eq!(report.unparsed_remarks, vec!["$"]);
    assert_eq!(
        state.diagnostics,
        vec![Diagnostic::UnparsedRemark {
            group: "$".to_string()
        }]
    );
}

#[test]
fn test_synoptic_hour_remarks() {
    let state = decode_report(
        "METAR KPDX 010555Z 00000KT 10SM CLR 10/05 A3000 RMK AO2 PK WND 28045/0515 \
         WSHFT 0530 FROPA 60012 70125 10142 20011 401120084 4/005 I1012 P0003 SLP982",
    );
    let report = &state.report;

    assert_eq!(
        report.peak_wind,
        Some(PeakWind {
            direction: 280.0,
            speed_knots: 45.0,
            hour: Some(5),
            minute: 15,
        })
    );
    assert_eq!(
        report.wind_shift,
        Some(WindShift {
            hour: Some(5),
            minute: 30,
            frontal_passage: true,
        })
    );

    // 05 UTC is not a 3-hourly report hour
    assert!(close(report.precip_6hr, 0.12));
    assert_eq!(report.precip_3hr, None);
    assert!(close(report.precip_24hr, 1.25));
    assert!(close(report.precip_1hr, 0.03));

    assert!(close(report.max_temp_6hr, 14.2));
    assert!(close(report.min_temp_6hr, 1.1));
    assert!(close(report.max_temp_24hr, 11.2));
    assert!(close(report.min_temp_24hr, 8.4));

    assert!(close(report.snow_depth_in, 5.0));
    assert_eq!(report.ice_accretion.len(), 1);
    assert_eq!(report.ice_accretion[0].hours, 1);
    assert!((report.ice_accretion[0].inches - 0.12).abs() < 1e-9);
    assert!(close(report.sea_level_pressure_hpa, 998.2));

    assert!(report.unparsed_remarks.is_empty());
    assert!(state.diagnostics.is_empty());
}

#[test]
fn test_period_precipitation_at_three_hourly_report() {
    let state = decode_report("METAR KPDX 010955Z 00000KT 10SM CLR 10/05 A3000 RMK AO2 60012");
    assert!(close(state.report.precip_3hr, 0.12));
    assert_eq!(state.report.precip_6hr, None);

    let state = decode_report("METAR KPDX 010955Z 00000KT 10SM CLR 10/05 A3000 RMK AO2 6////");
    assert_eq!(state.report.precip_3hr, None);
    assert!(state.diagnostics.is_empty());
}

#[test]
fn test_negative_precise_temperature() {
    let state = decode_report("METAR KORD 010651Z 27012KT 10SM OVC024 M04/M08 A3025 RMK T10391078");
    assert!(close(state.report.temperature, -3.9));
    assert!(close(state.report.dew_point, -7.8));
}

#[test]
fn test_inverted_daily_extremes_are_malformed() {
    let state = decode_report("METAR KPDX 010555Z 00000KT 10SM CLR 10/05 A3000 RMK 400840112");
    assert_eq!(state.report.max_temp_24hr, None);
    assert_eq!(state.diagnostics.len(), 1);
    assert!(state.diagnostics[0].is_malformed());
}

#[test]
fn test_ice_accretion_periods() {
    let state = decode_report("METAR KPDX 010555Z 00000KT 10SM CLR M02/M03 A3000 RMK I1001 I3004 I6010");
    assert_eq!(
        state.report.ice_accretion,
        vec![
            IceAccretion { hours: 1, inches: 0.01 },
            IceAccretion { hours: 3, inches: 0.04 },
            IceAccretion { hours: 6, inches: 0.1 },
        ]
    );
}
