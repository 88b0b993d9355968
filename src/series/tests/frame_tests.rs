//! Tabular output tests

use super::{at, observation};
use crate::series::reconstruct;
use polars::prelude::*;

fn sample_series() -> crate::series::ObservationSeries {
    reconstruct(vec![
        observation(at(1, 0, 0), 4.0, Some(0.01)),
        observation(at(1, 0, 5), 4.5, Some(0.03)),
        observation(at(1, 0, 15), 5.0, None),
    ])
    .unwrap()
}

#[test]
fn test_dataframe_columns_and_types() {
    let df = sample_series().to_dataframe("precipitation", true).unwrap();

    let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "datetime",
            "temperature",
            "dew_point",
            "wind_speed",
            "wind_direction",
            "air_pressure",
            "sky_cover",
            "precipitation",
            "raw_precipitation",
        ]
    );
    assert_eq!(df.height(), 4);
    assert_eq!(
        df.column("datetime").unwrap().dtype(),
        &DataType::Datetime(TimeUnit::Milliseconds, None)
    );

    // the 00:10 slot has no report
    assert_eq!(df.column("temperature").unwrap().null_count(), 1);
    assert_eq!(df.column("dew_point").unwrap().null_count(), 4);

    let precipitation = df.column("precipitation").unwrap().f64().unwrap();
    assert_eq!(precipitation.get(0), Some(0.01));
    assert!((precipitation.get(1).unwrap() - 0.02).abs() < 1e-9);
    assert_eq!(precipitation.get(3), None);
}

#[test]
fn test_dataframe_without_raw_column() {
    let df = sample_series().to_dataframe("rain_in", false).unwrap();
    assert_eq!(df.width(), 8);
    assert!(df.column("rain_in").is_ok());
    assert!(df.column("raw_precipitation").is_err());
}
