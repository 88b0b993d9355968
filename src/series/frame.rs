//! Tabular view of a reconstructed series

use super::ObservationSeries;
use crate::constants::columns;
use crate::error::Result;
use crate::models::ParsedObservation;
use polars::prelude::*;

impl ObservationSeries {
    /// Build the output table
    ///
    /// Columns: `datetime` (millisecond UTC), the decoded quantities, the
    /// corrected precipitation under `precipitation_column` and, when
    /// `include_raw` is set, the uncorrected `raw_precipitation`.
    pub fn to_dataframe(&self, precipitation_column: &str, include_raw: bool) -> Result<DataFrame> {
        let millis: Vec<i64> = self
            .rows
            .iter()
            .map(|r| r.timestamp.timestamp_millis())
            .collect();
        let datetime = Series::new(columns::DATETIME.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .into_column();

        let quantity = |name: &str, get: fn(&ParsedObservation) -> Option<f64>| {
            let values: Vec<Option<f64>> = self.rows.iter().map(|r| r.field(get)).collect();
            Column::new(name.into(), values)
        };

        let mut frame_columns = vec![
            datetime,
            quantity(columns::TEMPERATURE, |o| o.temperature),
            quantity(columns::DEW_POINT, |o| o.dew_point),
            quantity(columns::WIND_SPEED, |o| o.wind_speed),
            quantity(columns::WIND_DIRECTION, |o| o.wind_direction),
            quantity(columns::AIR_PRESSURE, |o| o.pressure),
            quantity(columns::SKY_COVER, |o| o.sky_cover),
            Column::new(precipitation_column.into(), self.precipitation()),
        ];
        if include_raw {
            frame_columns.push(quantity(columns::RAW_PRECIPITATION, |o| {
                o.raw_precipitation
            }));
        }

        Ok(DataFrame::new(frame_columns)?)
    }
}
