//! Decoded values of individual METAR groups.
//!
//! Quantities are normalised on decode: temperatures in degrees Celsius,
//! speeds in knots, pressures in inches of mercury (sea-level pressure in
//! hectopascals, as it is reported), precipitation in inches.

use crate::constants::sky_cover;
use serde::{Deserialize, Serialize};

/// Routine or special report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    Metar,
    Speci,
}

/// Surface wind group, e.g. `27015G25KT 240V300`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Degrees true; `None` when variable or missing
    pub direction: Option<f64>,
    pub speed_knots: Option<f64>,
    pub gust_knots: Option<f64>,
    /// Direction reported as `VRB`
    pub variable: bool,
    pub variable_from: Option<f64>,
    pub variable_to: Option<f64>,
}

/// Sky cover codes in ascending opacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkyCover {
    Clear,
    SkyClear,
    NoSignificantCloud,
    NoCloudDetected,
    Few,
    Scattered,
    Broken,
    VerticalVisibility,
    Overcast,
}

impl SkyCover {
    /// Decode a cover code; `///` and unknown codes yield `None`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CLR" => Some(SkyCover::Clear),
            // SCK is a common keying error for SKC
            "SKC" | "SCK" => Some(SkyCover::SkyClear),
            "NSC" => Some(SkyCover::NoSignificantCloud),
            "NCD" => Some(SkyCover::NoCloudDetected),
            "FEW" => Some(SkyCover::Few),
            "SCT" => Some(SkyCover::Scattered),
            "BKN" => Some(SkyCover::Broken),
            "VV" => Some(SkyCover::VerticalVisibility),
            "OVC" | "0VC" => Some(SkyCover::Overcast),
            _ => None,
        }
    }

    /// Opacity fraction of this cover
    pub fn fraction(&self) -> f64 {
        match self {
            SkyCover::Clear
            | SkyCover::SkyClear
            | SkyCover::NoSignificantCloud
            | SkyCover::NoCloudDetected => sky_cover::CLEAR,
            SkyCover::Few => sky_cover::FEW,
            SkyCover::Scattered => sky_cover::SCATTERED,
            SkyCover::Broken => sky_cover::BROKEN,
            SkyCover::VerticalVisibility => sky_cover::VERTICAL_VISIBILITY,
            SkyCover::Overcast => sky_cover::OVERCAST,
        }
    }
}

/// One sky condition group, e.g. `BKN035CB`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyLayer {
    pub cover: Option<SkyCover>,
    pub height_ft: Option<u32>,
    /// Convective cloud type (`CB`, `TCU`)
    pub cloud: Option<String>,
}

/// Prevailing or directional visibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    pub miles: Option<f64>,
    /// `M` (less than) or `P` (greater than)
    pub qualifier: Option<char>,
    pub direction: Option<String>,
    pub cavok: bool,
}

/// Runway visual range, e.g. `R28L/2600V3500FT`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayVisualRange {
    pub runway: String,
    pub low: f64,
    pub high: Option<f64>,
    pub feet: bool,
}

/// Present or recent weather phenomena, e.g. `-SHRA BR`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherGroup {
    pub intensity: String,
    pub descriptor: Option<String>,
    pub precipitation: String,
    pub obscuration: Option<String>,
    pub other: Option<String>,
}

impl WeatherGroup {
    /// Re-encode the group as it appears in a report
    pub fn code(&self) -> String {
        let mut code = self.intensity.clone();
        if let Some(descriptor) = &self.descriptor {
            code.push_str(descriptor);
        }
        code.push_str(&self.precipitation);
        if let Some(obscuration) = &self.obscuration {
            code.push_str(obscuration);
        }
        if let Some(other) = &self.other {
            code.push_str(other);
        }
        code
    }
}

/// `PK WND 28045/1955`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakWind {
    pub direction: f64,
    pub speed_knots: f64,
    pub hour: Option<u32>,
    pub minute: u32,
}

/// `WSHFT 1715 FROPA`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindShift {
    pub hour: Option<u32>,
    pub minute: u32,
    pub frontal_passage: bool,
}

/// `5appp` three-hourly pressure tendency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureTendency {
    /// WMO code table 0200 characteristic, 0-8
    pub characteristic: u8,
    pub change_hpa: f64,
}

/// `I1nnn` ice accretion over the last 1, 3 or 6 hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceAccretion {
    pub hours: u8,
    pub inches: f64,
}

/// Everything decoded from one report body and its remarks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetarReport {
    pub report_type: Option<ReportType>,
    pub station: Option<String>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub modifiers: Vec<String>,
    pub wind: Option<Wind>,
    pub visibility: Vec<Visibility>,
    pub runway_visual_range: Vec<RunwayVisualRange>,
    pub rvr_unavailable: bool,
    pub weather: Vec<WeatherGroup>,
    pub sky: Vec<SkyLayer>,
    pub temperature: Option<f64>,
    pub dew_point: Option<f64>,
    pub altimeter_inhg: Option<f64>,
    pub recent_weather: Vec<WeatherGroup>,
    pub wind_shear_runways: Vec<String>,
    pub color_states: Vec<String>,
    pub runway_states: Vec<String>,
    pub trend: Option<String>,
    pub trend_groups: Vec<String>,

    pub automated_station_type: Option<u8>,
    pub sea_level_pressure_hpa: Option<f64>,
    pub peak_wind: Option<PeakWind>,
    pub wind_shift: Option<WindShift>,
    pub precip_1hr: Option<f64>,
    pub precip_3hr: Option<f64>,
    pub precip_6hr: Option<f64>,
    pub precip_24hr: Option<f64>,
    pub pressure_tendency: Option<PressureTendency>,
    pub max_temp_6hr: Option<f64>,
    pub min_temp_6hr: Option<f64>,
    pub max_temp_24hr: Option<f64>,
    pub min_temp_24hr: Option<f64>,
    pub snow_depth_in: Option<f64>,
    pub ice_accretion: Vec<IceAccretion>,

    pub unparsed_groups: Vec<String>,
    pub unparsed_remarks: Vec<String>,
}

impl MetarReport {
    /// Opacity of the most opaque reported layer, `None` without sky groups
    pub fn sky_cover(&self) -> Option<f64> {
        self.sky
            .iter()
            .filter_map(|layer| layer.cover.map(|c| c.fraction()))
            .fold(None, |max, value| match max {
                Some(current) if current >= value => Some(current),
                _ => Some(value),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(code: &str) -> SkyLayer {
        SkyLayer {
            cover: SkyCover::from_code(code),
            height_ft: None,
            cloud: None,
        }
    }

    #[test]
    fn test_cover_fractions() {
        assert_eq!(SkyCover::from_code("CLR").unwrap().fraction(), 0.0);
        assert_eq!(SkyCover::from_code("NCD").unwrap().fraction(), 0.0);
        assert_eq!(SkyCover::from_code("FEW").unwrap().fraction(), 0.1785);
        assert_eq!(SkyCover::from_code("SCT").unwrap().fraction(), 0.4375);
        assert_eq!(SkyCover::from_code("BKN").unwrap().fraction(), 0.75);
        assert_eq!(SkyCover::from_code("VV").unwrap().fraction(), 0.99);
        assert_eq!(SkyCover::from_code("OVC").unwrap().fraction(), 1.0);
        assert_eq!(SkyCover::from_code("///"), None);
    }

    #[test]
    fn test_sky_cover_takes_maximum_layer() {
        let report = MetarReport {
            sky: vec![layer("FEW"), layer("OVC"), layer("SCT")],
            ..Default::default()
        };
        assert_eq!(report.sky_cover(), Some(1.0));
    }

    #[test]
    fn test_sky_cover_absent_without_layers() {
        assert_eq!(MetarReport::default().sky_cover(), None);

        let obscured = MetarReport {
            sky: vec![layer("///")],
            ..Default::default()
        };
        assert_eq!(obscured.sky_cover(), None);
    }

    #[test]
    fn test_weather_code_round_trip_text() {
        let group = WeatherGroup {
            intensity: "-".to_string(),
            descriptor: Some("SH".to_string()),
            precipitation: "RA".to_string(),
            ..Default::default()
        };
        assert_eq!(group.code(), "-SHRA");
    }
}
