//! Remark group grammar (FMH-1 chapter 12 additive and automated data)
//!
//! Remarks have no fixed order, so every row is tried at each position and
//! the first match wins. Text no row recognises is kept as an unparsed
//! remark.

use super::body::{check_temperature, parse_number};
use super::datatypes::{IceAccretion, PeakWind, PressureTendency, WindShift};
use super::{GroupRule, ParseState};
use lazy_static::lazy_static;
use regex::Captures;

/// Decoded value of one remark group
#[derive(Debug, Clone, PartialEq)]
pub enum RemarkGroup {
    AutomatedStation(u8),
    SeaLevelPressure(f64),
    PeakWind(PeakWind),
    WindShift(WindShift),
    PreciseTemperature {
        temperature: f64,
        dew_point: Option<f64>,
    },
    HourlyPrecipitation(f64),
    /// `6rrrr`, a 3- or 6-hour total depending on the report hour
    PeriodPrecipitation(Option<f64>),
    DailyPrecipitation(f64),
    PressureTendency(PressureTendency),
    SixHourMaximum(f64),
    SixHourMinimum(f64),
    DailyExtremes { maximum: f64, minimum: f64 },
    SnowDepth(f64),
    IceAccretion(IceAccretion),
}

lazy_static! {
    static ref REMARK_RULES: Vec<GroupRule<RemarkGroup>> = vec![
        GroupRule::new("automated", r"^AO(?P<type>\d)\s+", automated, false),
        GroupRule::new("sea_level_pressure", r"^SLP(?P<press>\d\d\d)\s+", sea_level, false),
        GroupRule::new(
            "peak_wind",
            r"^P[A-Z]\s+WND\s+(?P<dir>\d\d\d)(?P<speed>P?\d\d\d?)/(?P<hour>\d\d)?(?P<min>\d\d)\s+",
            peak_wind,
            false,
        ),
        GroupRule::new(
            "wind_shift",
            r"^WSHFT\s+(?P<hour>\d\d)?(?P<min>\d\d)(?:\s+(?P<front>FROPA))?\s+",
            wind_shift,
            false,
        ),
        GroupRule::new(
            "precise_temperature",
            r"^T(?P<tsign>[01])(?P<temp>\d\d\d)(?:(?P<dsign>[01])(?P<dewpt>\d\d\d))?\s+",
            precise_temperature,
            false,
        ),
        GroupRule::new("hourly_precip", r"^P(?P<precip>\d\d\d\d)\s+", hourly_precip, false),
        GroupRule::new(
            "period_precip",
            r"^6(?P<precip>\d\d\d\d|////)\s+",
            period_precip,
            false,
        ),
        GroupRule::new("daily_precip", r"^7(?P<precip>\d\d\d\d)\s+", daily_precip, false),
        GroupRule::new(
            "pressure_tendency",
            r"^5(?P<oper>[0-8])(?P<press>\d\d\d)\s+",
            pressure_tendency,
            false,
        ),
        GroupRule::new(
            "six_hour_temperature",
            r"^(?P<kind>[12])(?P<sign>[01])(?P<temp>\d\d\d)\s+",
            six_hour_temperature,
            false,
        ),
        GroupRule::new(
            "daily_temperature",
            r"^4(?P<smax>[01])(?P<max>\d\d\d)(?P<smin>[01])(?P<min>\d\d\d)\s+",
            daily_temperature,
            false,
        ),
        GroupRule::new("snow_depth", r"^4/(?P<depth>\d\d\d)\s+", snow_depth, false),
        GroupRule::new(
            "ice_accretion",
            r"^I(?P<hours>[136])(?P<ice>\d\d\d)\s+",
            ice_accretion,
            false,
        ),
    ];
}

/// Remark grammar in precedence order
pub fn rules() -> &'static [GroupRule<RemarkGroup>] {
    &REMARK_RULES
}

fn field<'t>(captures: &Captures<'t>, name: &str) -> &'t str {
    captures.name(name).map_or("", |m| m.as_str())
}

/// `sTTT` in tenths of a degree, sign digit 1 for negative
fn tenths_celsius(sign: &str, magnitude: &str) -> Result<f64, String> {
    let value = parse_number::<f64>(magnitude)? / 10.0;
    check_temperature(if sign == "1" { -value } else { value })
}

fn hundredths(text: &str) -> Result<f64, String> {
    Ok(parse_number::<f64>(text)? / 100.0)
}

fn optional_number(captures: &Captures<'_>, name: &str) -> Result<Option<u32>, String> {
    captures
        .name(name)
        .map(|m| parse_number::<u32>(m.as_str()))
        .transpose()
}

fn automated(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    Ok(RemarkGroup::AutomatedStation(parse_number(field(
        captures, "type",
    ))?))
}

/// `SLP982` is 998.2 hPa, `SLP013` is 1001.3 hPa
fn sea_level(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    let tenths = parse_number::<f64>(field(captures, "press"))? / 10.0;
    let hpa = if tenths < 50.0 {
        tenths + 1000.0
    } else {
        tenths + 900.0
    };
    Ok(RemarkGroup::SeaLevelPressure(hpa))
}

fn peak_wind(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    let direction = parse_number::<f64>(field(captures, "dir"))?;
    if direction > crate::constants::limits::MAX_WIND_DIRECTION {
        return Err(format!("peak wind direction {} is out of range", direction));
    }
    let speed_knots = parse_number::<f64>(field(captures, "speed").trim_start_matches('P'))?;
    let hour = optional_number(captures, "hour")?;
    let minute = parse_number::<u32>(field(captures, "min"))?;
    if hour.is_some_and(|h| h > 23) || minute > 59 {
        return Err("peak wind time is not a time".to_string());
    }
    Ok(RemarkGroup::PeakWind(PeakWind {
        direction,
        speed_knots,
        hour,
        minute,
    }))
}

fn wind_shift(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    let hour = optional_number(captures, "hour")?;
    let minute = parse_number::<u32>(field(captures, "min"))?;
    if hour.is_some_and(|h| h > 23) || minute > 59 {
        return Err("wind shift time is not a time".to_string());
    }
    Ok(RemarkGroup::WindShift(WindShift {
        hour,
        minute,
        frontal_passage: captures.name("front").is_some(),
    }))
}

fn precise_temperature(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    let temperature = tenths_celsius(field(captures, "tsign"), field(captures, "temp"))?;
    let dew_point = match captures.name("dewpt") {
        Some(dewpt) => Some(tenths_celsius(field(captures, "dsign"), dewpt.as_str())?),
        None => None,
    };
    Ok(RemarkGroup::PreciseTemperature {
        temperature,
        dew_point,
    })
}

fn hourly_precip(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    Ok(RemarkGroup::HourlyPrecipitation(hundredths(field(
        captures, "precip",
    ))?))
}

fn period_precip(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    let text = field(captures, "precip");
    if text == "////" {
        return Ok(RemarkGroup::PeriodPrecipitation(None));
    }
    Ok(RemarkGroup::PeriodPrecipitation(Some(hundredths(text)?)))
}

fn daily_precip(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    Ok(RemarkGroup::DailyPrecipitation(hundredths(field(
        captures, "precip",
    ))?))
}

/// Characteristics 5 to 8 describe a falling barometer
fn pressure_tendency(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    let characteristic = parse_number::<u8>(field(captures, "oper"))?;
    let change = parse_number::<f64>(field(captures, "press"))? / 10.0;
    Ok(RemarkGroup::PressureTendency(PressureTendency {
        characteristic,
        change_hpa: if characteristic >= 5 { -change } else { change },
    }))
}

fn six_hour_temperature(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    let value = tenths_celsius(field(captures, "sign"), field(captures, "temp"))?;
    match field(captures, "kind") {
        "1" => Ok(RemarkGroup::SixHourMaximum(value)),
        _ => Ok(RemarkGroup::SixHourMinimum(value)),
    }
}

fn daily_temperature(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    let maximum = tenths_celsius(field(captures, "smax"), field(captures, "max"))?;
    let minimum = tenths_celsius(field(captures, "smin"), field(captures, "min"))?;
    if minimum > maximum {
        return Err(format!(
            "24-hour minimum {} exceeds maximum {}",
            minimum, maximum
        ));
    }
    Ok(RemarkGroup::DailyExtremes { maximum, minimum })
}

fn snow_depth(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    Ok(RemarkGroup::SnowDepth(parse_number(field(
        captures, "depth",
    ))?))
}

fn ice_accretion(captures: &Captures<'_>) -> Result<RemarkGroup, String> {
    Ok(RemarkGroup::IceAccretion(IceAccretion {
        hours: parse_number(field(captures, "hours"))?,
        inches: hundredths(field(captures, "ice"))?,
    }))
}

impl ParseState {
    pub(super) fn with_remark(mut self, group: RemarkGroup) -> Self {
        let report = &mut self.report;
        match group {
            RemarkGroup::AutomatedStation(kind) => report.automated_station_type = Some(kind),
            RemarkGroup::SeaLevelPressure(hpa) => report.sea_level_pressure_hpa = Some(hpa),
            RemarkGroup::PeakWind(peak) => report.peak_wind = Some(peak),
            RemarkGroup::WindShift(shift) => report.wind_shift = Some(shift),
            RemarkGroup::PreciseTemperature {
                temperature,
                dew_point,
            } => {
                report.temperature = Some(temperature);
                if dew_point.is_some() {
                    report.dew_point = dew_point;
                }
            }
            RemarkGroup::HourlyPrecipitation(inches) => report.precip_1hr = Some(inches),
            RemarkGroup::PeriodPrecipitation(inches) => {
                // 3-hourly at 03, 09, 15 and 21 UTC, 6-hourly otherwise
                if report.hour.is_some_and(|hour| hour % 6 == 3) {
                    report.precip_3hr = inches;
                } else {
                    report.precip_6hr = inches;
                }
            }
            RemarkGroup::DailyPrecipitation(inches) => report.precip_24hr = Some(inches),
            RemarkGroup::PressureTendency(tendency) => report.pressure_tendency = Some(tendency),
            RemarkGroup::SixHourMaximum(value) => report.max_temp_6hr = Some(value),
            RemarkGroup::SixHourMinimum(value) => report.min_temp_6hr = Some(value),
            RemarkGroup::DailyExtremes { maximum, minimum } => {
                report.max_temp_24hr = Some(maximum);
                report.min_temp_24hr = Some(minimum);
            }
            RemarkGroup::SnowDepth(inches) => report.snow_depth_in = Some(inches),
            RemarkGroup::IceAccretion(ice) => report.ice_accretion.push(ice),
        }
        self
    }
}
