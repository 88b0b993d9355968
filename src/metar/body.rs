//! Main-body group grammar
//!
//! Rows are tried in the order a report encodes them. Patterns are
//! anchored at the current position and consume trailing whitespace.

use super::datatypes::*;
use super::{GroupRule, ParseState};
use crate::constants::{limits, units};
use lazy_static::lazy_static;
use regex::Captures;

/// Decoded value of one main-body group
#[derive(Debug, Clone, PartialEq)]
pub enum BodyGroup {
    ReportType(ReportType),
    Station(String),
    Time { day: u32, hour: u32, minute: u32 },
    Modifier(String),
    Wind(Wind),
    Visibility(Visibility),
    RunwayVisualRange(RunwayVisualRange),
    RunwayRangeUnavailable,
    Weather(WeatherGroup),
    Sky(SkyLayer),
    Temperature {
        temperature: Option<f64>,
        dew_point: Option<f64>,
    },
    Pressure(Option<f64>),
    RecentWeather(WeatherGroup),
    WindShear(String),
    ColorState(String),
    RunwayState(String),
    Trend(String),
    RemarksMarker,
}

lazy_static! {
    static ref BODY_RULES: Vec<GroupRule<BodyGroup>> = vec![
        GroupRule::new("type", r"^(?P<type>METAR|SPECI)\s+", report_type, false),
        GroupRule::new("station", r"^(?P<station>[A-Z][A-Z0-9]{3})\s+", station, false),
        GroupRule::new(
            "time",
            r"^(?P<day>\d\d)(?P<hour>\d\d)(?P<min>\d\d)Z?\s+",
            time,
            false,
        ),
        GroupRule::new(
            "modifier",
            r"^(?P<mod>AUTO|FINO|NIL|TEST|CORR?|RTD|CC[A-G])\s+",
            modifier,
            false,
        ),
        GroupRule::new(
            "wind",
            r"(?x)
            ^(?P<dir>[\dO]{3}|[0O]|///|MMM|VRB)
             (?P<speed>P?[\dO]{2,3}|[/M]{2,3})
             (?:G(?P<gust>P?(?:\d{1,3}|[/M]{1,3})))?
             (?P<units>KTS?|LT|K|T|KMH|MPS)?
             (?:\s+(?P<varfrom>\d\d\d)V(?P<varto>\d\d\d))?
             \s+",
            wind,
            false,
        ),
        GroupRule::new(
            "visibility",
            r"(?x)
            ^(?:(?P<dist>[MP]?\d\d\d\d|////)(?P<dir>[NSEW][EW]?|NDV)?
              | (?P<distu>[MP]?(?:\d+|\d\d?/\d\d?|\d+\s+\d/\d))(?P<units>SM|KM|M|U)
              | (?P<cavok>CAVOK))
             \s+",
            visibility,
            true,
        ),
        GroupRule::new(
            "runway",
            r"(?x)
            ^(?:(?P<rvrno>RVRNO)
              | R(?P<name>\d\d(?:RR?|LL?|C)?)/
                (?P<low>[MP]?\d\d\d\d)
                (?:V(?P<high>[MP]?\d\d\d\d))?
                (?P<unit>FT)?[/NDU]*)
             \s+",
            runway,
            true,
        ),
        GroupRule::new(
            "weather",
            r"(?x)
            ^(?P<int>(?:-|\+|VC)*)
             (?P<desc>(?:MI|PR|BC|DR|BL|SH|TS|FZ)+)?
             (?P<prec>(?:DZ|RA|SN|SG|IC|PL|GR|GS|UP)*)
             (?P<obsc>BR|FG|FU|VA|DU|SA|HZ|PY)?
             (?P<other>PO|SQ|FC|SS|DS|NSW)?
             (?P<int2>[-+])?
             \s+",
            weather,
            true,
        ),
        GroupRule::new(
            "sky",
            r"(?x)
            ^(?P<cover>VV|CLR|SKC|SCK|NSC|NCD|BKN|SCT|FEW|[O0]VC|///)
             (?P<height>[\dO]{2,4}|///)?
             (?P<cloud>[A-Z][A-Z]+|///)?
             \s+",
            sky,
            true,
        ),
        GroupRule::new(
            "temperature",
            r"^(?P<temp>[M-]?\d+|//|XX|MM)/(?P<dewpt>[M-]?\d+|//|XX|MM)?\s+",
            temperature,
            false,
        ),
        GroupRule::new(
            "pressure",
            r"(?x)
            ^(?:(?P<unit>A|QNH|Q)(?P<press>[\dO]{3,4}|////)
              | (?P<press_ins>[\dO]{3,4})INS)
             \s+",
            pressure,
            true,
        ),
        GroupRule::new(
            "recent",
            r"(?x)
            ^RE(?P<desc>MI|PR|BC|DR|BL|SH|TS|FZ)?
             (?P<prec>(?:DZ|RA|SN|SG|IC|PL|GR|GS|UP)*)
             (?P<obsc>BR|FG|FU|VA|DU|SA|HZ|PY)?
             (?P<other>PO|SQ|FC|SS|DS)?
             \s+",
            recent,
            true,
        ),
        GroupRule::new(
            "windshear",
            r"^(?:WS\s+)?(?P<name>ALL\s+RWY|RWY\d\d(?:RR?|LL?|C)?)\s+",
            windshear,
            true,
        ),
        GroupRule::new(
            "color",
            r"^(?P<color>(?:BLACK)?(?:BLU|GRN|WHT|RED)\+?(?:/?(?:BLACK)?(?:BLU|GRN|WHT|RED)\+?)*)\s+",
            color,
            true,
        ),
        GroupRule::new(
            "runway_state",
            r"(?x)
            ^(?P<state>(?:\d\d|R\d\d(?:RR?|LL?|C)?/?)
              (?:SNOCLO|CLRD(?:\d\d|//)|[\d/][\d/](?:\d\d|//)(?:\d\d|//)))
             \s+",
            runway_state,
            true,
        ),
        GroupRule::new("trend", r"^(?P<trend>TEMPO|BECMG|FCST|NOSIG)\s+", trend, false),
        GroupRule::new("remark", r"^(?:RMKS?|NOSPECI)\s+", remark, false),
    ];
}

/// Main-body grammar in precedence order
pub fn rules() -> &'static [GroupRule<BodyGroup>] {
    &BODY_RULES
}

// =============================================================================
// Value helpers
// =============================================================================

fn capture<'t>(captures: &Captures<'t>, name: &str) -> Option<&'t str> {
    captures
        .name(name)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
}

pub(crate) fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T, String> {
    text.parse::<T>()
        .map_err(|_| format!("'{}' is not a number", text))
}

/// Reported digits sometimes use the letter O for zero
fn digits(text: &str) -> String {
    text.replace('O', "0")
}

fn missing(text: &str) -> bool {
    text.chars().all(|c| c == '/' || c == 'M')
}

/// `M05` is -5 degrees; `//`, `XX`, `MM` are not reported
fn signed_temperature(text: &str) -> Result<Option<f64>, String> {
    if matches!(text, "//" | "XX" | "MM") {
        return Ok(None);
    }
    let value = match text.strip_prefix(['M', '-']) {
        Some(magnitude) => -parse_number::<f64>(magnitude)?,
        None => parse_number::<f64>(text)?,
    };
    check_temperature(value).map(Some)
}

pub(crate) fn check_temperature(value: f64) -> Result<f64, String> {
    if (limits::MIN_TEMPERATURE_C..=limits::MAX_TEMPERATURE_C).contains(&value) {
        Ok(value)
    } else {
        Err(format!("temperature {} C is out of range", value))
    }
}

/// Speed in knots from a speed field and its unit
fn speed_knots(text: &str, unit: Option<&str>) -> Result<Option<f64>, String> {
    if missing(text) {
        return Ok(None);
    }
    let value = parse_number::<f64>(&digits(text.trim_start_matches('P')))?;
    let factor = match unit {
        Some("MPS") => units::KNOTS_PER_MPS,
        Some("KMH") => units::KNOTS_PER_KMH,
        _ => 1.0,
    };
    Ok(Some(value * factor))
}

fn direction(text: &str) -> Result<f64, String> {
    let value = parse_number::<f64>(text)?;
    if value > limits::MAX_WIND_DIRECTION {
        Err(format!("wind direction {} is out of range", value))
    } else {
        Ok(value)
    }
}

/// `1 1/2`, `3/4`, `10`
fn fraction(text: &str) -> Result<f64, String> {
    let mut total = 0.0;
    for part in text.split_whitespace() {
        total += match part.split_once('/') {
            Some((numerator, denominator)) => {
                let denominator = parse_number::<f64>(denominator)?;
                if denominator == 0.0 {
                    return Err(format!("'{}' has a zero denominator", part));
                }
                parse_number::<f64>(numerator)? / denominator
            }
            None => parse_number::<f64>(part)?,
        };
    }
    Ok(total)
}

fn qualifier(text: &str) -> (Option<char>, &str) {
    match text.chars().next() {
        Some(c @ ('M' | 'P')) => (Some(c), &text[1..]),
        _ => (None, text),
    }
}

fn weather_group(captures: &Captures<'_>) -> WeatherGroup {
    let intensity = capture(captures, "int")
        .or_else(|| capture(captures, "int2"))
        .unwrap_or_default();
    WeatherGroup {
        intensity: intensity.to_string(),
        descriptor: capture(captures, "desc").map(str::to_string),
        precipitation: capture(captures, "prec").unwrap_or_default().to_string(),
        obscuration: capture(captures, "obsc").map(str::to_string),
        other: capture(captures, "other").map(str::to_string),
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn report_type(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    match capture(captures, "type") {
        Some("SPECI") => Ok(BodyGroup::ReportType(ReportType::Speci)),
        _ => Ok(BodyGroup::ReportType(ReportType::Metar)),
    }
}

fn station(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    Ok(BodyGroup::Station(
        capture(captures, "station").unwrap_or_default().to_string(),
    ))
}

fn time(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    let day: u32 = parse_number(capture(captures, "day").unwrap_or_default())?;
    let hour: u32 = parse_number(capture(captures, "hour").unwrap_or_default())?;
    let minute: u32 = parse_number(capture(captures, "min").unwrap_or_default())?;
    if !(1..=31).contains(&day) || hour > 23 || minute > 59 {
        return Err(format!("{:02}{:02}{:02}Z is not a time", day, hour, minute));
    }
    Ok(BodyGroup::Time { day, hour, minute })
}

fn modifier(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    Ok(BodyGroup::Modifier(
        capture(captures, "mod").unwrap_or_default().to_string(),
    ))
}

fn wind(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    let units = capture(captures, "units");
    let mut wind = Wind::default();

    match capture(captures, "dir").unwrap_or_default() {
        "VRB" => wind.variable = true,
        "///" | "MMM" => {}
        text => wind.direction = Some(direction(&digits(text))?),
    }

    wind.speed_knots = speed_knots(capture(captures, "speed").unwrap_or("//"), units)?;
    if let Some(gust) = capture(captures, "gust") {
        wind.gust_knots = speed_knots(gust, units)?;
    }
    if let (Some(from), Some(to)) = (capture(captures, "varfrom"), capture(captures, "varto")) {
        wind.variable_from = Some(direction(from)?);
        wind.variable_to = Some(direction(to)?);
    }

    Ok(BodyGroup::Wind(wind))
}

fn visibility(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    if capture(captures, "cavok").is_some() {
        return Ok(BodyGroup::Visibility(Visibility {
            miles: None,
            qualifier: None,
            direction: None,
            cavok: true,
        }));
    }

    if let Some(text) = capture(captures, "distu") {
        let (qualifier, value) = qualifier(text);
        let value = fraction(value)?;
        let miles = match capture(captures, "units") {
            Some("KM") => value * units::MILES_PER_KM,
            Some("M") => value * units::MILES_PER_METRE,
            _ => value,
        };
        return Ok(BodyGroup::Visibility(Visibility {
            miles: Some(miles),
            qualifier,
            direction: None,
            cavok: false,
        }));
    }

    let text = capture(captures, "dist").unwrap_or("////");
    let (qualifier, value) = qualifier(text);
    let miles = if missing(value) {
        None
    } else {
        Some(parse_number::<f64>(value)? * units::MILES_PER_METRE)
    };
    Ok(BodyGroup::Visibility(Visibility {
        miles,
        qualifier,
        direction: capture(captures, "dir").map(str::to_string),
        cavok: false,
    }))
}

fn runway(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    if capture(captures, "rvrno").is_some() {
        return Ok(BodyGroup::RunwayRangeUnavailable);
    }
    let low = parse_number::<f64>(qualifier(capture(captures, "low").unwrap_or_default()).1)?;
    let high = capture(captures, "high")
        .map(|text| parse_number::<f64>(qualifier(text).1))
        .transpose()?;
    Ok(BodyGroup::RunwayVisualRange(RunwayVisualRange {
        runway: capture(captures, "name").unwrap_or_default().to_string(),
        low,
        high,
        feet: capture(captures, "unit").is_some(),
    }))
}

fn weather(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    let group = weather_group(captures);
    if group.descriptor.is_none()
        && group.precipitation.is_empty()
        && group.obscuration.is_none()
        && group.other.is_none()
    {
        return Err("intensity without a phenomenon".to_string());
    }
    Ok(BodyGroup::Weather(group))
}

fn sky(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    let code = capture(captures, "cover").unwrap_or_default();
    let height_ft = match capture(captures, "height") {
        Some(text) if !missing(text) => Some(parse_number::<u32>(&digits(text))? * 100),
        _ => None,
    };
    Ok(BodyGroup::Sky(SkyLayer {
        cover: SkyCover::from_code(code),
        height_ft,
        cloud: capture(captures, "cloud")
            .filter(|c| !missing(c))
            .map(str::to_string),
    }))
}

fn temperature(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    let temperature = signed_temperature(capture(captures, "temp").unwrap_or("//"))?;
    let dew_point = match capture(captures, "dewpt") {
        Some(text) => signed_temperature(text)?,
        None => None,
    };
    Ok(BodyGroup::Temperature {
        temperature,
        dew_point,
    })
}

fn pressure(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    let (text, hectopascals) = match capture(captures, "press_ins") {
        Some(text) => (text, false),
        None => (
            capture(captures, "press").unwrap_or("////"),
            matches!(capture(captures, "unit"), Some("Q" | "QNH")),
        ),
    };
    if missing(text) {
        return Ok(BodyGroup::Pressure(None));
    }

    let value = parse_number::<f64>(&digits(text))?;
    let inhg = if hectopascals {
        value * units::INHG_PER_HPA
    } else {
        value / 100.0
    };
    if !(limits::MIN_ALTIMETER_INHG..=limits::MAX_ALTIMETER_INHG).contains(&inhg) {
        return Err(format!("altimeter {:.2} inHg is out of range", inhg));
    }
    Ok(BodyGroup::Pressure(Some(inhg)))
}

fn recent(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    Ok(BodyGroup::RecentWeather(weather_group(captures)))
}

fn windshear(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    let name = capture(captures, "name").unwrap_or_default();
    let runway = match name.strip_prefix("RWY") {
        Some(runway) => runway.to_string(),
        None => "ALL".to_string(),
    };
    Ok(BodyGroup::WindShear(runway))
}

fn color(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    Ok(BodyGroup::ColorState(
        capture(captures, "color").unwrap_or_default().to_string(),
    ))
}

fn runway_state(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    Ok(BodyGroup::RunwayState(
        capture(captures, "state").unwrap_or_default().to_string(),
    ))
}

fn trend(captures: &Captures<'_>) -> Result<BodyGroup, String> {
    Ok(BodyGroup::Trend(
        capture(captures, "trend").unwrap_or_default().to_string(),
    ))
}

fn remark(_: &Captures<'_>) -> Result<BodyGroup, String> {
    Ok(BodyGroup::RemarksMarker)
}

// =============================================================================
// Folding into the parse state
// =============================================================================

impl ParseState {
    pub(super) fn with_body(mut self, group: BodyGroup) -> Self {
        let report = &mut self.report;
        match group {
            BodyGroup::ReportType(kind) => report.report_type = Some(kind),
            BodyGroup::Station(station) => report.station = Some(station),
            BodyGroup::Time { day, hour, minute } => {
                report.day = Some(day);
                report.hour = Some(hour);
                report.minute = Some(minute);
            }
            BodyGroup::Modifier(modifier) => report.modifiers.push(modifier),
            BodyGroup::Wind(wind) => report.wind = Some(wind),
            BodyGroup::Visibility(visibility) => report.visibility.push(visibility),
            BodyGroup::RunwayVisualRange(range) => report.runway_visual_range.push(range),
            BodyGroup::RunwayRangeUnavailable => report.rvr_unavailable = true,
            BodyGroup::Weather(weather) => report.weather.push(weather),
            BodyGroup::Sky(layer) => report.sky.push(layer),
            BodyGroup::Temperature {
                temperature,
                dew_point,
            } => {
                report.temperature = temperature;
                report.dew_point = dew_point;
            }
            BodyGroup::Pressure(pressure) => {
                if pressure.is_some() {
                    report.altimeter_inhg = pressure;
                }
            }
            BodyGroup::RecentWeather(weather) => report.recent_weather.push(weather),
            BodyGroup::WindShear(runway) => report.wind_shear_runways.push(runway),
            BodyGroup::ColorState(state) => report.color_states.push(state),
            BodyGroup::RunwayState(state) => report.runway_states.push(state),
            BodyGroup::Trend(trend) => {
                report.trend = Some(trend);
                self.in_trend = true;
            }
            BodyGroup::RemarksMarker => self.in_remarks = true,
        }
        self
    }
}
