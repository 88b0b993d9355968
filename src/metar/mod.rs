//! METAR/SPECI report decoding
//!
//! A report is decoded by walking two static, ordered grammars: the main
//! body groups and the remark groups. Each grammar row pairs a regex with a
//! pure handler that turns the captures into a decoded group value. The
//! driver folds those values into an explicit [`ParseState`], so decoding
//! carries no state between calls and records recoverable problems as
//! [`Diagnostic`] values rather than logging them.
//!
//! Lines from NCDC 5-minute ASOS files carry a fixed-width envelope in
//! front of the report; its timestamp takes precedence over the report's
//! own date/time group. See [`envelope`].

pub mod body;
pub mod datatypes;
pub mod envelope;
pub mod remarks;

#[cfg(test)]
pub mod tests;

pub use datatypes::*;

use crate::error::{AsosError, Result};
use crate::models::{Diagnostic, ParsedObservation};
use body::BodyGroup;
use chrono::{DateTime, NaiveDate, Utc};
use regex::{Captures, Regex};
use remarks::RemarkGroup;

/// Handler turning regex captures into a decoded group, or a reason the
/// group's value is unusable
pub type GroupHandler<G> = fn(&Captures<'_>) -> std::result::Result<G, String>;

/// One row of a grammar table
pub struct GroupRule<G> {
    pub name: &'static str,
    pub pattern: Regex,
    pub handler: GroupHandler<G>,
    /// Retry the row at the same position after a match
    pub repeatable: bool,
}

impl<G> GroupRule<G> {
    pub(crate) fn new(
        name: &'static str,
        pattern: &str,
        handler: GroupHandler<G>,
        repeatable: bool,
    ) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid {} group pattern: {}", name, e)),
            handler,
            repeatable,
        }
    }
}

/// Everything accumulated while decoding one report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseState {
    pub report: MetarReport,
    pub diagnostics: Vec<Diagnostic>,
    /// A trend marker has been seen; later free text belongs to the trend
    pub in_trend: bool,
    /// The remarks marker has been seen
    pub in_remarks: bool,
}

impl ParseState {
    fn with_body_outcome(
        self,
        rule: &str,
        text: &str,
        outcome: std::result::Result<BodyGroup, String>,
    ) -> Self {
        match outcome {
            Ok(group) => self.with_body(group),
            Err(reason) => self.with_malformed(rule, text, reason),
        }
    }

    fn with_remark_outcome(
        self,
        rule: &str,
        text: &str,
        outcome: std::result::Result<RemarkGroup, String>,
    ) -> Self {
        match outcome {
            Ok(group) => self.with_remark(group),
            Err(reason) => self.with_malformed(rule, text, reason),
        }
    }

    fn with_malformed(mut self, rule: &str, text: &str, reason: String) -> Self {
        self.diagnostics.push(Diagnostic::MalformedGroup {
            rule: rule.to_string(),
            group: text.to_string(),
            reason,
        });
        self
    }

    fn with_unparsed(mut self, token: &str) -> Self {
        if self.in_trend {
            self.report.trend_groups.push(token.to_string());
        } else {
            self.report.unparsed_groups.push(token.to_string());
            self.diagnostics.push(Diagnostic::UnparsedGroup {
                group: token.to_string(),
            });
        }
        self
    }

    fn with_unparsed_remark(mut self, token: &str) -> Self {
        self.report.unparsed_remarks.push(token.to_string());
        self.diagnostics.push(Diagnostic::UnparsedRemark {
            group: token.to_string(),
        });
        self
    }
}

/// Decode one raw report line
///
/// The timestamp comes from the NCDC envelope when present. A bare METAR
/// has no year or month, so it fails here; use [`parse_with_reference`].
pub fn parse(raw: &str) -> Result<ParsedObservation> {
    decode_line(raw, None)
}

/// Decode one raw report line, taking year and month from the caller
/// when the line has no envelope
pub fn parse_with_reference(raw: &str, year: i32, month: u32) -> Result<ParsedObservation> {
    decode_line(raw, Some((year, month)))
}

/// Decode report text (no envelope) into the full group set
pub fn decode_report(text: &str) -> ParseState {
    let code = format!("{} ", text.trim());
    let (state, remainder) = decode_body(&code, ParseState::default());
    decode_remarks(remainder, state)
}

fn decode_line(raw: &str, reference: Option<(i32, u32)>) -> Result<ParsedObservation> {
    let line = raw.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(AsosError::EmptyReport);
    }

    if let Some(envelope) = envelope::split(line) {
        let state = decode_report(envelope.body);
        let timestamp = timestamp_from_parts(
            envelope.year,
            envelope.month,
            envelope.day,
            envelope.hour,
            envelope.minute,
        )
        .ok_or_else(|| AsosError::parse(line, "envelope date is not a calendar date"))?;

        let station = Some(envelope.station.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| state.report.station.clone());

        return Ok(ParsedObservation::from_report(
            timestamp,
            station,
            state.report,
            state.diagnostics,
        ));
    }

    let state = decode_report(line);
    let (year, month) = reference.ok_or_else(|| {
        AsosError::parse(line, "no station-products envelope and no reference month")
    })?;
    let (day, hour, minute) = match (state.report.day, state.report.hour, state.report.minute) {
        (Some(day), Some(hour), Some(minute)) => (day, hour, minute),
        _ => return Err(AsosError::parse(line, "no date/time group")),
    };
    let timestamp = timestamp_from_parts(year, month, day, hour, minute)
        .ok_or_else(|| AsosError::parse(line, "date/time group is not a calendar date"))?;

    let station = state.report.station.clone();
    Ok(ParsedObservation::from_report(
        timestamp,
        station,
        state.report,
        state.diagnostics,
    ))
}

fn timestamp_from_parts(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
}

/// Split off the leading whitespace-delimited token
fn split_token(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (text, ""),
    }
}

/// Walk the body grammar; returns the state and the text after the
/// remarks marker
fn decode_body(code: &str, mut state: ParseState) -> (ParseState, &str) {
    let rules = body::rules();
    let mut rest = code;
    let mut index = 0;
    // first row that failed since the last successful match
    let mut resume_from: Option<usize> = None;

    while index < rules.len() && !rest.is_empty() {
        let rule = &rules[index];
        let mut last_attempt_failed = true;

        while let Some(captures) = rule.pattern.captures(rest) {
            let (text, end) = captures
                .get(0)
                .map_or(("", 0), |m| (m.as_str().trim(), m.end()));
            state = state.with_body_outcome(rule.name, text, (rule.handler)(&captures));
            rest = &rest[end..];
            resume_from = None;
            last_attempt_failed = false;

            if !rule.repeatable {
                break;
            }
            last_attempt_failed = true;
        }

        if last_attempt_failed && resume_from.is_none() {
            resume_from = Some(index);
        }
        index += 1;

        if index == rules.len() && last_attempt_failed && !rest.is_empty() {
            let (token, remainder) = split_token(rest);
            state = state.with_unparsed(token);
            rest = remainder;
            index = resume_from.take().unwrap_or(0);
        }
    }

    (state, rest)
}

/// Walk the remark grammar over whatever follows the remarks marker
fn decode_remarks(mut rest: &str, mut state: ParseState) -> ParseState {
    let rules = remarks::rules();

    'groups: while !rest.is_empty() {
        for rule in rules {
            if let Some(captures) = rule.pattern.captures(rest) {
                let (text, end) = captures
                    .get(0)
                    .map_or(("", 0), |m| (m.as_str().trim(), m.end()));
                state = state.with_remark_outcome(rule.name, text, (rule.handler)(&captures));
                rest = &rest[end..];
                continue 'groups;
            }
        }

        let (token, remainder) = split_token(rest);
        state = state.with_unparsed_remark(token);
        rest = remainder;
    }

    state
}
