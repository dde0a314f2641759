//! Bounded recurrence rules and their canonical string form.
//!
//! A [`RecurrencePattern`] is a restricted RFC 5545 rule: frequency, step,
//! an explicit [`Bound`], optional weekdays and a start time in an IANA
//! timezone. The RFC semantics of expansion are delegated to the `rrule`
//! crate; this module owns the canonical text, boundedness, and the
//! [`ExpansionLimits`] every expansion is checked against.
//!
//! Canonical text is two lines:
//!
//! ```text
//! DTSTART:20260105T090000Z
//! RRULE:FREQ=WEEKLY;INTERVAL=1;COUNT=10;BYDAY=MO,WE
//! ```
//!
//! or, with a timezone, `DTSTART;TZID=Europe/Berlin:20260105T090000`. In that
//! case `UNTIL` is also local wall time, written without a `Z`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::Interval;
use crate::intervals::Intervals;

pub const DEFAULT_MAX_OCCURRENCES: u16 = 4096;
pub const DEFAULT_MAX_SPAN_DAYS: i64 = 730;

const ICAL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Upper bounds enforced on every expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    pub max_occurrences: u16,
    pub max_span: Duration,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            max_span: Duration::days(DEFAULT_MAX_SPAN_DAYS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
    Minutely,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Yearly => "YEARLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Daily => "DAILY",
            Frequency::Hourly => "HOURLY",
            Frequency::Minutely => "MINUTELY",
        }
    }
}

impl FromStr for Frequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "YEARLY" => Ok(Frequency::Yearly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "WEEKLY" => Ok(Frequency::Weekly),
            "DAILY" => Ok(Frequency::Daily),
            "HOURLY" => Ok(Frequency::Hourly),
            "MINUTELY" => Ok(Frequency::Minutely),
            other => Err(EngineError::InvalidRule(format!(
                "unsupported FREQ: {}",
                other
            ))),
        }
    }
}

/// How a recurrence ends. An open-ended recurrence cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Total number of occurrences.
    Count(u32),
    /// Last permitted occurrence start, in the pattern's timezone (inclusive).
    Until(NaiveDateTime),
}

/// A bounded repeating pattern of occurrence start times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrencePattern {
    start: NaiveDateTime,
    timezone: Tz,
    frequency: Frequency,
    interval: u32,
    bound: Bound,
    weekdays: Vec<Weekday>,
}

impl RecurrencePattern {
    /// A pattern in UTC with step 1 and no weekday restriction.
    pub fn new(frequency: Frequency, start: NaiveDateTime, bound: Bound) -> Self {
        Self {
            start,
            timezone: Tz::UTC,
            frequency,
            interval: 1,
            bound,
            weekdays: Vec::new(),
        }
    }

    /// Interpret `start` and an `Until` bound as wall-clock time in `timezone`.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Restrict occurrences to the given weekdays (stored Monday-first, deduplicated).
    pub fn with_weekdays(mut self, weekdays: &[Weekday]) -> Self {
        let mut weekdays = weekdays.to_vec();
        weekdays.sort_by_key(|day| day.num_days_from_monday());
        weekdays.dedup();
        self.weekdays = weekdays;
        self
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    pub fn weekdays(&self) -> &[Weekday] {
        &self.weekdays
    }

    fn is_utc(&self) -> bool {
        self.timezone == Tz::UTC
    }

    /// Check the invariants `rrule` would otherwise reject less clearly.
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(EngineError::InvalidRule("INTERVAL must be positive".into()));
        }
        // A DTSTART skipped or repeated by a DST shift has no single instant.
        if self.timezone.from_local_datetime(&self.start).single().is_none() {
            return Err(EngineError::InvalidRule(format!(
                "DTSTART {} does not exist or is ambiguous in {}",
                self.start.format(ICAL_FORMAT),
                self.timezone.name()
            )));
        }
        match self.bound {
            Bound::Count(0) => Err(EngineError::InvalidRule("COUNT must be positive".into())),
            Bound::Until(until) if until < self.start => Err(EngineError::InvalidRule(
                "UNTIL precedes DTSTART".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Concrete occurrence start times, in UTC and in order.
    ///
    /// # Errors
    /// Returns `EngineError::OccurrenceLimit` or `EngineError::SpanLimit` when
    /// the pattern exceeds `limits`, and `EngineError::InvalidRule` if `rrule`
    /// refuses the pattern. Results are never silently truncated.
    pub fn occurrences(&self, limits: &ExpansionLimits) -> Result<Vec<DateTime<Utc>>> {
        self.validate()?;

        let span_error = || EngineError::SpanLimit {
            limit_days: limits.max_span.num_days(),
        };
        match self.bound {
            Bound::Count(count) if count > u32::from(limits.max_occurrences) => {
                return Err(EngineError::OccurrenceLimit {
                    limit: limits.max_occurrences,
                });
            }
            Bound::Until(until) if until - self.start > limits.max_span => {
                return Err(span_error());
            }
            _ => {}
        }

        let rrule_set: RRuleSet = self
            .to_string()
            .parse()
            .map_err(|e| EngineError::InvalidRule(format!("{}", e)))?;

        // Ask for one more than allowed so an overflow is detectable.
        let instances = rrule_set.all(limits.max_occurrences.saturating_add(1));
        if instances.dates.len() > usize::from(limits.max_occurrences) {
            return Err(EngineError::OccurrenceLimit {
                limit: limits.max_occurrences,
            });
        }

        let dates: Vec<DateTime<Utc>> = instances
            .dates
            .into_iter()
            .map(|dt| dt.with_timezone(&Utc))
            .collect();

        if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
            if *last - *first > limits.max_span {
                return Err(span_error());
            }
        }

        Ok(dates)
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start.format(ICAL_FORMAT);
        if self.is_utc() {
            writeln!(f, "DTSTART:{}Z", start)?;
        } else {
            writeln!(f, "DTSTART;TZID={}:{}", self.timezone.name(), start)?;
        }

        write!(
            f,
            "RRULE:FREQ={};INTERVAL={}",
            self.frequency.as_str(),
            self.interval
        )?;
        match self.bound {
            Bound::Count(count) => write!(f, ";COUNT={}", count)?,
            Bound::Until(until) => {
                write!(f, ";UNTIL={}", until.format(ICAL_FORMAT))?;
                if self.is_utc() {
                    write!(f, "Z")?;
                }
            }
        }

        if !self.weekdays.is_empty() {
            let days: Vec<&str> = self.weekdays.iter().map(|day| weekday_code(*day)).collect();
            write!(f, ";BYDAY={}", days.join(","))?;
        }
        Ok(())
    }
}

impl FromStr for RecurrencePattern {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let mut dtstart: Option<(NaiveDateTime, Tz)> = None;
        let mut rule: Option<&str> = None;

        for line in s.lines().map(str::trim).filter(|line| !line.is_empty()) {
            if let Some(rest) = line.strip_prefix("DTSTART") {
                if dtstart.is_some() {
                    return Err(EngineError::InvalidRule("duplicate DTSTART".into()));
                }
                dtstart = Some(parse_dtstart(rest)?);
            } else if let Some(rest) = line.strip_prefix("RRULE:") {
                if rule.is_some() {
                    return Err(EngineError::InvalidRule("duplicate RRULE".into()));
                }
                rule = Some(rest);
            } else {
                return Err(EngineError::InvalidRule(format!(
                    "unexpected line: {}",
                    line
                )));
            }
        }

        let (start, timezone) =
            dtstart.ok_or_else(|| EngineError::InvalidRule("missing DTSTART".into()))?;
        let rule = rule.ok_or_else(|| EngineError::InvalidRule("missing RRULE".into()))?;
        let utc = timezone == Tz::UTC;

        let mut seen: Vec<String> = Vec::new();
        let mut frequency = None;
        let mut interval = 1;
        let mut count = None;
        let mut until = None;
        let mut weekdays = Vec::new();

        for part in rule.split(';').filter(|part| !part.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| EngineError::InvalidRule(format!("malformed part: {}", part)))?;
            let key = key.to_ascii_uppercase();
            if seen.contains(&key) {
                return Err(EngineError::InvalidRule(format!("duplicate {}", key)));
            }

            match key.as_str() {
                "FREQ" => frequency = Some(value.parse::<Frequency>()?),
                "INTERVAL" => interval = parse_number(&key, value)?,
                "COUNT" => count = Some(parse_number(&key, value)?),
                "UNTIL" => until = Some(parse_until(value, utc)?),
                "BYDAY" => {
                    weekdays = value
                        .split(',')
                        .map(parse_weekday)
                        .collect::<Result<Vec<_>>>()?;
                }
                _ => {
                    return Err(EngineError::InvalidRule(format!(
                        "unsupported RRULE part: {}",
                        key
                    )));
                }
            }
            seen.push(key);
        }

        let frequency =
            frequency.ok_or_else(|| EngineError::InvalidRule("missing FREQ".into()))?;
        let bound = match (count, until) {
            (Some(count), None) => Bound::Count(count),
            (None, Some(until)) => Bound::Until(until),
            (Some(_), Some(_)) => {
                return Err(EngineError::InvalidRule(
                    "COUNT and UNTIL are mutually exclusive".into(),
                ));
            }
            (None, None) => return Err(EngineError::UnboundedRule),
        };

        let pattern = RecurrencePattern::new(frequency, start, bound)
            .with_timezone(timezone)
            .with_interval(interval)
            .with_weekdays(&weekdays);
        pattern.validate()?;
        Ok(pattern)
    }
}

fn parse_dtstart(rest: &str) -> Result<(NaiveDateTime, Tz)> {
    if let Some(value) = rest.strip_prefix(':') {
        let value = value.strip_suffix('Z').ok_or_else(|| {
            EngineError::InvalidRule("DTSTART must be UTC (Z) or carry a TZID".into())
        })?;
        return Ok((parse_ical(value)?, Tz::UTC));
    }

    let params = rest
        .strip_prefix(";TZID=")
        .ok_or_else(|| EngineError::InvalidRule(format!("malformed DTSTART{}", rest)))?;
    let (name, value) = params
        .split_once(':')
        .ok_or_else(|| EngineError::InvalidRule(format!("malformed DTSTART{}", rest)))?;
    let timezone: Tz = name
        .parse()
        .map_err(|_| EngineError::InvalidTimezone(name.to_string()))?;
    Ok((parse_ical(value)?, timezone))
}

fn parse_until(value: &str, utc: bool) -> Result<NaiveDateTime> {
    match value.strip_suffix('Z') {
        Some(_) if !utc => Err(EngineError::InvalidRule(
            "UNTIL must be local time when DTSTART has a TZID".into(),
        )),
        Some(local) => parse_ical(local),
        None => parse_ical(value),
    }
}

fn parse_ical(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, ICAL_FORMAT)
        .map_err(|e| EngineError::InvalidRule(format!("bad date-time {}: {}", value, e)))
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| EngineError::InvalidRule(format!("bad {} value: {}", key, value)))
}

fn parse_weekday(code: &str) -> Result<Weekday> {
    match code.to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        other => Err(EngineError::InvalidRule(format!("bad BYDAY value: {}", other))),
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// A recurrence pattern plus the fixed length of every occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleRepr", into = "RuleRepr")]
pub struct RecurrenceRule {
    pattern: RecurrencePattern,
    duration_seconds: u32,
    limits: ExpansionLimits,
}

impl RecurrenceRule {
    /// # Errors
    /// Returns `EngineError::InvalidRule` for a zero duration or an invalid pattern.
    pub fn new(pattern: RecurrencePattern, duration_seconds: u32) -> Result<Self> {
        if duration_seconds == 0 {
            return Err(EngineError::InvalidRule("duration must be positive".into()));
        }
        pattern.validate()?;
        Ok(Self {
            pattern,
            duration_seconds,
            limits: ExpansionLimits::default(),
        })
    }

    pub fn with_limits(mut self, limits: ExpansionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn pattern(&self) -> &RecurrencePattern {
        &self.pattern
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(i64::from(self.duration_seconds))
    }

    pub fn limits(&self) -> &ExpansionLimits {
        &self.limits
    }

    /// Materialize every occurrence as `[start, start + duration)`.
    pub fn get_intervals(&self) -> Result<Intervals> {
        let length = self.duration();
        let intervals: Intervals = self
            .pattern
            .occurrences(&self.limits)?
            .into_iter()
            .map(|start| Interval::starting_at(start, length))
            .collect();

        tracing::debug!(
            frequency = self.pattern.frequency.as_str(),
            occurrences = intervals.len(),
            duration_seconds = self.duration_seconds,
            "expanded recurrence rule"
        );
        Ok(intervals)
    }
}

#[derive(Serialize, Deserialize)]
struct RuleRepr {
    rrule: String,
    duration: u32,
}

impl TryFrom<RuleRepr> for RecurrenceRule {
    type Error = EngineError;

    fn try_from(repr: RuleRepr) -> Result<Self> {
        RecurrenceRule::new(repr.rrule.parse()?, repr.duration)
    }
}

impl From<RecurrenceRule> for RuleRepr {
    fn from(rule: RecurrenceRule) -> Self {
        RuleRepr {
            rrule: rule.pattern.to_string(),
            duration: rule.duration_seconds,
        }
    }
}

/// Whether a rule's occurrences add to or remove from availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Inclusion,
    Exclusion,
}

/// A recurrence rule labeled as inclusion or exclusion.
///
/// The JSON produced by [`TaggedRule::encode`] is the opaque string a
/// business's rules are persisted as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedRule {
    pub rule: RecurrenceRule,
    pub kind: RuleKind,
}

impl TaggedRule {
    pub fn inclusion(rule: RecurrenceRule) -> Self {
        Self {
            rule,
            kind: RuleKind::Inclusion,
        }
    }

    pub fn exclusion(rule: RecurrenceRule) -> Self {
        Self {
            rule,
            kind: RuleKind::Exclusion,
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    /// Returns `EngineError::Decode` for malformed JSON or a malformed rule.
    pub fn decode(encoded: &str) -> Result<Self> {
        Ok(serde_json::from_str(encoded)?)
    }
}
