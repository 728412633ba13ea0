//! Calendar-day keys in a display time zone
//!
//! Every timestamp is reduced to the wall-clock date it falls on in a single,
//! caller-chosen zone. Two instants share a key exactly when they share that
//! local date.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CalendarError, Result};

/// A calendar day rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Strict `YYYY-MM-DD` parsing (4-digit year, zero-padded month and day).
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !well_formed {
            return Err(CalendarError::InvalidDate(s.to_string()));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| CalendarError::InvalidDate(s.to_string()))
    }

    /// `YYYY-MM` of this day, used for monthly archives and axis labels.
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.0.year(), self.0.month())
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for DayKey {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DayKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// The zone whose wall-clock dates define day keys.
///
/// Either a fixed UTC offset (`+08:00`, `UTC`) or an IANA zone name
/// (`Asia/Shanghai`, `America/New_York`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Fixed(FixedOffset),
    Named(Tz),
}

impl DisplayZone {
    pub fn utc() -> Self {
        DisplayZone::Fixed(Utc.fix())
    }

    /// Local calendar date of `instant` in this zone.
    pub fn local_date<Z: TimeZone>(&self, instant: &DateTime<Z>) -> NaiveDate {
        match self {
            DisplayZone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
            DisplayZone::Named(tz) => instant.with_timezone(tz).date_naive(),
        }
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayZone::Fixed(offset) if offset.local_minus_utc() == 0 => f.write_str("UTC"),
            DisplayZone::Fixed(offset) => write!(f, "{}", offset),
            DisplayZone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl FromStr for DisplayZone {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(Self::utc());
        }
        if let Some(offset) = parse_offset(trimmed) {
            return Ok(DisplayZone::Fixed(offset));
        }
        trimmed
            .parse::<Tz>()
            .map(DisplayZone::Named)
            .map_err(|_| CalendarError::InvalidZone(s.to_string()))
    }
}

impl Serialize for DisplayZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DisplayZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Accepts `+HH:MM`, `+HHMM` and `+HH` (and the `-` forms).
fn parse_offset(s: &str) -> Option<FixedOffset> {
    if !s.is_ascii() {
        return None;
    }
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };

    let (hours, minutes) = if let Some((h, m)) = rest.split_once(':') {
        (h, m)
    } else if rest.len() == 4 {
        rest.split_at(2)
    } else if rest.len() == 2 {
        (rest, "00")
    } else {
        return None;
    };

    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// A parsed event time: either an exact instant, or a wall-clock time with
/// no offset that is read in the display zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Instant(DateTime<FixedOffset>),
    WallClock(NaiveDateTime),
}

const OFFSET_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

const WALL_CLOCK_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Rewrite a `Z` suffix as `+00:00` and an hour-only offset (`+08`) as
/// `+08:00` so the offset formats can read them.
fn with_full_offset(timestamp: &str) -> Cow<'_, str> {
    if let Some(rest) = timestamp.strip_suffix(['Z', 'z']) {
        return Cow::Owned(format!("{rest}+00:00"));
    }

    let bytes = timestamp.as_bytes();
    let len = bytes.len();
    // Shortest candidate is `YYYY-MM-DDTHH+HH`
    if len > 13
        && matches!(bytes[len - 3], b'+' | b'-')
        && bytes[len - 4].is_ascii_digit()
        && bytes[len - 2].is_ascii_digit()
        && bytes[len - 1].is_ascii_digit()
    {
        return Cow::Owned(format!("{timestamp}:00"));
    }

    Cow::Borrowed(timestamp)
}

/// Parse an ISO-8601 timestamp.
///
/// Offset-aware forms give an instant: `2026-02-01T10:00:00+08:00`, `...Z`,
/// minute precision, basic (`+0800`) and hour-only (`+08`) offsets, and
/// space separated database exports. Offset-less date-times give a wall
/// clock reading. Anything else is `InvalidTimestamp`.
pub fn parse_timestamp(raw: &str) -> Result<EventTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CalendarError::InvalidTimestamp(raw.to_string()));
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(EventTime::Instant(instant));
    }
    let offset_form = with_full_offset(trimmed);
    for format in OFFSET_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(&offset_form, format) {
            return Ok(EventTime::Instant(instant));
        }
    }
    for format in WALL_CLOCK_FORMATS {
        if let Ok(wall) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(EventTime::WallClock(wall));
        }
    }

    Err(CalendarError::InvalidTimestamp(raw.to_string()))
}

/// Day key of an already-parsed event time.
pub fn day_key_of(time: &EventTime, zone: &DisplayZone) -> DayKey {
    match time {
        EventTime::Instant(instant) => DayKey(zone.local_date(instant)),
        EventTime::WallClock(wall) => DayKey(wall.date()),
    }
}

/// Normalize a raw timestamp into the day key it falls on in `zone`.
pub fn normalize(timestamp: &str, zone: &DisplayZone) -> Result<DayKey> {
    parse_timestamp(timestamp).map(|time| day_key_of(&time, zone))
}
