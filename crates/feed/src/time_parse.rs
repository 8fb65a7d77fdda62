// ABOUTME: Feed timestamp value with flexible parsing and RFC 2822 rendering.
// ABOUTME: Accepts the date spellings people write in YAML configuration files.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::FeedError;
use crate::models::FromText;

/// Date-time used for pubDate and lastBuildDate. The default value is the zero timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(Option<DateTime<Utc>>);

impl Timestamp {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Timestamp(Some(dt))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    pub fn year(&self) -> Option<i32> {
        self.0.map(|dt| dt.year())
    }

    /// Renders in the feed date format, e.g. "Wed, 22 Jul 2020 13:01:20 +0000".
    /// The zero timestamp renders as an empty string.
    pub fn to_feed_string(&self) -> String {
        self.0
            .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S %z").to_string())
            .unwrap_or_default()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::new(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_feed_string())
    }
}

impl FromText for Timestamp {
    const FIELD: &'static str = "timestamp";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        parse_flexible_time(raw)
            .map(Timestamp::new)
            .ok_or_else(|| FeedError::parse(Self::FIELD, format!("`{}` is not a date", raw)))
    }
}

/// Parses a datetime string using the formats accepted in configuration files.
/// Returns UTC datetime if successful, None if no format matches.
///
/// Covers RFC 3339, RFC 2822, RFC 1123 with GMT/UTC, YAML-style
/// "YYYY-MM-DD HH:MM:SS" with or without offset, and bare dates.
pub fn parse_flexible_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats_with_tz = [
        // YAML timestamp with offset: "2020-07-22 13:01:20 +03:00"
        "%Y-%m-%d %H:%M:%S %:z",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S%:z",
        "%Y-%m-%dT%H:%M:%S%z",
        // Single digit day: "Wed, 2 Jul 2020 13:01:20 +0300"
        "%a, %e %b %Y %H:%M:%S %z",
    ];

    for fmt in &formats_with_tz {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // Zone abbreviations other than GMT/UTC are ambiguous; only these two are honoured.
    let base = s
        .strip_suffix("GMT")
        .or_else(|| s.strip_suffix("UTC"))
        .or_else(|| s.strip_suffix('Z'))
        .map(str::trim_end)
        .unwrap_or(s);

    let formats_naive = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%a, %d %b %Y %H:%M:%S",
        "%a, %e %b %Y %H:%M:%S",
        "%d %b %Y %H:%M:%S",
    ];

    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(base, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(naive_date) = NaiveDate::parse_from_str(base, "%Y-%m-%d") {
        let naive_dt = naive_date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&naive_dt));
    }

    None
}
