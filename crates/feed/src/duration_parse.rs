// ABOUTME: Episode duration value and its textual grammar.
// ABOUTME: Accepts integer seconds or [HH:]MM:SS clock strings, truncated to whole seconds.

use std::fmt;

use crate::error::FeedError;
use crate::models::FromText;

/// Playback length of an episode in whole seconds. Zero means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(u64);

impl Duration {
    pub fn from_secs(secs: u64) -> Self {
        Duration(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromText for Duration {
    const FIELD: &'static str = "duration";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        parse_duration_seconds(raw)
            .map(Duration)
            .ok_or_else(|| FeedError::parse(Self::FIELD, format!("`{}` is not a duration", raw)))
    }
}

/// Parses a duration string into seconds.
/// Supports:
/// - Plain integers (seconds)
/// - HH:MM:SS format
/// - MM:SS format, read as 00:MM:SS
///
/// Clock strings are rewritten into hour/minute/second units ("00:52:11" becomes
/// "00h52m11s") and handed to the duration grammar, so fractional seconds are
/// accepted and truncated.
pub fn parse_duration_seconds(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(secs) = s.parse::<u64>() {
        return Some(secs);
    }

    let clock = match s.matches(':').count() {
        1 => format!("00:{}", s),
        2 => s.to_string(),
        _ => return None,
    };

    // Reject anything the unit grammar would read differently, like signs or spaces.
    if !clock.chars().all(|c| c.is_ascii_digit() || c == ':' || c == '.') {
        return None;
    }

    let units = format!("{}s", clock.replacen(':', "h", 1).replacen(':', "m", 1));
    parse_duration::parse(&units).ok().map(|d| d.as_secs())
}
