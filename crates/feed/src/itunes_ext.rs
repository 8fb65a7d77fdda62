// ABOUTME: iTunes, content, Atom and Spotify namespace constants and enumerated tag values.
// ABOUTME: Explicit flag, show type and episode type with their textual forms.

use std::fmt;

use crate::error::FeedError;
use crate::models::FromText;

pub const RSS_VERSION: &str = "2.0";
pub const ITUNES_NS: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
pub const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const SPOTIFY_NS: &str = "http://www.spotify.com/ns/rss";

/// Value of `<itunes:explicit>`. Both spellings Apple has accepted over time are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Explicit {
    Yes,
    No,
    True,
    False,
}

impl Explicit {
    pub const ALL: [Explicit; 4] = [Explicit::No, Explicit::Yes, Explicit::False, Explicit::True];

    pub fn as_str(&self) -> &'static str {
        match self {
            Explicit::Yes => "yes",
            Explicit::No => "no",
            Explicit::True => "true",
            Explicit::False => "false",
        }
    }

    /// Returns true for the flag values that mark content as explicit.
    pub fn is_explicit(&self) -> bool {
        matches!(self, Explicit::Yes | Explicit::True)
    }
}

/// Value of `<itunes:type>` on the channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShowType {
    #[default]
    Episodic,
    Serial,
}

impl ShowType {
    pub const ALL: [ShowType; 2] = [ShowType::Episodic, ShowType::Serial];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShowType::Episodic => "episodic",
            ShowType::Serial => "serial",
        }
    }
}

/// Value of `<itunes:episodeType>` on an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EpisodeType {
    #[default]
    Full,
    Trailer,
    Bonus,
}

impl EpisodeType {
    pub const ALL: [EpisodeType; 3] = [EpisodeType::Full, EpisodeType::Trailer, EpisodeType::Bonus];

    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeType::Full => "full",
            EpisodeType::Trailer => "trailer",
            EpisodeType::Bonus => "bonus",
        }
    }
}

/// Case-insensitive lookup of `raw` among the textual forms of `all`.
fn lookup<T: Copy>(
    field: &'static str,
    raw: &str,
    all: &[T],
    name: fn(&T) -> &'static str,
) -> Result<T, FeedError> {
    let wanted = raw.trim().to_lowercase();
    all.iter().copied().find(|v| name(v) == wanted).ok_or_else(|| {
        let allowed: Vec<&str> = all.iter().map(name).collect();
        FeedError::parse(
            field,
            format!("`{}` is not one of {}", raw, allowed.join(", ")),
        )
    })
}

impl FromText for Explicit {
    const FIELD: &'static str = "explicit";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        lookup(Self::FIELD, raw, &Explicit::ALL, Explicit::as_str)
    }
}

impl FromText for ShowType {
    const FIELD: &'static str = "type";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        lookup(Self::FIELD, raw, &ShowType::ALL, ShowType::as_str)
    }
}

impl FromText for EpisodeType {
    const FIELD: &'static str = "episode_type";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        lookup(Self::FIELD, raw, &EpisodeType::ALL, EpisodeType::as_str)
    }
}

impl fmt::Display for Explicit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ShowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EpisodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_values() {
        assert_eq!(Explicit::from_text("yes").unwrap(), Explicit::Yes);
        assert_eq!(Explicit::from_text("TRUE").unwrap(), Explicit::True);
        assert_eq!(Explicit::from_text("false").unwrap(), Explicit::False);
        assert!(Explicit::True.is_explicit());
        assert!(!Explicit::No.is_explicit());
    }

    #[test]
    fn test_explicit_rejects_unknown() {
        let err = Explicit::from_text("clean").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid explicit: `clean` is not one of no, yes, false, true"
        );
    }

    #[test]
    fn test_show_and_episode_types() {
        assert_eq!(ShowType::from_text("Serial").unwrap(), ShowType::Serial);
        assert_eq!(EpisodeType::from_text("bonus").unwrap(), EpisodeType::Bonus);
        assert!(EpisodeType::from_text("special").is_err());
        assert_eq!(EpisodeType::default().as_str(), "full");
    }
}
