// ABOUTME: Podcast feed assembly library for castgen.
// ABOUTME: Turns a YAML podcast description plus media files into an RSS 2.0 / iTunes feed.

pub mod channel;
pub mod config;
pub mod duration_parse;
pub mod error;
pub mod html_utils;
pub mod item;
pub mod item_list;
pub mod itunes_ext;
pub mod models;
pub mod observe;
pub mod podcast;
pub mod probe;
pub mod render;
pub mod time_parse;

pub use channel::Channel;
pub use config::decode_channel;
pub use duration_parse::{parse_duration_seconds, Duration};
pub use error::FeedError;
pub use item::{ChannelContext, Item};
pub use item_list::{ItemList, SortOrder};
pub use itunes_ext::{EpisodeType, Explicit, ShowType};
pub use models::{AttrHref, Category, ContentBlock, Enclosure, FromText, Guid, Image, Owner};
pub use observe::{NullObserver, Observer, TracingObserver};
pub use podcast::{Feed, Options, Podcast, PodcastBuilder, Stage};
pub use probe::{CommandTool, MediaInfo, MediaProber, OutputStream, ProbeError, ProbeTool};
pub use render::render_feed;
pub use time_parse::{parse_flexible_time, Timestamp};

// ----------------------------------------------------------------------------
// URL utilities
// ----------------------------------------------------------------------------

use url::Url;

/// True if the string parses as an absolute URL with both scheme and host.
pub fn is_valid_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(parsed) => {
            !parsed.scheme().is_empty() && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Extracts the base domain (scheme + host + optional port) from a URL.
pub fn base_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    match parsed.port() {
        Some(port) => Some(format!("{}://{}:{}", parsed.scheme(), host, port)),
        None => Some(format!("{}://{}", parsed.scheme(), host)),
    }
}

/// Joins a local path onto a base URL. Returns None unless the result is a valid URL.
pub fn path_to_url(base: &str, path: &str) -> Option<String> {
    let trim = |c: char| c == '.' || c == '/';
    let joined = format!("{}/{}", base.trim_matches(trim), path.trim_matches(trim));
    is_valid_url(&joined).then_some(joined)
}

/// Returns `reference` unchanged when it is already absolute, otherwise joins it onto `base`.
pub fn resolve_url(base: &str, reference: &str) -> Option<String> {
    if is_valid_url(reference) {
        return Some(reference.to_string());
    }
    path_to_url(base, reference)
}
