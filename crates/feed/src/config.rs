// ABOUTME: YAML configuration decoding for podcast.yml.
// ABOUTME: Reads loosely-typed raw structs and maps each scalar onto the model through FromText.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::Value;

use crate::channel::Channel;
use crate::duration_parse::Duration;
use crate::error::FeedError;
use crate::item::Item;
use crate::item_list::ItemList;
use crate::itunes_ext::{EpisodeType, Explicit, ShowType};
use crate::models::{AttrHref, Category, ContentBlock, FromText, Guid, Image, Owner};
use crate::time_parse::Timestamp;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawChannel {
    title: Option<Value>,
    subtitle: Option<Value>,
    link: Option<Value>,
    domain: Option<Value>,
    language: Option<Value>,
    description: Option<Value>,
    #[serde(alias = "encoded")]
    content: Option<Value>,
    summary: Option<Value>,
    author: Option<Value>,
    keywords: Option<Value>,
    image: Option<RawImage>,
    owner: Option<RawOwner>,
    category: Option<Value>,
    #[serde(rename = "type")]
    show_type: Option<Value>,
    explicit: Option<Value>,
    copyright: Option<Value>,
    #[serde(alias = "atom_link")]
    self_link: Option<Value>,
    #[serde(alias = "lastbuilddate")]
    last_build_date: Option<Value>,
    country_of_origin: Option<Value>,
    #[serde(alias = "episodes")]
    items: BTreeMap<String, RawItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawItem {
    title: Option<Value>,
    subtitle: Option<Value>,
    description: Option<Value>,
    #[serde(alias = "encoded")]
    content: Option<Value>,
    summary: Option<Value>,
    link: Option<Value>,
    guid: Option<Value>,
    #[serde(alias = "pubdate")]
    pub_date: Option<Value>,
    keywords: Option<Value>,
    season: Option<Value>,
    episode: Option<Value>,
    #[serde(alias = "episodetype")]
    episode_type: Option<Value>,
    explicit: Option<Value>,
    author: Option<Value>,
    image: Option<Value>,
    duration: Option<Value>,
    file: Option<Value>,
    url: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawImage {
    Url(String),
    Full {
        url: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        link: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOwner {
    Text(String),
    Full { name: String, email: String },
}

/// Decodes a podcast.yml document into an unfixed channel.
pub fn decode_channel(yaml: &str) -> Result<Channel, FeedError> {
    let raw: RawChannel =
        serde_yaml::from_str(yaml).map_err(|e| FeedError::Decode(e.to_string()))?;
    map_channel(raw)
}

/// Converts a YAML scalar to the text its grammar is applied to. Null means unset.
fn scalar_text(name: &'static str, value: Option<&Value>) -> Result<Option<String>, FeedError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(FeedError::parse(
            name,
            format!("expected a single value, found {:?}", other),
        )),
    }
}

/// Parses an optional field with its `FromText` grammar, reporting errors under `name`.
fn field<T: FromText>(name: &'static str, value: Option<&Value>) -> Result<Option<T>, FeedError> {
    let Some(text) = scalar_text(name, value)? else {
        return Ok(None);
    };
    T::from_text(&text).map(Some).map_err(|err| match err {
        FeedError::Parse { message, key, .. } => FeedError::Parse {
            field: name,
            key,
            message,
        },
        other => other,
    })
}

fn text(name: &'static str, value: Option<&Value>) -> Result<String, FeedError> {
    Ok(field::<String>(name, value)?.unwrap_or_default())
}

fn map_channel(raw: RawChannel) -> Result<Channel, FeedError> {
    let image = match raw.image {
        None => Image::default(),
        Some(RawImage::Url(url)) => Image::from_text(&url)?,
        Some(RawImage::Full { url, title, link }) => Image { url, title, link },
    };

    let owner = match raw.owner {
        None => Owner::default(),
        Some(RawOwner::Text(text)) => Owner::from_text(&text)?,
        Some(RawOwner::Full { name, email }) => Owner {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        },
    };

    let items = raw
        .items
        .into_iter()
        .map(|(key, item)| map_item(&key, item).map_err(|err| err.with_key(&key)))
        .collect::<Result<ItemList, FeedError>>()?;

    Ok(Channel {
        title: text("title", raw.title.as_ref())?,
        subtitle: text("subtitle", raw.subtitle.as_ref())?,
        link: text("link", raw.link.as_ref())?,
        domain: text("domain", raw.domain.as_ref())?,
        language: text("language", raw.language.as_ref())?,
        description: field::<ContentBlock>("description", raw.description.as_ref())?
            .unwrap_or_default(),
        content: field::<ContentBlock>("content", raw.content.as_ref())?.unwrap_or_default(),
        summary: text("summary", raw.summary.as_ref())?,
        author: text("author", raw.author.as_ref())?,
        keywords: text("keywords", raw.keywords.as_ref())?,
        image,
        owner,
        category: field::<Category>("category", raw.category.as_ref())?.unwrap_or_default(),
        show_type: field::<ShowType>("type", raw.show_type.as_ref())?,
        explicit: field::<Explicit>("explicit", raw.explicit.as_ref())?,
        copyright: text("copyright", raw.copyright.as_ref())?,
        self_link: field::<AttrHref>("self_link", raw.self_link.as_ref())?.unwrap_or_default(),
        last_build_date: field::<Timestamp>("last_build_date", raw.last_build_date.as_ref())?
            .unwrap_or_default(),
        country_of_origin: text("country_of_origin", raw.country_of_origin.as_ref())?,
        items,
    })
}

fn map_item(key: &str, raw: RawItem) -> Result<Item, FeedError> {
    let mut item = Item::new(key);
    item.title = text("title", raw.title.as_ref())?;
    item.subtitle = text("subtitle", raw.subtitle.as_ref())?;
    item.description =
        field::<ContentBlock>("description", raw.description.as_ref())?.unwrap_or_default();
    item.content = field::<ContentBlock>("content", raw.content.as_ref())?.unwrap_or_default();
    item.summary = text("summary", raw.summary.as_ref())?;
    item.link = text("link", raw.link.as_ref())?;
    item.guid = field::<Guid>("guid", raw.guid.as_ref())?.unwrap_or_default();
    item.pub_date = field::<Timestamp>("pub_date", raw.pub_date.as_ref())?.unwrap_or_default();
    item.keywords = text("keywords", raw.keywords.as_ref())?;
    item.season = field::<u32>("season", raw.season.as_ref())?.unwrap_or(0);
    item.episode = field::<u32>("episode", raw.episode.as_ref())?.unwrap_or(0);
    item.episode_type = field::<EpisodeType>("episode_type", raw.episode_type.as_ref())?;
    item.explicit = field::<Explicit>("explicit", raw.explicit.as_ref())?;
    item.author = text("author", raw.author.as_ref())?;
    item.image = text("image", raw.image.as_ref())?.trim().to_string();
    item.duration = field::<Duration>("duration", raw.duration.as_ref())?.unwrap_or_default();
    item.file = text("file", raw.file.as_ref())?;
    item.url = text("url", raw.url.as_ref())?.trim().to_string();
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
title: Rust Radio
domain: https://radio.example.org
language: en
description: <p>Weekly Rust news</p>
image: cover.jpg
owner: Jane Doe, jane@example.com
category: Technology, Software How-To
type: serial
explicit: false
items:
  S01E02:
    title: Second
    description: The second one
    file: ep2.mp3
    pubdate: 2020-07-29 10:00:00
    duration: "52:11"
  S01E01:
    title: First
    description: The first one
    file: ep1.mp3
    pub_date: 2020-07-22
    duration: 3131
    season: 1
    episode: 1
    explicit: yes
"#;

    #[test]
    fn test_decode_channel_scalars() {
        let channel = decode_channel(SAMPLE).unwrap();
        assert_eq!(channel.title, "Rust Radio");
        assert_eq!(channel.description.as_str(), "<p>Weekly Rust news</p>");
        assert_eq!(channel.image.url, "cover.jpg");
        assert_eq!(channel.owner.name, "Jane Doe");
        assert_eq!(channel.owner.email, "jane@example.com");
        assert_eq!(channel.category.text, "Technology");
        assert_eq!(channel.category.sub.as_deref(), Some("Software How-To"));
        assert_eq!(channel.show_type, Some(ShowType::Serial));
        assert_eq!(channel.explicit, Some(Explicit::False));
    }

    #[test]
    fn test_decode_items() {
        let channel = decode_channel(SAMPLE).unwrap();
        assert_eq!(channel.items.len(), 2);

        let first = channel.items.get("S01E01").unwrap();
        assert_eq!(first.duration.as_secs(), 3131);
        assert_eq!((first.season, first.episode), (1, 1));
        assert_eq!(first.explicit, Some(Explicit::Yes));
        assert!(!first.pub_date.is_zero());

        let second = channel.items.get("S01E02").unwrap();
        assert_eq!(second.duration.as_secs(), 3131);
        assert_eq!((second.season, second.episode), (0, 0));
        assert!(second.explicit.is_none());
    }

    #[test]
    fn test_decode_structured_owner_and_image() {
        let yaml = r#"
owner:
  name: Jane Doe
  email: jane@example.com
image:
  url: https://cdn.example.org/cover.jpg
  title: Cover
"#;
        let channel = decode_channel(yaml).unwrap();
        assert_eq!(channel.owner.email, "jane@example.com");
        assert_eq!(channel.image.url, "https://cdn.example.org/cover.jpg");
        assert_eq!(channel.image.title, "Cover");
        assert!(channel.image.link.is_empty());
    }

    #[test]
    fn test_bad_duration_names_item() {
        let yaml = r#"
items:
  S01E01:
    duration: about an hour
"#;
        let err = decode_channel(yaml).unwrap_err();
        assert_eq!(err.key(), Some("S01E01"));
        assert!(err.to_string().starts_with("invalid duration [S01E01]"));
    }

    #[test]
    fn test_bad_explicit_value() {
        let err = decode_channel("explicit: maybe\n").unwrap_err();
        assert!(err.to_string().starts_with("invalid explicit"));
    }

    #[test]
    fn test_unknown_key_is_decode_error() {
        let err = decode_channel("titel: Typo\n").unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));
    }
}
