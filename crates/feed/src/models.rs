// ABOUTME: Scalar value types shared by channels and items.
// ABOUTME: Content blocks, links, categories, owners, GUIDs, images and enclosures.

use crate::error::FeedError;
use crate::is_valid_url;

/// A value that knows how to read itself from a loosely-typed configuration string.
pub trait FromText: Sized {
    /// Field name used in parse errors.
    const FIELD: &'static str;

    fn from_text(raw: &str) -> Result<Self, FeedError>;
}

impl FromText for String {
    const FIELD: &'static str = "text";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        Ok(raw.to_string())
    }
}

impl FromText for u32 {
    const FIELD: &'static str = "number";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        raw.trim()
            .parse()
            .map_err(|_| FeedError::parse(Self::FIELD, format!("`{}` is not a whole number", raw)))
    }
}

/// Text emitted verbatim inside a CDATA section instead of being XML-escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentBlock {
    pub text: String,
}

impl ContentBlock {
    pub fn new(text: impl Into<String>) -> Self {
        ContentBlock { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromText for ContentBlock {
    const FIELD: &'static str = "content";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        Ok(ContentBlock::new(raw))
    }
}

/// An href with optional rel/type attributes, rendered as `<atom:link/>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrHref {
    pub href: String,
    pub rel: Option<String>,
    pub mime_type: Option<String>,
}

impl AttrHref {
    /// A self-referencing feed link.
    pub fn self_link(href: impl Into<String>) -> Self {
        AttrHref {
            href: href.into(),
            rel: Some("self".to_string()),
            mime_type: Some("application/rss+xml".to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.href.is_empty()
    }
}

impl FromText for AttrHref {
    const FIELD: &'static str = "self_link";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        Ok(AttrHref::self_link(raw.trim()))
    }
}

/// Splits "first, second" after trimming separator characters from both ends.
fn split_pair(raw: &str) -> (String, Option<String>) {
    let trimmed = raw.trim_matches(|c: char| c == ' ' || c == ',' || c == ';' || c == '/');
    let mut parts = trimmed.split(',');
    let first = parts.next().unwrap_or_default().trim().to_string();
    let second = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    (first, second)
}

/// iTunes category with at most one nested subcategory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Category {
    pub text: String,
    pub sub: Option<String>,
}

impl Category {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl FromText for Category {
    const FIELD: &'static str = "category";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        let (text, sub) = split_pair(raw);
        Ok(Category { text, sub })
    }
}

/// Podcast owner contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owner {
    pub name: String,
    pub email: String,
}

impl Owner {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() || self.email.is_empty()
    }
}

impl FromText for Owner {
    const FIELD: &'static str = "owner";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        let (name, email) = split_pair(raw);
        Ok(Owner {
            name,
            email: email.unwrap_or_default(),
        })
    }
}

/// Episode identifier. `is_permalink` is true iff the text is an absolute URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guid {
    text: String,
    is_permalink: bool,
}

impl Guid {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let is_permalink = is_valid_url(&text);
        Guid { text, is_permalink }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_permalink(&self) -> bool {
        self.is_permalink
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl FromText for Guid {
    const FIELD: &'static str = "guid";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        Ok(Guid::new(raw.trim()))
    }
}

/// Channel artwork: URL plus the title/link pair RSS requires alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    pub title: String,
    pub link: String,
}

impl Image {
    pub fn is_empty(&self) -> bool {
        self.url.is_empty() || self.title.is_empty() || self.link.is_empty()
    }
}

impl FromText for Image {
    const FIELD: &'static str = "image";

    fn from_text(raw: &str) -> Result<Self, FeedError> {
        Ok(Image {
            url: raw.trim().to_string(),
            ..Image::default()
        })
    }
}

/// Represents a media enclosure (audio, video, or document attachment).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enclosure {
    pub url: String,
    pub length: u64,
    pub mime_type: String,
}

impl Enclosure {
    /// True unless URL, length and type are all present.
    pub fn is_empty(&self) -> bool {
        self.url.is_empty() || self.length == 0 || self.mime_type.is_empty()
    }
}
