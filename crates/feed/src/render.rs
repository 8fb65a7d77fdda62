// ABOUTME: RSS 2.0 rendering of a validated channel with quick-xml.
// ABOUTME: Emits the namespace envelope, omits empty elements and writes rich text as CDATA.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

use crate::channel::Channel;
use crate::error::FeedError;
use crate::html_utils::cdata_safe;
use crate::item::Item;
use crate::itunes_ext::{ATOM_NS, CONTENT_NS, ITUNES_NS, RSS_VERSION, SPOTIFY_NS};
use crate::models::ContentBlock;

/// First line of every rendered feed.
pub const XML_PROLOGUE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const INDENT: usize = 4;

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', INDENT),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), FeedError> {
        self.writer.write_event(event).map_err(FeedError::render)
    }

    fn open(&mut self, tag: BytesStart<'_>) -> Result<(), FeedError> {
        self.event(Event::Start(tag))
    }

    fn close(&mut self, name: &str) -> Result<(), FeedError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, tag: BytesStart<'_>) -> Result<(), FeedError> {
        self.event(Event::Empty(tag))
    }

    /// `<name>value</name>`, escaped. Skipped when value is empty.
    fn text(&mut self, name: &str, value: &str) -> Result<(), FeedError> {
        self.text_with(BytesStart::new(name), value)
    }

    fn text_with(&mut self, tag: BytesStart<'_>, value: &str) -> Result<(), FeedError> {
        if value.is_empty() {
            return Ok(());
        }
        let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
        self.open(tag)?;
        self.event(Event::Text(BytesText::new(value)))?;
        self.close(&name)
    }

    /// `<name><![CDATA[value]]></name>`, kept on one line. Skipped when empty.
    fn cdata(&mut self, name: &str, value: &ContentBlock) -> Result<(), FeedError> {
        if value.is_empty() {
            return Ok(());
        }
        let raw = format!("<![CDATA[{}]]>", cdata_safe(value.as_str()));
        self.open(BytesStart::new(name))?;
        self.event(Event::Text(BytesText::from_escaped(raw)))?;
        self.close(name)
    }

    fn finish(self) -> Result<String, FeedError> {
        String::from_utf8(self.writer.into_inner()).map_err(FeedError::render)
    }
}

fn uses_spotify(channel: &Channel) -> bool {
    !channel.country_of_origin.is_empty()
}

/// Renders the channel and its items as a complete feed document.
pub fn render_feed(channel: &Channel) -> Result<String, FeedError> {
    let mut out = XmlOut::new();

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", RSS_VERSION));
    rss.push_attribute(("xmlns:itunes", ITUNES_NS));
    rss.push_attribute(("xmlns:content", CONTENT_NS));
    rss.push_attribute(("xmlns:atom", ATOM_NS));
    if uses_spotify(channel) {
        rss.push_attribute(("xmlns:spotify", SPOTIFY_NS));
    }
    out.open(rss)?;
    out.open(BytesStart::new("channel"))?;

    write_channel(&mut out, channel)?;
    for item in &channel.items {
        write_item(&mut out, item)?;
    }

    out.close("channel")?;
    out.close("rss")?;

    let body = out.finish()?;
    Ok(format!("{}\n{}\n", XML_PROLOGUE, body))
}

fn write_channel(out: &mut XmlOut, channel: &Channel) -> Result<(), FeedError> {
    if !channel.self_link.is_empty() {
        let mut link = BytesStart::new("atom:link");
        link.push_attribute(("href", channel.self_link.href.as_str()));
        if let Some(rel) = &channel.self_link.rel {
            link.push_attribute(("rel", rel.as_str()));
        }
        if let Some(mime) = &channel.self_link.mime_type {
            link.push_attribute(("type", mime.as_str()));
        }
        out.empty(link)?;
    }

    out.text("title", &channel.title)?;
    out.text("link", &channel.link)?;
    out.text("language", &channel.language)?;
    out.text("copyright", &channel.copyright)?;
    out.text("lastBuildDate", &channel.last_build_date.to_feed_string())?;
    out.cdata("description", &channel.description)?;
    out.cdata("content:encoded", &channel.content)?;
    out.text("itunes:subtitle", &channel.subtitle)?;
    out.text("itunes:author", &channel.author)?;
    out.text("itunes:summary", &channel.summary)?;
    out.text("itunes:keywords", &channel.keywords)?;
    if let Some(show_type) = channel.show_type {
        out.text("itunes:type", show_type.as_str())?;
    }
    if let Some(explicit) = channel.explicit {
        out.text("itunes:explicit", explicit.as_str())?;
    }

    if !channel.owner.is_empty() {
        out.open(BytesStart::new("itunes:owner"))?;
        out.text("itunes:name", &channel.owner.name)?;
        out.text("itunes:email", &channel.owner.email)?;
        out.close("itunes:owner")?;
    }

    if !channel.image.url.is_empty() {
        out.open(BytesStart::new("image"))?;
        out.text("url", &channel.image.url)?;
        out.text("title", &channel.image.title)?;
        out.text("link", &channel.image.link)?;
        out.close("image")?;

        let mut href = BytesStart::new("itunes:image");
        href.push_attribute(("href", channel.image.url.as_str()));
        out.empty(href)?;
    }

    if !channel.category.is_empty() {
        let mut category = BytesStart::new("itunes:category");
        category.push_attribute(("text", channel.category.text.as_str()));
        match &channel.category.sub {
            Some(sub) => {
                out.open(category)?;
                let mut nested = BytesStart::new("itunes:category");
                nested.push_attribute(("text", sub.as_str()));
                out.empty(nested)?;
                out.close("itunes:category")?;
            }
            None => out.empty(category)?,
        }
    }

    out.text("spotify:countryOfOrigin", &channel.country_of_origin)
}

fn write_item(out: &mut XmlOut, item: &Item) -> Result<(), FeedError> {
    out.open(BytesStart::new("item"))?;

    out.text("title", &item.title)?;
    out.text("itunes:title", &item.title)?;
    out.text("itunes:subtitle", &item.subtitle)?;
    out.cdata("description", &item.description)?;
    out.cdata("content:encoded", &item.content)?;
    out.text("itunes:summary", &item.summary)?;
    out.text("link", &item.link)?;

    if !item.guid.is_empty() {
        let mut guid = BytesStart::new("guid");
        let permalink = if item.guid.is_permalink() { "true" } else { "false" };
        guid.push_attribute(("isPermaLink", permalink));
        out.text_with(guid, item.guid.text())?;
    }

    out.text("pubDate", &item.pub_date.to_feed_string())?;

    if !item.enclosure.is_empty() {
        let length = item.enclosure.length.to_string();
        let mut enclosure = BytesStart::new("enclosure");
        enclosure.push_attribute(("url", item.enclosure.url.as_str()));
        enclosure.push_attribute(("length", length.as_str()));
        enclosure.push_attribute(("type", item.enclosure.mime_type.as_str()));
        out.empty(enclosure)?;
    }

    if !item.duration.is_empty() {
        out.text("itunes:duration", &item.duration.to_string())?;
    }
    if item.season > 0 {
        out.text("itunes:season", &item.season.to_string())?;
    }
    if item.episode > 0 {
        out.text("itunes:episode", &item.episode.to_string())?;
    }
    if let Some(episode_type) = item.episode_type {
        out.text("itunes:episodeType", episode_type.as_str())?;
    }
    if let Some(explicit) = item.explicit {
        out.text("itunes:explicit", explicit.as_str())?;
    }
    out.text("itunes:author", &item.author)?;
    if !item.image.is_empty() {
        let mut image = BytesStart::new("itunes:image");
        image.push_attribute(("href", item.image.as_str()));
        out.empty(image)?;
    }
    out.text("itunes:keywords", &item.keywords)?;

    out.close("item")
}
