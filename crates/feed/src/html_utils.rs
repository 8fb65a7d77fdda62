// ABOUTME: HTML helpers for description, summary and content blocks.
// ABOUTME: Derives plain-text summaries and prepares text for CDATA sections.

use quick_xml::escape::unescape_with;

/// Named HTML entities common in show notes that XML does not predefine.
fn html_entity(name: &str) -> Option<&'static str> {
    match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some(" "),
        "ndash" => Some("–"),
        "mdash" => Some("—"),
        "hellip" => Some("…"),
        "copy" => Some("©"),
        "reg" => Some("®"),
        "trade" => Some("™"),
        "rsquo" | "lsquo" => Some("'"),
        "ldquo" | "rdquo" => Some("\""),
        _ => None,
    }
}

/// Tags that break a line when rendered, so their text must not run together.
fn is_block_tag(tag: &str) -> bool {
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(
        name.as_str(),
        "p" | "br"
            | "div"
            | "li"
            | "ul"
            | "ol"
            | "dd"
            | "dt"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "hr"
            | "pre"
            | "blockquote"
            | "table"
            | "tr"
            | "td"
            | "th"
    )
}

/// Converts an HTML fragment into a single line of plain text.
/// Tags are dropped, entities decoded and runs of whitespace collapsed.
/// Block-level tags separate words; inline tags vanish without a trace.
pub fn plain_text(html: &str) -> String {
    let mut stripped = String::with_capacity(html.len());
    let mut tag: Option<String> = None;

    for c in html.chars() {
        if let Some(name) = tag.as_mut() {
            if c == '>' {
                if is_block_tag(name) {
                    stripped.push(' ');
                }
                tag = None;
            } else {
                name.push(c);
            }
        } else if c == '<' {
            tag = Some(String::new());
        } else {
            stripped.push(c);
        }
    }

    // Unknown entities leave the text as written.
    let decoded = match unescape_with(&stripped, html_entity) {
        Ok(text) => text.into_owned(),
        Err(_) => stripped,
    };

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wraps plain text in a paragraph so it can serve as a content:encoded block.
pub fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", text)
}

/// Splits any "]]>" so the text survives inside a single CDATA section.
pub fn cdata_safe(text: &str) -> String {
    text.replace("]]>", "]]]]><![CDATA[>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_strips_tags() {
        assert_eq!(plain_text("<p>Hello</p><p>World</p>"), "Hello World");
        assert_eq!(
            plain_text("<b>Bold</b> and <i>italic</i>"),
            "Bold and italic"
        );
    }

    #[test]
    fn test_plain_text_inline_tags_add_no_space() {
        assert_eq!(plain_text("<b>Bold</b>, more"), "Bold, more");
        assert_eq!(plain_text("un<em>believ</em>able"), "unbelievable");
        assert_eq!(plain_text("one<br/>two<BR>three"), "one two three");
        assert_eq!(plain_text("<ul><li>a</li><li>b</li></ul>"), "a b");
    }

    #[test]
    fn test_plain_text_decodes_entities() {
        assert_eq!(plain_text("<p>Tom &amp; Jerry&nbsp;&mdash; live</p>"), "Tom & Jerry — live");
        assert_eq!(plain_text("caf&#233;"), "café");
    }

    #[test]
    fn test_plain_text_keeps_unknown_entities() {
        assert_eq!(plain_text("a &bogus; b"), "a &bogus; b");
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(paragraph("Show notes"), "<p>Show notes</p>");
    }

    #[test]
    fn test_cdata_safe() {
        assert_eq!(cdata_safe("a]]>b"), "a]]]]><![CDATA[>b");
        assert_eq!(cdata_safe("plain"), "plain");
    }
}
