// ABOUTME: Episode model with key-derived numbering, defaulting and validation.
// ABOUTME: Fix fills derived fields from the media file and channel; validate checks required ones.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::duration_parse::Duration;
use crate::error::FeedError;
use crate::html_utils::{paragraph, plain_text};
use crate::itunes_ext::{EpisodeType, Explicit};
use crate::models::{ContentBlock, Enclosure, Guid};
use crate::observe::Observer;
use crate::probe::MediaProber;
use crate::time_parse::Timestamp;
use crate::{is_valid_url, path_to_url, resolve_url};

static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[Ss](\d+)[Ee](\d+)").unwrap());

/// Everything an item borrows from its channel and the pipeline while being fixed.
pub struct ChannelContext<'a> {
    pub domain: &'a str,
    pub author: &'a str,
    pub image: &'a str,
    pub explicit: Option<Explicit>,
    /// Directory that relative media paths are resolved against.
    pub content_dir: &'a Path,
    pub prober: &'a MediaProber,
    pub probe_durations: bool,
    pub observer: &'a dyn Observer,
}

/// One episode. Fields left empty by configuration are filled by [`Item::fix`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    /// Configuration key, conventionally "S01E02".
    pub key: String,
    pub title: String,
    pub subtitle: String,
    pub description: ContentBlock,
    pub content: ContentBlock,
    pub summary: String,
    pub link: String,
    pub guid: Guid,
    pub pub_date: Timestamp,
    pub keywords: String,
    pub season: u32,
    pub episode: u32,
    pub episode_type: Option<EpisodeType>,
    pub explicit: Option<Explicit>,
    pub author: String,
    pub image: String,
    pub duration: Duration,
    /// Media file path relative to the content directory.
    pub file: String,
    /// Public URL of the media file.
    pub url: String,
    pub size: u64,
    pub mime_type: String,
    pub enclosure: Enclosure,
    source_path: Option<PathBuf>,
}

impl Item {
    pub fn new(key: impl Into<String>) -> Self {
        Item {
            key: key.into(),
            ..Item::default()
        }
    }

    /// Sort key. Assumes fewer than 1000 episodes per season.
    pub fn weight(&self) -> u64 {
        u64::from(self.season) * 1000 + u64::from(self.episode)
    }

    /// Local path of the media file, once fixed.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Fills season and episode from a key like "S03E07" where they are still unset.
    pub fn extract_key_info(&mut self) {
        let Some(caps) = KEY_RE.captures(&self.key) else {
            return;
        };
        if self.season == 0 {
            self.season = caps[1].parse().unwrap_or(0);
        }
        if self.episode == 0 {
            self.episode = caps[2].parse().unwrap_or(0);
        }
    }

    /// Media path as served under the domain. Absolute files outside the content
    /// directory are published by file name.
    fn public_path(&self, content_dir: &Path) -> String {
        let file = Path::new(&self.file);
        if !file.is_absolute() {
            return self.file.clone();
        }
        match file.strip_prefix(content_dir) {
            Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
            Err(_) => file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Derives every missing field. Running it twice changes nothing the second time.
    pub fn fix(&mut self, ctx: &ChannelContext<'_>) {
        ctx.observer.debug(&format!("fixing item {}", self.key));

        self.extract_key_info();

        self.file = normalize_file_path(&self.file);
        if !self.file.is_empty() {
            let file = Path::new(&self.file);
            self.source_path = Some(if file.is_absolute() {
                file.to_path_buf()
            } else {
                ctx.content_dir.join(file)
            });
        }

        if self.author.is_empty() {
            self.author = ctx.author.to_string();
        }

        if let Some(path) = self.source_path.as_deref() {
            let want_duration = ctx.probe_durations && self.duration.is_empty();
            let info = ctx.prober.probe(path, want_duration, ctx.observer);
            if let Some(size) = info.size {
                self.size = size;
            }
            if let Some(mime) = info.mime_type {
                self.mime_type = mime;
            }
            if let Some(duration) = info.duration {
                self.duration = duration;
            }
        }

        if self.url.is_empty() {
            self.url = path_to_url(ctx.domain, &self.public_path(ctx.content_dir))
                .unwrap_or_default();
        } else if !is_valid_url(&self.url) {
            if let Some(url) = path_to_url(ctx.domain, &self.url) {
                self.url = url;
            }
        }

        if self.explicit.is_none() {
            self.explicit = Some(ctx.explicit.unwrap_or(Explicit::False));
        }
        if self.episode_type.is_none() {
            self.episode_type = Some(EpisodeType::default());
        }

        if self.image.is_empty() {
            self.image = ctx.image.to_string();
        } else if let Some(image) = resolve_url(ctx.domain, &self.image) {
            self.image = image;
        }

        self.enclosure = Enclosure {
            url: self.url.clone(),
            length: self.size,
            mime_type: self.mime_type.clone(),
        };

        if self.guid.is_empty() {
            let source = if self.enclosure.url.is_empty() {
                &self.file
            } else {
                &self.enclosure.url
            };
            self.guid = Guid::new(source.as_str());
        }

        if self.link.is_empty() {
            self.link = self.enclosure.url.clone();
        }

        if self.content.is_empty() && !self.description.is_empty() {
            self.content = ContentBlock::new(paragraph(self.description.as_str()));
        }

        if self.summary.is_empty() {
            self.summary = plain_text(self.description.as_str());
        }
    }

    /// Checks the item in a fixed order and reports the first violation.
    pub fn validate(&self) -> Result<(), FeedError> {
        let fail = |msg: &str| Err(FeedError::item(&self.key, msg));

        if self.file.is_empty() {
            return fail("file is required");
        }
        let exists = self
            .source_path
            .as_deref()
            .unwrap_or_else(|| Path::new(&self.file))
            .is_file();
        if !exists {
            return Err(FeedError::item(
                &self.key,
                format!("file `{}` does not exist", self.file),
            ));
        }
        if self.size == 0 {
            return fail("file size is unknown");
        }
        if self.mime_type.is_empty() {
            return fail("file MIME type is unknown");
        }
        if self.pub_date.is_zero() {
            return fail("pub_date is required");
        }
        if self.description.is_empty() {
            return fail("description is required");
        }
        if self.link.is_empty() {
            return fail("link is required");
        }
        if self.guid.is_empty() {
            return fail("guid is required");
        }
        if (self.season > 0) != (self.episode > 0) {
            return Err(FeedError::item(
                &self.key,
                format!(
                    "season and episode must be set together (season {}, episode {})",
                    self.season, self.episode
                ),
            ));
        }
        if self.explicit.is_none() {
            return fail("explicit must be one of no, yes, false, true");
        }
        if self.episode_type.is_none() {
            return fail("episode_type must be one of full, trailer, bonus");
        }
        if self.enclosure.is_empty() {
            return fail("enclosure needs url, length and type");
        }
        if !is_valid_url(&self.enclosure.url) {
            return Err(FeedError::item(
                &self.key,
                format!("enclosure url `{}` is not a valid URL", self.enclosure.url),
            ));
        }
        if self.duration.is_empty() {
            return fail("duration is required");
        }
        if !self.image.is_empty() && !is_valid_url(&self.image) {
            return Err(FeedError::item(
                &self.key,
                format!("image `{}` is not a valid URL", self.image),
            ));
        }

        Ok(())
    }
}

/// Cleans a configured media path into a forward-slash path. Absolute paths stay absolute.
fn normalize_file_path(file: &str) -> String {
    file.trim()
        .replace('\\', "/")
        .trim_start_matches("./")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::NullObserver;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write_mp3(dir: &Path, name: &str, len: usize) {
        let mut bytes = b"ID3".to_vec();
        bytes.resize(len, 0);
        fs::write(dir.join(name), bytes).unwrap();
    }

    fn context<'a>(dir: &'a Path, prober: &'a MediaProber) -> ChannelContext<'a> {
        ChannelContext {
            domain: "https://example.org",
            author: "Jane Doe",
            image: "https://example.org/cover.jpg",
            explicit: None,
            content_dir: dir,
            prober,
            probe_durations: false,
            observer: &NullObserver,
        }
    }

    fn complete_item(key: &str) -> Item {
        let mut item = Item::new(key);
        item.title = "Ep1".to_string();
        item.description = ContentBlock::new("First episode");
        item.file = "./ep1.mp3".to_string();
        item.duration = Duration::from_secs(600);
        item.pub_date = Timestamp::new(Utc.with_ymd_and_hms(2020, 7, 22, 13, 0, 0).unwrap());
        item
    }

    #[test]
    fn test_key_derives_season_and_episode() {
        let mut item = Item::new("S03E07");
        item.extract_key_info();
        assert_eq!((item.season, item.episode), (3, 7));
        assert_eq!(item.weight(), 3007);
    }

    #[test]
    fn test_explicit_numbers_override_key() {
        let mut item = Item::new("S03E07");
        item.season = 4;
        item.episode = 1;
        item.extract_key_info();
        assert_eq!((item.season, item.episode), (4, 1));
    }

    #[test]
    fn test_unconventional_key_leaves_numbers_unset() {
        let mut item = Item::new("bonus-interview");
        item.extract_key_info();
        assert_eq!((item.season, item.episode), (0, 0));
    }

    #[test]
    fn test_fix_derives_fields() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 1000);
        let prober = MediaProber::without_tools();
        let ctx = context(dir.path(), &prober);

        let mut item = complete_item("S01E01");
        item.fix(&ctx);

        assert_eq!(item.file, "ep1.mp3");
        assert_eq!(item.size, 1000);
        assert_eq!(item.mime_type, "audio/mpeg");
        assert_eq!(item.url, "https://example.org/ep1.mp3");
        assert_eq!(
            item.enclosure,
            Enclosure {
                url: "https://example.org/ep1.mp3".to_string(),
                length: 1000,
                mime_type: "audio/mpeg".to_string(),
            }
        );
        assert_eq!(item.guid.text(), "https://example.org/ep1.mp3");
        assert!(item.guid.is_permalink());
        assert_eq!(item.link, "https://example.org/ep1.mp3");
        assert_eq!(item.author, "Jane Doe");
        assert_eq!(item.image, "https://example.org/cover.jpg");
        assert_eq!(item.explicit, Some(Explicit::False));
        assert_eq!(item.episode_type, Some(EpisodeType::Full));
        assert_eq!(item.content.as_str(), "<p>First episode</p>");
        assert_eq!(item.summary, "First episode");
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_fix_is_a_fixed_point() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 1000);
        let prober = MediaProber::without_tools();
        let ctx = context(dir.path(), &prober);

        let mut item = complete_item("S01E01");
        item.image = "art/ep1.jpg".to_string();
        item.fix(&ctx);
        let once = item.clone();
        item.fix(&ctx);
        assert_eq!(item, once);
        assert_eq!(item.image, "https://example.org/art/ep1.jpg");
    }

    #[test]
    fn test_fix_keeps_configured_values() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 1000);
        let prober = MediaProber::without_tools();
        let mut ctx = context(dir.path(), &prober);
        ctx.explicit = Some(Explicit::Yes);

        let mut item = complete_item("S01E01");
        item.url = "media/ep1.mp3".to_string();
        item.guid = Guid::new("episode-one");
        item.content = ContentBlock::new("<h1>Notes</h1>");
        item.fix(&ctx);

        assert_eq!(item.url, "https://example.org/media/ep1.mp3");
        assert_eq!(item.guid.text(), "episode-one");
        assert!(!item.guid.is_permalink());
        assert_eq!(item.content.as_str(), "<h1>Notes</h1>");
        assert_eq!(item.explicit, Some(Explicit::Yes));
    }

    #[test]
    fn test_validate_season_without_episode() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 1000);
        let prober = MediaProber::without_tools();
        let ctx = context(dir.path(), &prober);

        let mut item = complete_item("special");
        item.season = 2;
        item.fix(&ctx);
        let err = item.validate().unwrap_err();
        assert_eq!(err.key(), Some("special"));
        assert!(err.to_string().contains("season and episode must be set together"));
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = TempDir::new().unwrap();
        let prober = MediaProber::without_tools();
        let ctx = context(dir.path(), &prober);

        let mut item = complete_item("S01E01");
        item.fix(&ctx);
        let err = item.validate().unwrap_err();
        assert!(err.to_string().contains("file `ep1.mp3` does not exist"));
    }

    #[test]
    fn test_validate_requires_duration() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 1000);
        let prober = MediaProber::without_tools();
        let ctx = context(dir.path(), &prober);

        let mut item = complete_item("S01E01");
        item.duration = Duration::default();
        item.fix(&ctx);
        let err = item.validate().unwrap_err();
        assert!(err.to_string().ends_with("duration is required"));
    }

    fn fixed_in(dir: &Path, item: &mut Item) {
        let prober = MediaProber::without_tools();
        item.fix(&context(dir, &prober));
    }

    fn validation_message(item: &Item) -> String {
        item.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_absolute_file_outside_content_dir() {
        let content = TempDir::new().unwrap();
        let media = TempDir::new().unwrap();
        write_mp3(media.path(), "ep1.mp3", 1000);
        let absolute = media.path().join("ep1.mp3");

        let mut item = complete_item("S01E01");
        item.file = absolute.to_string_lossy().into_owned();
        fixed_in(content.path(), &mut item);

        assert_eq!(item.source_path(), Some(absolute.as_path()));
        assert_eq!(item.size, 1000);
        assert_eq!(item.url, "https://example.org/ep1.mp3");
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_absolute_file_inside_content_dir_keeps_subpath() {
        let content = TempDir::new().unwrap();
        fs::create_dir(content.path().join("media")).unwrap();
        write_mp3(&content.path().join("media"), "ep1.mp3", 1000);

        let mut item = complete_item("S01E01");
        item.file = content
            .path()
            .join("media/ep1.mp3")
            .to_string_lossy()
            .into_owned();
        fixed_in(content.path(), &mut item);

        assert_eq!(item.url, "https://example.org/media/ep1.mp3");
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_validate_directory_is_not_a_media_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("ep1.mp3")).unwrap();

        let mut item = complete_item("S01E01");
        fixed_in(dir.path(), &mut item);
        assert!(validation_message(&item).contains("file `ep1.mp3` does not exist"));
    }

    #[test]
    fn test_validate_empty_file_has_unknown_size() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 0);

        let mut item = complete_item("S01E01");
        fixed_in(dir.path(), &mut item);
        assert!(validation_message(&item).ends_with("file size is unknown"));
    }

    #[test]
    fn test_validate_unrecognized_media_type() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ep1.bin"), vec![0u8; 1000]).unwrap();

        let mut item = complete_item("S01E01");
        item.file = "ep1.bin".to_string();
        fixed_in(dir.path(), &mut item);
        assert_eq!(item.size, 1000);
        assert!(validation_message(&item).ends_with("file MIME type is unknown"));
    }

    #[test]
    fn test_validate_requires_pub_date() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 1000);

        let mut item = complete_item("S01E01");
        item.pub_date = Timestamp::default();
        fixed_in(dir.path(), &mut item);
        assert!(validation_message(&item).ends_with("pub_date is required"));
    }

    #[test]
    fn test_validate_requires_description() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 1000);

        let mut item = complete_item("S01E01");
        item.description = ContentBlock::default();
        fixed_in(dir.path(), &mut item);
        assert!(validation_message(&item).ends_with("description is required"));
    }

    #[test]
    fn test_validate_first_broken_rule_wins() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 1000);

        let mut item = complete_item("S01E01");
        item.pub_date = Timestamp::default();
        item.description = ContentBlock::default();
        item.duration = Duration::default();
        fixed_in(dir.path(), &mut item);
        assert_eq!(
            validation_message(&item),
            "invalid feed [S01E01]: pub_date is required"
        );
    }

    #[test]
    fn test_validate_enclosure_url_without_domain() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 1000);
        let prober = MediaProber::without_tools();
        let mut ctx = context(dir.path(), &prober);
        ctx.domain = "";

        let mut item = complete_item("S01E01");
        item.url = "media/ep1.mp3".to_string();
        item.fix(&ctx);
        assert!(validation_message(&item)
            .ends_with("enclosure url `media/ep1.mp3` is not a valid URL"));
    }

    #[test]
    fn test_validate_image_must_be_url() {
        let dir = TempDir::new().unwrap();
        write_mp3(dir.path(), "ep1.mp3", 1000);
        let prober = MediaProber::without_tools();
        let mut ctx = context(dir.path(), &prober);
        ctx.image = "cover.jpg";

        let mut item = complete_item("S01E01");
        item.fix(&ctx);
        assert!(validation_message(&item).ends_with("image `cover.jpg` is not a valid URL"));
    }

    #[test]
    fn test_normalize_file_path() {
        assert_eq!(normalize_file_path(" ./media\\ep1.mp3 "), "media/ep1.mp3");
        assert_eq!(normalize_file_path("././ep1.mp3"), "ep1.mp3");
        assert_eq!(normalize_file_path("/srv/media/ep1.mp3"), "/srv/media/ep1.mp3");
    }
}
