// ABOUTME: Feed assembler driving load, fix, validate and render in order.
// ABOUTME: Options and PodcastBuilder configure file names, sort order, clock, prober and observer.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::channel::{Channel, FixEnv};
use crate::config::decode_channel;
use crate::error::FeedError;
use crate::item_list::SortOrder;
use crate::observe::{Observer, TracingObserver};
use crate::probe::MediaProber;
use crate::render::render_feed;

pub const DEFAULT_CONFIG_FILE: &str = "podcast.yml";
pub const DEFAULT_FEED_FILE: &str = "feed.xml";

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Configuration file name inside the content directory.
    pub config_file_name: String,
    /// Output file name used by [`Podcast::save`] when no explicit path is given.
    pub feed_file_name: String,
    pub sort_order: SortOrder,
    /// Clock used for lastBuildDate. None means the current time.
    pub now: Option<DateTime<Utc>>,
    /// Run the external duration tools for items without a configured duration.
    pub probe_durations: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config_file_name: DEFAULT_CONFIG_FILE.to_string(),
            feed_file_name: DEFAULT_FEED_FILE.to_string(),
            sort_order: SortOrder::default(),
            now: None,
            probe_durations: true,
        }
    }
}

/// Where the assembler is in its one-way pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Fixed,
    Validated,
    Rendered,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Loaded => "loaded",
            Stage::Fixed => "fixed",
            Stage::Validated => "validated",
            Stage::Rendered => "rendered",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The feed document: one channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub channel: Channel,
}

/// Builder for constructing Podcast instances with custom configuration.
pub struct PodcastBuilder {
    opts: Options,
    prober: MediaProber,
    observer: Arc<dyn Observer>,
}

impl PodcastBuilder {
    /// Create a new PodcastBuilder with default options, the default tool chain and tracing output.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
            prober: MediaProber::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn options(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    pub fn config_file_name(mut self, name: impl Into<String>) -> Self {
        self.opts.config_file_name = name.into();
        self
    }

    pub fn feed_file_name(mut self, name: impl Into<String>) -> Self {
        self.opts.feed_file_name = name.into();
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.opts.sort_order = order;
        self
    }

    /// Pin the clock used for lastBuildDate.
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.opts.now = Some(now);
        self
    }

    pub fn probe_durations(mut self, enabled: bool) -> Self {
        self.opts.probe_durations = enabled;
        self
    }

    /// Replace the media prober, e.g. with a custom duration tool chain.
    pub fn prober(mut self, prober: MediaProber) -> Self {
        self.prober = prober;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Load `<content_dir>/<config_file_name>`.
    pub fn load(self, content_dir: impl AsRef<Path>) -> Result<Podcast, FeedError> {
        let content_dir = content_dir.as_ref();
        if !content_dir.is_dir() {
            return Err(FeedError::InputMissing {
                path: content_dir.to_path_buf(),
            });
        }

        let config_path = content_dir.join(&self.opts.config_file_name);
        if !config_path.is_file() {
            return Err(FeedError::InputMissing { path: config_path });
        }

        self.observer
            .info(&format!("loading {}", config_path.display()));
        let yaml = fs::read_to_string(&config_path)?;
        let channel = decode_channel(&yaml)?;
        self.observer
            .debug(&format!("decoded {} items", channel.items.len()));

        Ok(self.from_channel(content_dir, channel))
    }

    /// Wrap an already-populated channel. Media paths resolve against `content_dir`.
    pub fn from_channel(self, content_dir: impl Into<PathBuf>, channel: Channel) -> Podcast {
        Podcast {
            opts: self.opts,
            prober: self.prober,
            observer: self.observer,
            content_dir: content_dir.into(),
            feed: Feed { channel },
            stage: Stage::Loaded,
        }
    }
}

impl Default for PodcastBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One podcast run: owns the feed model and moves it through fix, validate and render.
pub struct Podcast {
    opts: Options,
    prober: MediaProber,
    observer: Arc<dyn Observer>,
    content_dir: PathBuf,
    feed: Feed,
    stage: Stage,
}

impl Podcast {
    /// Load a podcast from a content directory with default settings.
    pub fn load(content_dir: impl AsRef<Path>) -> Result<Self, FeedError> {
        PodcastBuilder::new().load(content_dir)
    }

    pub fn builder() -> PodcastBuilder {
        PodcastBuilder::new()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn channel(&self) -> &Channel {
        &self.feed.channel
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Cascade defaults into the channel and its items. Safe to repeat.
    pub fn fix(&mut self) {
        self.observer.info("fixing feed");
        let env = FixEnv {
            content_dir: &self.content_dir,
            prober: &self.prober,
            probe_durations: self.opts.probe_durations,
            now: self.opts.now.unwrap_or_else(Utc::now),
            sort_order: self.opts.sort_order,
            observer: self.observer.as_ref(),
        };
        self.feed.channel.fix(&env);
        self.stage = Stage::Fixed;
    }

    /// Check every invariant. Stops at the first violation. Safe to repeat.
    pub fn validate(&mut self) -> Result<(), FeedError> {
        self.observer.info("validating feed");
        if self.stage == Stage::Loaded {
            self.observer
                .warn("validating a feed that has not been fixed; derived fields will be missing");
        }
        self.feed.channel.validate(self.observer.as_ref())?;
        self.stage = Stage::Validated;
        Ok(())
    }

    /// Render the validated feed document.
    pub fn render(&mut self) -> Result<String, FeedError> {
        if self.stage != Stage::Validated {
            return Err(FeedError::Stage {
                expected: Stage::Validated.as_str(),
                actual: self.stage.as_str(),
            });
        }
        self.observer.info("rendering feed");
        let xml = render_feed(&self.feed.channel)?;
        self.stage = Stage::Rendered;
        Ok(xml)
    }

    /// Fix, validate and render in one go.
    pub fn build(&mut self) -> Result<String, FeedError> {
        self.fix();
        self.validate()?;
        self.render()
    }

    /// Build the feed and write it to `output`, or to the content directory under
    /// `feed_file_name`. Nothing is written when any stage fails.
    pub fn save(&mut self, output: Option<&Path>) -> Result<PathBuf, FeedError> {
        let xml = self.build()?;
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => self.content_dir.join(&self.opts.feed_file_name),
        };
        fs::write(&path, xml)?;
        self.observer.info(&format!("wrote {}", path.display()));
        Ok(path)
    }
}

impl fmt::Debug for Podcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Podcast")
            .field("content_dir", &self.content_dir)
            .field("stage", &self.stage)
            .field("opts", &self.opts)
            .field("prober", &self.prober)
            .finish()
    }
}
