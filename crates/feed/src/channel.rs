// ABOUTME: Channel (show) model with defaulting and validation.
// ABOUTME: Reconciles link/domain, cascades defaults into items and checks feed-level invariants.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::FeedError;
use crate::html_utils::plain_text;
use crate::item::ChannelContext;
use crate::item_list::{ItemList, SortOrder};
use crate::itunes_ext::{Explicit, ShowType};
use crate::models::{AttrHref, Category, ContentBlock, Image, Owner};
use crate::observe::Observer;
use crate::probe::MediaProber;
use crate::time_parse::Timestamp;
use crate::{base_domain, is_valid_url, resolve_url};

/// Inputs to [`Channel::fix`] that come from the pipeline rather than the configuration.
pub struct FixEnv<'a> {
    pub content_dir: &'a Path,
    pub prober: &'a MediaProber,
    pub probe_durations: bool,
    pub now: DateTime<Utc>,
    pub sort_order: SortOrder,
    pub observer: &'a dyn Observer,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channel {
    pub title: String,
    pub subtitle: String,
    pub link: String,
    /// Public base URL the media files are served from.
    pub domain: String,
    pub language: String,
    pub description: ContentBlock,
    pub content: ContentBlock,
    pub summary: String,
    pub author: String,
    pub keywords: String,
    pub image: Image,
    pub owner: Owner,
    pub category: Category,
    pub show_type: Option<ShowType>,
    pub explicit: Option<Explicit>,
    pub copyright: String,
    pub self_link: AttrHref,
    pub last_build_date: Timestamp,
    /// Spotify `countryOfOrigin`, space separated ISO 3166 codes.
    pub country_of_origin: String,
    pub items: ItemList,
}

impl Channel {
    /// Fills derived fields, then fixes and sorts every item with this channel as context.
    pub fn fix(&mut self, env: &FixEnv<'_>) {
        env.observer.debug("fixing channel");

        self.domain = normalize_domain(&self.domain);
        if self.domain.is_empty() {
            if let Some(domain) = base_domain(&self.link) {
                self.domain = domain;
            }
        }
        if self.link.is_empty() {
            self.link = self.domain.clone();
        } else if let Some(link) = resolve_url(&self.domain, &self.link) {
            self.link = link;
        }

        self.language = self.language.trim().replace('_', "-").to_lowercase();

        if self.author.is_empty() {
            self.author = self.owner.name.clone();
        }
        if self.summary.is_empty() {
            self.summary = plain_text(self.description.as_str());
        }
        if self.content.is_empty() {
            self.content = self.description.clone();
        }

        if !self.image.url.is_empty() {
            if let Some(url) = resolve_url(&self.domain, &self.image.url) {
                self.image.url = url;
            }
        }
        if self.image.title.is_empty() {
            self.image.title = self.title.clone();
        }
        if self.image.link.is_empty() {
            self.image.link = self.link.clone();
        }

        if self.last_build_date.is_zero() {
            self.last_build_date = Timestamp::new(env.now);
        }
        if self.copyright.is_empty() && !self.owner.name.is_empty() {
            if let Some(year) = self.last_build_date.year() {
                self.copyright = format!("© {} {}", year, self.owner.name);
            }
        }

        if self.show_type.is_none() {
            self.show_type = Some(ShowType::default());
        }
        if self.explicit.is_none() {
            self.explicit = Some(Explicit::False);
        }

        let ctx = ChannelContext {
            domain: &self.domain,
            author: &self.author,
            image: &self.image.url,
            explicit: self.explicit,
            content_dir: env.content_dir,
            prober: env.prober,
            probe_durations: env.probe_durations,
            observer: env.observer,
        };
        self.items.fix(&ctx);
        self.items.sort(env.sort_order);
    }

    /// Checks the channel in a fixed order, then every item. Stops at the first violation.
    pub fn validate(&self, observer: &dyn Observer) -> Result<(), FeedError> {
        if self.domain.is_empty() {
            return Err(FeedError::validation("domain is required (set domain or link)"));
        }
        if !is_valid_url(&self.domain) {
            return Err(FeedError::validation(format!(
                "domain `{}` is not a valid URL",
                self.domain
            )));
        }
        if self.title.is_empty() {
            return Err(FeedError::validation("title is required"));
        }
        if self.author.is_empty() {
            return Err(FeedError::validation("author is required"));
        }
        if !is_valid_language(&self.language) {
            return Err(FeedError::validation(format!(
                "language `{}` must be an ISO 639 code like `en` or `en-us`",
                self.language
            )));
        }
        if self.link.is_empty() {
            return Err(FeedError::validation("link is required"));
        }
        if self.summary.is_empty() {
            return Err(FeedError::validation("summary is required"));
        }
        if self.description.is_empty() {
            return Err(FeedError::validation("description is required"));
        }
        if self.image.is_empty() {
            return Err(FeedError::validation("image is required"));
        }
        if !is_valid_url(&self.link) {
            return Err(FeedError::validation(format!(
                "link `{}` is not a valid URL",
                self.link
            )));
        }
        if self.show_type.is_none() {
            return Err(FeedError::validation("type must be one of episodic, serial"));
        }
        if self.explicit.is_none() {
            return Err(FeedError::validation(
                "explicit must be one of no, yes, false, true",
            ));
        }
        if self.category.is_empty() {
            return Err(FeedError::validation("category is required"));
        }
        if self.owner.is_empty() {
            return Err(FeedError::validation("owner name and email are required"));
        }
        if !self.owner.email.contains('@') {
            return Err(FeedError::validation(format!(
                "owner email `{}` is not an email address",
                self.owner.email
            )));
        }
        if self.self_link.is_empty() {
            observer.warn(
                "self_link is not set; feed readers will not know the canonical feed URL",
            );
        }
        if self.items.is_empty() {
            return Err(FeedError::validation("at least one item is required"));
        }

        self.items.validate()
    }
}

/// Drops trailing slashes and assumes https when no scheme is given.
fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.is_empty() || domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

/// Two-letter code, optionally followed by a dash and a variant, five characters at most.
fn is_valid_language(lang: &str) -> bool {
    if lang.len() < 2 || lang.len() > 5 || !lang.is_ascii() {
        return false;
    }
    let (code, rest) = lang.split_at(2);
    if !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    match rest.strip_prefix('-') {
        _ if rest.is_empty() => true,
        Some(variant) => !variant.is_empty() && variant.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}
