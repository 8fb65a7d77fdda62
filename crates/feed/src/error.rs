// ABOUTME: Error types for feed assembly operations.
// ABOUTME: Provides FeedError covering missing input, scalar parsing, validation and rendering.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, fixing, validating or rendering a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A configuration path or referenced media file does not exist.
    #[error("not found: {}", .path.display())]
    InputMissing { path: PathBuf },

    /// Reading or writing an existing path failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document is not well-formed YAML for the expected schema.
    #[error("failed to decode configuration: {0}")]
    Decode(String),

    /// A scalar value could not be interpreted under its grammar.
    #[error("invalid {field}{}: {message}", key_suffix(.key))]
    Parse {
        field: &'static str,
        key: Option<String>,
        message: String,
    },

    /// A model invariant is violated.
    #[error("invalid feed{}: {message}", key_suffix(.key))]
    Validation { key: Option<String>, message: String },

    /// The XML writer failed.
    #[error("failed to render feed: {0}")]
    Render(String),

    /// The assembler was driven out of order.
    #[error("feed is {actual}, expected {expected}")]
    Stage {
        expected: &'static str,
        actual: &'static str,
    },
}

fn key_suffix(key: &Option<String>) -> String {
    match key {
        Some(key) => format!(" [{}]", key),
        None => String::new(),
    }
}

impl FeedError {
    /// Creates a channel-scoped validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        FeedError::Validation {
            key: None,
            message: msg.into(),
        }
    }

    /// Creates a validation error scoped to the episode with the given key.
    pub fn item(key: &str, msg: impl Into<String>) -> Self {
        FeedError::Validation {
            key: Some(key.to_string()),
            message: msg.into(),
        }
    }

    /// Creates a Parse error for a named field.
    pub fn parse(field: &'static str, err: impl fmt::Display) -> Self {
        FeedError::Parse {
            field,
            key: None,
            message: err.to_string(),
        }
    }

    /// Attaches an episode key to a Parse error that does not carry one yet.
    pub fn with_key(self, item_key: &str) -> Self {
        match self {
            FeedError::Parse {
                field,
                key: None,
                message,
            } => FeedError::Parse {
                field,
                key: Some(item_key.to_string()),
                message,
            },
            other => other,
        }
    }

    /// Creates a Render error from an underlying writer error.
    pub fn render(err: impl fmt::Display) -> Self {
        FeedError::Render(err.to_string())
    }

    /// Returns the episode key the error is scoped to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            FeedError::Parse { key, .. } | FeedError::Validation { key, .. } => key.as_deref(),
            _ => None,
        }
    }
}
