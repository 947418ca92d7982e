//! src/error.rs
//! ============================================================================
//! # `AppError`: unified error type for the behavior layer
//!
//! Nothing in this layer is fatal to the page. Handlers return
//! `AppResult<T>`, the page dispatcher logs what comes back and carries on.
//! A handler whose target is gone ([`AppError::MissingTarget`],
//! [`AppError::StaleNode`]) is expected and stays silent. Clipboard failures
//! never get here: the copy continuation reports them itself.

use std::io;

use compact_str::CompactString;
use thiserror::Error;

use crate::view::tree::NodeId;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON fixture or effect serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A page or form URL could not be built.
    #[error("Invalid URL '{input}': {source}")]
    Url {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// A handler could not find the control it enhances.
    #[error("Missing target: {0}")]
    MissingTarget(CompactString),

    /// Node handle no longer refers to a live node.
    #[error("Stale node handle {0:?}")]
    StaleNode(NodeId),

    /// Uploaded file exceeds the configured limit.
    #[error("Upload rejected: '{name}' is {size} bytes (limit {limit} bytes)")]
    UploadRejected {
        name: CompactString,
        size: u64,
        limit: u64,
    },

    /// Uploaded file's extension is not on the allow-list.
    #[error("Upload rejected: '{name}' has a disallowed file type")]
    FileTypeRejected { name: CompactString },

    /// Page fixture or event script is malformed.
    #[error("Invalid fixture: {0}")]
    Fixture(String),

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Create a missing-target error
    pub fn missing_target(what: impl Into<CompactString>) -> Self {
        Self::MissingTarget(what.into())
    }

    /// Create a fixture error
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture(message.into())
    }

    /// Create a URL error keeping the offending input
    pub fn url(input: impl Into<String>, source: url::ParseError) -> Self {
        Self::Url {
            input: input.into(),
            source,
        }
    }

    /// Errors that mean "enhancement absent" and are never surfaced.
    #[inline]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::MissingTarget(_) | Self::StaleNode(_))
    }
}
