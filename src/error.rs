// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for canvasbot

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for canvasbot
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Host access error: {0}")]
    HostAccess(String),

    #[error("Traversal error: element tree exceeds maximum depth of {max_depth}")]
    Traversal { max_depth: usize },

    #[error("Invalid element: {0}")]
    InvalidElement(String),

    #[error("Advice endpoint error: {0}")]
    Advisor(String),

    #[error("Malformed advice response: {0}")]
    MalformedResponse(String),

    #[error("No document available: {0}")]
    NoDocument(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Whether an advice call that failed with this error is worth retrying.
    ///
    /// Network failures, non-2xx statuses and responses missing the
    /// completion payload are retried; everything else is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Advisor(_))
    }
}
