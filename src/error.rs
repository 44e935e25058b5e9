use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// A `refresh()` that did not produce a new document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to alert feed failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("alert feed answered with status {0}")]
    Status(StatusCode),

    #[error("alert feed is not a valid document: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("no valid lines configured")]
    EmptyLines,

    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("alert feed has not been fetched yet")]
    NotYetFetched,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
