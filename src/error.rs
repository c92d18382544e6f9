use std::path::PathBuf;
use thiserror::Error;

// Failure of the remote completion service
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request to completion endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion API returned an empty response")]
    EmptyResponse,
}

// Everything that can go wrong inside ResponseCache::fetch
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cache entry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache entry {path} is corrupt: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write cache entry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Remote(#[from] CompletionError),
}

impl CacheError {
    pub fn is_remote(&self) -> bool {
        matches!(self, CacheError::Remote(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),
}
