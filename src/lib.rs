pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod report;
pub mod state;

pub use cache::{CacheEntry, CacheKey, Fetched, KeyScope, ResponseCache, Source, Store, WritePolicy};
pub use client::{Completer, OpenAiClient};
pub use error::{CacheError, CompletionError, ConfigError, ReportError};
