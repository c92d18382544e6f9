use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{KeyScope, ResponseCache, Store, WritePolicy};
use crate::client::OpenAiClient;
use crate::error::ConfigError;
use crate::report::DEFAULT_SYSTEM;

#[derive(Parser, Debug, Clone)]
#[command(name = "ideaforge")]
#[command(about = "Business idea catalogs and multi-agent architecture decks from a cached LLM")]
pub struct Cli {
    #[command(flatten)]
    pub config: AppConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate the idea catalog and the architecture deck
    Generate(ReportArgs),

    /// Generate only the business idea catalog
    Catalog(ReportArgs),

    /// Generate only the multi-agent architecture deck
    Architecture {
        /// The SaaS idea to design for
        #[arg(long)]
        idea: String,

        /// Directory the deck is written to
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Inspect or prune the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Serve cached completions over HTTP
    Serve {
        /// Port to run the server on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Print the number of stored entries
    Stats,
    /// Delete every stored entry
    Clear,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Industry substituted into the catalog prompts
    #[arg(long, default_value = "technology")]
    pub industry: String,

    /// Business idea substituted into the catalog prompts
    #[arg(long, default_value = "AI-powered personal productivity assistant")]
    pub idea: String,

    /// Directory reports are written to
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Filename prefix of the catalog report
    #[arg(long, default_value = "business_idea_generation")]
    pub stem: String,
}

#[derive(Args, Debug, Clone)]
pub struct AppConfig {
    /// Directory holding cached responses
    #[arg(long, global = true, env = "IDEAFORGE_CACHE_DIR", default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Model name sent with every request
    #[arg(long, global = true, env = "IDEAFORGE_MODEL", default_value = "gpt-4")]
    pub model: String,

    /// Completion length limit sent with every request
    #[arg(long, global = true, env = "IDEAFORGE_MAX_TOKENS", default_value_t = 500)]
    pub max_tokens: u32,

    /// Base url of the OpenAI-compatible API
    #[arg(long, global = true, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub api_base: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 120)]
    pub request_timeout: u64,

    /// System instruction for every prompt
    #[arg(long, global = true, default_value = DEFAULT_SYSTEM)]
    pub system: String,

    /// Hash the system instruction into the cache key as well
    #[arg(long, global = true)]
    pub key_includes_system: bool,

    /// Fail a call when its response cannot be persisted
    #[arg(long, global = true)]
    pub strict_cache_writes: bool,
}

impl AppConfig {
    pub fn key_scope(&self) -> KeyScope {
        if self.key_includes_system {
            KeyScope::PromptAndSystem
        } else {
            KeyScope::Prompt
        }
    }

    pub fn write_policy(&self) -> WritePolicy {
        if self.strict_cache_writes {
            WritePolicy::Strict
        } else {
            WritePolicy::Warn
        }
    }

    pub fn store(&self) -> Store {
        Store::new(&self.cache_dir)
    }

    pub fn response_cache(&self) -> ResponseCache {
        ResponseCache::new(self.store())
            .with_key_scope(self.key_scope())
            .with_write_policy(self.write_policy())
    }

    pub fn api_key(&self) -> Result<String, ConfigError> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn client(&self) -> Result<OpenAiClient, ConfigError> {
        OpenAiClient::new(
            &self.api_base,
            self.api_key()?,
            &self.model,
            self.max_tokens,
            Duration::from_secs(self.request_timeout),
        )
    }
}
