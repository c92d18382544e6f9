// Markdown reports assembled from cached completions.

pub mod architecture;
pub mod ideas;

use std::path::{Path, PathBuf};
use tracing::info;

use crate::cache::ResponseCache;
use crate::client::Completer;
use crate::error::{CacheError, ReportError};

pub const DEFAULT_SYSTEM: &str = "You are a business idea generator.";

// Sends every prompt of a report through the cache under one system
// instruction.
pub struct Runner<'a> {
    cache: &'a ResponseCache,
    completer: &'a dyn Completer,
    system: String,
}

impl<'a> Runner<'a> {
    pub fn new(cache: &'a ResponseCache, completer: &'a dyn Completer, system: impl Into<String>) -> Self {
        Self {
            cache,
            completer,
            system: system.into(),
        }
    }

    pub async fn ask(&self, prompt: &str) -> Result<String, CacheError> {
        self.cache
            .fetch_with(&self.system, prompt, self.completer)
            .await
            .map(|fetched| fetched.text)
    }
}

// Non-blank, trimmed lines of a model response
pub(crate) fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// Filename-safe rendering of free text.
pub fn slug(text: &str) -> String {
    let mut out = String::new();
    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '-' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let out: String = out.trim_matches('_').chars().take(60).collect();
    if out.is_empty() { "untitled".to_string() } else { out }
}

pub(crate) fn write_report(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, ReportError> {
    let path = dir.join(file_name);
    std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(&path, content))
        .map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "report saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_skips_blank_and_trims() {
        let text = "  1. First\n\n2. Second  \n   \n3. Third";
        assert_eq!(lines(text), vec!["1. First", "2. Second", "3. Third"]);
        assert!(lines("").is_empty());
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("A system that provide tax optimization"), "A_system_that_provide_tax_optimization");
        assert_eq!(slug("  AI-powered / assistant!  "), "AI-powered_assistant");
        assert_eq!(slug("///"), "untitled");
        assert_eq!(slug(&"x".repeat(100)).len(), 60);
    }

    #[test]
    fn test_write_report_creates_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("output");
        let path = write_report(&dir, "r.md", "# hi\n").unwrap();
        assert_eq!(path, dir.join("r.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# hi\n");
    }
}
