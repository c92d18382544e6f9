use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::{Runner, slug, write_report};
use crate::catalog::{Subject, Topic};
use crate::error::{CacheError, ReportError};

pub const ERROR_PLACEHOLDER: &str = "Error occurred while fetching response.";

// Result of asking one catalog topic.
#[derive(Debug)]
pub struct TopicOutcome {
    pub topic: Topic,
    pub prompt: String,
    pub response: Result<String, CacheError>,
}

impl TopicOutcome {
    pub fn is_ok(&self) -> bool {
        self.response.is_ok()
    }
}

// Asks every topic in order. A failed topic is recorded and the session
// moves on to the next one.
pub async fn collect(runner: &Runner<'_>, subject: &Subject) -> Vec<TopicOutcome> {
    let mut outcomes = Vec::with_capacity(Topic::ALL.len());
    for topic in Topic::ALL {
        info!(%topic, "processing topic");
        let prompt = topic.prompt(subject);
        let response = runner.ask(&prompt).await;
        if let Err(e) = &response {
            error!(%topic, error = %e, "failed to get response for topic");
        }
        outcomes.push(TopicOutcome {
            topic,
            prompt,
            response,
        });
    }
    outcomes
}

pub fn render(date: NaiveDate, outcomes: &[TopicOutcome]) -> String {
    let mut md = format!(
        "# Business Idea Generation Session\n\nDate: {}\n\n",
        date.format("%Y-%m-%d")
    );
    for outcome in outcomes {
        md.push_str(&format!("## {}\n\n", outcome.topic));
        md.push_str(&format!("**Prompt:** {}\n\n", outcome.prompt));
        match &outcome.response {
            Ok(text) => md.push_str(&format!("**Response:**\n\n{}\n\n", text)),
            Err(_) => md.push_str(&format!("**Response:** {}\n\n", ERROR_PLACEHOLDER)),
        }
        md.push_str("---\n\n");
    }
    md
}

// Runs the whole catalog for `subject` and writes
// `<output>/<stem>_<idea>_<timestamp>.md`.
pub async fn generate(
    runner: &Runner<'_>,
    subject: &Subject,
    output: &Path,
    stem: &str,
) -> Result<PathBuf, ReportError> {
    info!(industry = %subject.industry, idea = %subject.idea, "starting business idea catalog");
    let outcomes = collect(runner, subject).await;
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();

    let now = Local::now();
    let content = render(now.date_naive(), &outcomes);
    let file_name = format!(
        "{}_{}_{}.md",
        stem,
        slug(&subject.idea),
        now.format("%Y%m%d_%H%M%S")
    );
    let path = write_report(output, &file_name, &content)?;
    info!(topics = outcomes.len(), failed, "business idea catalog completed");
    Ok(path)
}
