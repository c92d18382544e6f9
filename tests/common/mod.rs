#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ideaforge::{Completer, CompletionError};

/// Completer answering from a closure and recording every call.
pub struct FakeCompleter<F> {
    reply: F,
    delay: Duration,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String)>>,
}

impl<F> FakeCompleter<F>
where
    F: Fn(&str, &str) -> Result<String, CompletionError> + Send + Sync,
{
    pub fn new(reply: F) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl<F> Completer for FakeCompleter<F>
where
    F: Fn(&str, &str) -> Result<String, CompletionError> + Send + Sync,
{
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.reply)(system, prompt)
    }
}

pub fn rate_limited() -> CompletionError {
    CompletionError::Api {
        status: 429,
        message: "Rate limit reached".to_string(),
    }
}
