use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::{CompletionError, ConfigError};
use crate::models::{ChatMessage, ChatRequest, ChatResponse, ErrorBody};

// A remote text-completion service.
//
// The cache only ever calls this on a miss. Implementations must not retry
// on their own; retry policy belongs to whoever calls the cache.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError>;
}

// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        model: &str,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, system: &str, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl Completer for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, %url, "sending chat completion request");

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request(system, prompt))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = res.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    // Spawn a stand-in endpoint and return its base url
    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new(base_url, "sk-test".into(), "gpt-4", 500, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_complete_sends_messages_and_reads_first_choice() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], "gpt-4");
                assert_eq!(body["max_tokens"], 500);
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][0]["content"], "be brief");
                assert_eq!(body["messages"][1]["role"], "user");
                let prompt = body["messages"][1]["content"].as_str().unwrap().to_string();
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": format!("echo: {prompt}")}}]
                }))
            }),
        );
        let base = spawn(app).await;

        let text = client(&base).complete("be brief", "Hello").await.unwrap();
        assert_eq!(text, "echo: Hello");
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_message() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": {"message": "Rate limit reached", "type": "requests"}})),
                )
            }),
        );
        let base = spawn(app).await;

        let err = client(&base).complete("sys", "Hello").await.unwrap_err();
        match err {
            CompletionError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit reached");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_api_error_with_plain_body() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base = spawn(app).await;

        let err = client(&base).complete("sys", "Hello").await.unwrap_err();
        assert!(matches!(err, CompletionError::Api { status: 401, ref message } if message == "bad key"));
    }

    #[tokio::test]
    async fn test_no_choices_is_empty_response() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let base = spawn(app).await;

        let err = client(&base).complete("sys", "Hello").await.unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_empty_content_is_returned() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": [{"message": {"role": "assistant", "content": ""}}]})) }),
        );
        let base = spawn(app).await;

        let text = client(&base).complete("sys", "Hello").await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_response() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": [{"message": {"role": "assistant", "content": null}}]})) }),
        );
        let base = spawn(app).await;

        let err = client(&base).complete("sys", "Hello").await.unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        // bind then drop so the port is closed
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}/v1", addr))
            .complete("sys", "Hello")
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Http(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let c = client("https://api.openai.com/v1/");
        assert_eq!(c.base_url, "https://api.openai.com/v1");
        assert_eq!(c.model(), "gpt-4");
    }
}
