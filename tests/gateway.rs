mod common;

use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;

use common::{FakeCompleter, rate_limited};
use ideaforge::handlers::router;
use ideaforge::models::GenerateResponse;
use ideaforge::state::AppState;
use ideaforge::{Completer, ResponseCache, Store};

// Start the gateway on an ephemeral port and return its base url
async fn spawn_gateway(tmp: &TempDir, completer: Arc<dyn Completer>) -> String {
    let state = Arc::new(AppState {
        cache: ResponseCache::new(Store::new(tmp.path().join("cache"))),
        completer,
        system: "You are a business idea generator.".to_string(),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_generate_miss_then_hit() {
    let tmp = TempDir::new().unwrap();
    let fake = Arc::new(FakeCompleter::new(|system, prompt| Ok(format!("[{system}] {prompt}"))));
    let base = spawn_gateway(&tmp, fake.clone()).await;
    let http = reqwest::Client::new();

    let first: GenerateResponse = http
        .post(format!("{base}/api/generate"))
        .json(&json!({"prompt": "Generate 10 business ideas with AI"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!first.cached);
    assert_eq!(
        first.response,
        "[You are a business idea generator.] Generate 10 business ideas with AI"
    );

    let second: GenerateResponse = http
        .post(format!("{base}/api/generate"))
        .json(&json!({"system": "something else", "prompt": "Generate 10 business ideas with AI"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(second.cached);
    assert_eq!(second.response, first.response);
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn test_generate_uses_request_system_on_miss() {
    let tmp = TempDir::new().unwrap();
    let fake = Arc::new(FakeCompleter::new(|system, _| Ok(system.to_string())));
    let base = spawn_gateway(&tmp, fake.clone()).await;

    let res: GenerateResponse = reqwest::Client::new()
        .post(format!("{base}/api/generate"))
        .json(&json!({"system": "You are terse.", "prompt": "hi"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(res.response, "You are terse.");
}

#[tokio::test]
async fn test_remote_failure_is_bad_gateway() {
    let tmp = TempDir::new().unwrap();
    let fake = Arc::new(FakeCompleter::new(|_, _| Err(rate_limited())));
    let base = spawn_gateway(&tmp, fake.clone()).await;

    let res = reqwest::Client::new()
        .post(format!("{base}/api/generate"))
        .json(&json!({"prompt": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 502);
    assert!(res.text().await.unwrap().contains("Rate limit reached"));
    assert_eq!(std::fs::read_dir(tmp.path().join("cache")).map(|d| d.count()).unwrap_or(0), 0);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let tmp = TempDir::new().unwrap();
    let fake = Arc::new(FakeCompleter::new(|_, _| Ok("ok".to_string())));
    let base = spawn_gateway(&tmp, fake).await;
    let http = reqwest::Client::new();

    let health: Value = http
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["timestamp"].is_string());

    http.post(format!("{base}/api/generate"))
        .json(&json!({"prompt": "count me"}))
        .send()
        .await
        .unwrap();
    let metrics = http
        .get(format!("{base}/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("ideaforge_requests_total"));
    assert!(metrics.contains("ideaforge_cache_misses_total"));
}
