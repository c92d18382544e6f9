use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use std::time::Instant;
use crate::error::CacheError;
use crate::state::AppState;
use crate::models::{GenerateRequest, GenerateResponse};
use crate::metrics::{REQUEST_TOTAL, REQUEST_LATENCY};

// Remote failures are the upstream's fault, everything else is ours
fn error_response(err: CacheError) -> (StatusCode, String) {
    let status = if err.is_remote() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string())
}

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    REQUEST_TOTAL.inc();

    let start_time = Instant::now();
    let system = payload.system.as_deref().unwrap_or(&state.system);

    let fetched = state
        .cache
        .fetch_with(system, &payload.prompt, state.completer.as_ref())
        .await
        .map_err(error_response)?;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    Ok(Json(GenerateResponse {
        cached: fetched.cached(),
        response: fetched.text,
    }))
}
