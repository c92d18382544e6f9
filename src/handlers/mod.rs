mod health;
mod metrics;
mod generate;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use generate::generate_handler;

use axum::{Router, routing::{get, post}};
use std::sync::Arc;
use crate::state::AppState;

// Routes of the gateway
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/generate", post(generate_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
