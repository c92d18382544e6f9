use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, TextEncoder, register_counter, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("ideaforge_requests_total", "Total number of gateway requests").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("ideaforge_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("ideaforge_cache_misses_total", "Total cache misses").unwrap();
    pub static ref REMOTE_FAILURES: Counter =
        register_counter!("ideaforge_remote_failures_total", "Failed calls to the completion endpoint").unwrap();
    pub static ref CACHE_WRITE_FAILURES: Counter =
        register_counter!("ideaforge_cache_write_failures_total", "Responses that could not be persisted").unwrap();
    pub static ref ENTRIES_WRITTEN: Counter =
        register_counter!("ideaforge_cache_entries_written_total", "Cache entries written by this process").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "ideaforge_request_latency_seconds",
        "Gateway request latency in seconds"
    )
    .unwrap();
}

// Render the default registry in the Prometheus text format
pub fn render() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| format!("Failed to encode metrics: {}", e))?;
    String::from_utf8(buffer).map_err(|e| format!("Metrics are not UTF-8: {}", e))
}
