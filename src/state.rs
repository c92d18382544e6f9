use std::sync::Arc;
use crate::cache::ResponseCache;
use crate::client::Completer;
// app's shared state

pub struct AppState {
    pub cache: ResponseCache,
    pub completer: Arc<dyn Completer>,
    pub system: String, // used when a request carries no system instruction
}
