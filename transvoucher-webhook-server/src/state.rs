//! Application state shared across all request handlers.

use std::sync::Arc;

use transvoucher_sdk::webhook::WebhookDispatcher;

/// Cheap to clone; the dispatcher is immutable and shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: Arc<WebhookDispatcher>,
}

impl AppState {
    pub fn new(dispatcher: WebhookDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}
