//! Handlers registered by the reference receiver.
//!
//! They only log the lifecycle transition; a real integration would update
//! its order store here.

use transvoucher_sdk::webhook::{EventType, WebhookDispatcher, WebhookEvent};

/// Register a logging handler for every known event type.
pub fn register(mut dispatcher: WebhookDispatcher) -> WebhookDispatcher {
    for event_type in EventType::ALL {
        dispatcher = dispatcher.on(event_type, log_event);
    }
    dispatcher
}

async fn log_event(event: WebhookEvent) -> anyhow::Result<()> {
    let record = event.record();
    let field = |name: &str| {
        record
            .and_then(|r| r.get(name))
            .map(|v| v.to_string())
            .unwrap_or_default()
    };

    match event.event_type() {
        EventType::Failed | EventType::Cancelled | EventType::Expired => tracing::warn!(
            event = %event.event_name(),
            id = %field("id"),
            status = %field("status"),
            "Payment did not complete"
        ),
        _ => tracing::info!(
            event = %event.event_name(),
            id = %field("id"),
            amount = %field("amount"),
            currency = %field("currency"),
            "Payment event received"
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_a_handler() {
        let dispatcher = register(WebhookDispatcher::new("whsec_test"));
        for event_type in EventType::ALL {
            assert!(dispatcher.has_handler(event_type));
        }
    }
}
