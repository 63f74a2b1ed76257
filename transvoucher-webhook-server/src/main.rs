//! TransVoucher Webhook Server
//!
//! Reference receiver: verifies deliveries and logs each payment lifecycle
//! event.

mod config;
mod extractors;
mod handlers;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::Args;
use server::{build_router, run_server};
use state::AppState;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use transvoucher_sdk::webhook::Webhook;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!(
        "Starting transvoucher-webhook-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let webhook_config = args.webhook_config().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;
    tracing::info!(
        schema = ?webhook_config.schema,
        tolerance_secs = webhook_config.tolerance.as_secs(),
        enforce_staleness = args.enforce_staleness,
        "Configuration loaded"
    );

    let tolerance = webhook_config.tolerance;
    let mut dispatcher = Webhook::new(webhook_config).dispatcher();
    if args.enforce_staleness {
        dispatcher = dispatcher.with_tolerance(tolerance);
    }
    let state = AppState::new(handlers::register(dispatcher));

    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", args.listen);
    run_server(router, args.listen).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,transvoucher_sdk=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
