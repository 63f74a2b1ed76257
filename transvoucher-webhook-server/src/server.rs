//! Axum server setup and router configuration.

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde::Serialize;
use tokio::net::TcpListener;
use transvoucher_sdk::webhook::DispatchError;

use crate::extractors::SignatureHeader;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/webhook", post(receive_webhook))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct Ack {
    received: bool,
}

/// Body of every non-2xx response.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

/// Maps dispatch failures onto HTTP responses.
///
/// Rejected deliveries are the sender's problem (400); handler failures are
/// ours (500) so that TransVoucher retries them.
struct WebhookError(DispatchError);

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self.0 {
            DispatchError::Rejected(failure) => {
                error_response(StatusCode::BAD_REQUEST, failure.to_string())
            }
            DispatchError::Handler(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "webhook handler failed")
            }
        }
    }
}

async fn receive_webhook(
    State(state): State<AppState>,
    SignatureHeader(signature): SignatureHeader,
    body: Bytes,
) -> Result<Json<Ack>, WebhookError> {
    state
        .dispatcher
        .dispatch(&body, &signature)
        .await
        .map_err(WebhookError)?;
    Ok(Json(Ack { received: true }))
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
