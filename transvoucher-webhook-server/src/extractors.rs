//! Axum extractor for the `X-TransVoucher-Signature` header.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use crate::server::error_response;
use transvoucher_sdk::signature::{SIGNATURE_HEADER, SignatureError, extract_signature};

/// The delivery's signature, normalized to `sha256={hex}`.
///
/// Accepts both the bare `sha256=` form and `t={unix},v1={hex}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader(pub String);

/// Rejection for a missing or unparseable signature header.
#[derive(Debug)]
pub struct SignatureRejection(SignatureError);

impl IntoResponse for SignatureRejection {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.0, "Webhook delivery without usable signature header");
        error_response(StatusCode::BAD_REQUEST, self.0.to_string())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for SignatureHeader {
    type Rejection = SignatureRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = match parts.headers.get(SIGNATURE_HEADER) {
            Some(value) => value
                .to_str()
                .map_err(|_| SignatureRejection(SignatureError::MalformedHeader))?,
            None => "",
        };

        extract_signature(raw)
            .map(SignatureHeader)
            .map_err(SignatureRejection)
    }
}
