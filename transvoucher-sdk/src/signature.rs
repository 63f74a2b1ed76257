//! Signature algorithm and verification for TransVoucher webhooks.
//!
//! Every webhook delivery carries an HMAC-SHA256 signature over the raw
//! request body.  The canonical wire format for the header is:
//!
//! ```text
//! X-TransVoucher-Signature: sha256={lowercase_hex_digest}
//! ```
//!
//! Some delivery paths use the timestamped form `t={unix},v1={hex}` instead;
//! [`extract_signature`] normalizes both into the canonical form before
//! anything is compared.
//!
//! Verification always runs over the exact bytes received from the transport.
//! Re-serializing the decoded JSON is not byte-identical and would break the
//! digest.

use subtle::ConstantTimeEq;

/// Header name carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "X-TransVoucher-Signature";

/// Prefix of the canonical signature form.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Component of the timestamped header form holding the digest.
const V1_COMPONENT: &str = "v1=";

/// Errors produced while normalizing a signature header.
///
/// These indicate an integration problem (wrong header, wrong format) rather
/// than a rejected delivery, so they surface as hard errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The header is absent, blank, or in neither accepted form.
    #[error("Invalid signature header format")]
    MalformedHeader,
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Compute the canonical signature of `payload`:
/// `"sha256=" + hex(HMAC-SHA256(payload, secret))`.
///
/// HMAC accepts keys of any length, so there is no failure mode.
pub fn generate_signature(payload: impl AsRef<[u8]>, secret: impl AsRef<[u8]>) -> String {
    let key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret.as_ref());
    let tag = ring::hmac::sign(&key, payload.as_ref());
    format!("{SIGNATURE_PREFIX}{}", hex::encode(tag.as_ref()))
}

/// Verify `signature` against the expected signature of `payload`.
///
/// Returns `false` for every kind of failure. A wrong signature and a
/// signature that could not be checked look the same to the caller.
pub fn verify_signature(
    payload: impl AsRef<[u8]>,
    signature: &str,
    secret: impl AsRef<[u8]>,
) -> bool {
    let expected = generate_signature(payload, secret);
    secure_compare(signature, &expected)
}

/// Compare two strings in time independent of where they differ.
///
/// Strings of unequal length compare unequal immediately; the length of a
/// hex digest is public. Equal-length inputs are compared over every byte.
pub fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

// ---------------------------------------------------------------------------
// Header normalization
// ---------------------------------------------------------------------------

/// Normalize a signature header into canonical `sha256={hex}` form.
///
/// Accepted inputs:
///
/// * `sha256={hex}`, returned unchanged;
/// * a comma-separated `key=value` list containing `v1={hex}`, e.g.
///   `t=1700000000,v1={hex}`, returned as `sha256={hex}`.
pub fn extract_signature(header: &str) -> Result<String, SignatureError> {
    let header = header.trim();
    if header.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    if let Some(digest) = header.strip_prefix(SIGNATURE_PREFIX) {
        if digest.is_empty() {
            return Err(SignatureError::MalformedHeader);
        }
        return Ok(header.to_owned());
    }

    header
        .split(',')
        .map(str::trim)
        .find_map(|part| part.strip_prefix(V1_COMPONENT))
        .filter(|digest| !digest.is_empty())
        .map(|digest| format!("{SIGNATURE_PREFIX}{digest}"))
        .ok_or(SignatureError::MalformedHeader)
}
