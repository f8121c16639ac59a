//! Shopify webhook signature checks.
//!
//! Shopify signs every webhook with HMAC-SHA256 over the raw request body,
//! keyed by the app's shared secret, and sends the base64 digest in the
//! `x-shopify-hmac-sha256` header.

use std::fmt::{Display, Formatter};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    /// Header or configured secret absent, nothing was hashed.
    MissingCredential,
    Mismatch,
}

impl Display for VerificationError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            VerificationError::MissingCredential => {
                write!(f, "missing webhook signature or secret")
            }
            VerificationError::Mismatch => write!(f, "webhook signature mismatch"),
        }
    }
}

impl std::error::Error for VerificationError {}

impl IntoResponse for VerificationError {
    fn into_response(self) -> Response {
        match self {
            VerificationError::MissingCredential => (
                StatusCode::BAD_REQUEST,
                "Missing webhook signature or secret.",
            )
                .into_response(),
            VerificationError::Mismatch => {
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
        }
    }
}

/// base64(HMAC-SHA256(secret, body))
pub fn compute_signature(body: &[u8], secret: &str) -> Result<String, VerificationError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| VerificationError::Mismatch)?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Fails closed: the request is only authorized when the header matches the
/// digest of `body` exactly. Comparison is constant time.
pub fn verify_webhook(
    body: &[u8],
    signature: Option<&[u8]>,
    secret: Option<&str>,
) -> Result<(), VerificationError> {
    let (signature, secret) = match (signature, secret) {
        (Some(signature), Some(secret)) if !signature.is_empty() && !secret.is_empty() => {
            (signature, secret)
        }
        _ => return Err(VerificationError::MissingCredential),
    };

    let expected = compute_signature(body, secret)?;

    if bool::from(expected.as_bytes().ct_eq(signature)) {
        Ok(())
    } else {
        Err(VerificationError::Mismatch)
    }
}
