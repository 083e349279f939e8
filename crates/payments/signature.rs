//! HMAC-SHA256 webhook signatures shared by every payment provider.
//!
//! The digest covers the raw request body. Callers may send it with or
//! without the `sha256=` scheme tag.

use anyhow::Result;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_SCHEME_PREFIX: &str = "sha256=";

/// Returns `sha256=<hex digest>` for `payload`.
pub fn sign_webhook_payload(payload: &[u8], secret: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(payload);
    Ok(format!(
        "{}{}",
        SIGNATURE_SCHEME_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Checks `signature` against the HMAC of `payload`. Never errors: an empty
/// body, empty secret, or undecodable signature all count as a mismatch.
pub fn verify_webhook_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    if payload.is_empty() || secret.is_empty() {
        return false;
    }

    let signature = signature.trim();
    let provided_hex = signature
        .strip_prefix(SIGNATURE_SCHEME_PREFIX)
        .unwrap_or(signature);
    if provided_hex.is_empty() {
        return false;
    }

    let Ok(provided) = hex::decode(provided_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    expected.as_slice().ct_eq(provided.as_slice()).into()
}
