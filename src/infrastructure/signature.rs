//! Inbound webhook signature verification
//!
//! The provider signs each delivery with HMAC-SHA256 over the exact raw
//! body and sends `sha256=<hex>` in a header. Verification must run on the
//! raw bytes captured before any JSON parsing, because re-serialization
//! does not round-trip byte-for-byte.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a delivery signature against the repository's webhook secret.
///
/// Fails closed: a missing header, a header that is not exactly
/// `sha256=<hex>`, an undecodable digest, or a mismatch all return `false`.
/// The comparison is constant time. This function never panics and never
/// returns an error past this boundary.
pub fn verify_signature(body: &[u8], signature_header: Option<&str>, secret: &str) -> bool {
    let Some(header) = signature_header else {
        return false;
    };

    let parts: Vec<&str> = header.split('=').collect();
    if parts.len() != 2 || parts[0] != "sha256" {
        return false;
    }

    let Ok(expected) = hex::decode(parts[1]) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Sign a body the way the provider does. Used by tests and by outbound
/// deliveries if the host ever emits its own webhooks.
pub fn sign_body(body: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
