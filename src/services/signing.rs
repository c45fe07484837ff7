//! HMAC-SHA256 signing and verification.
//!
//! The canonical serialization rule for outbound calls: adapters sign the
//! exact byte sequence they transmit (the `serde_json::to_vec` output,
//! produced once and reused as the request body). Inbound webhooks are
//! verified over the raw body bytes as received.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `payload` under `secret`. Deterministic: the
/// same inputs always produce the same signature string.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Recompute the signature and compare against the claimed value in
/// constant time.
pub fn verify(payload: &[u8], claimed: &str, secret: &str) -> bool {
    let expected = sign(payload, secret);
    expected.as_bytes().ct_eq(claimed.as_bytes()).into()
}
