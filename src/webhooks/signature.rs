//! Webhook signature verification (HMAC-SHA256).
//!
//! GitHub signs every delivery with the App's webhook secret and sends the
//! result in `X-Hub-Signature-256` as `sha256=<hex>`. The MAC must be computed
//! over the raw request body exactly as received: re-serializing a parsed body
//! does not reproduce the sender's bytes.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm prefix of the signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Decodes a `sha256=<hex>` header value into the raw MAC bytes.
///
/// Returns `None` for a missing or different prefix, or for invalid hex.
///
/// ```
/// use pushpost::webhooks::parse_signature_header;
///
/// assert_eq!(parse_signature_header("sha256=0aff"), Some(vec![0x0a, 0xff]));
/// assert!(parse_signature_header("sha1=0aff").is_none());
/// assert!(parse_signature_header("sha256=zz").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.trim().strip_prefix(SIGNATURE_PREFIX)?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 of `payload` keyed by `secret`.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Renders MAC bytes as a header value (`sha256=<lowercase hex>`).
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(signature))
}

/// Checks a delivery's signature header against its raw body.
///
/// The comparison is constant-time (delegated to `Mac::verify_slice`), so the
/// time taken does not reveal where the first mismatching byte is. Malformed
/// headers simply fail verification; this function never panics.
///
/// ```
/// use pushpost::webhooks::{compute_signature, format_signature_header, verify_signature};
///
/// let body = br#"{"ref":"refs/heads/main"}"#;
/// let header = format_signature_header(&compute_signature(body, b"s3cret"));
///
/// assert!(verify_signature(body, &header, b"s3cret"));
/// assert!(!verify_signature(body, &header, b"other"));
/// ```
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let Some(expected) = parse_signature_header(signature_header) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
