//! L2 (CLOB) family header generation.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use crate::Timestamp;
use crate::auth::{Credentials, hmac_base64, redact};

const HEADER_ADDRESS: &str = "POLY_ADDRESS";
const HEADER_API_KEY: &str = "POLY_API_KEY";
const HEADER_TIMESTAMP: &str = "POLY_TIMESTAMP";
const HEADER_PASSPHRASE: &str = "POLY_PASSPHRASE";
const HEADER_SIGNATURE: &str = "POLY_SIGNATURE";

/// L2 headers for one request. The secret is standard base64; the MAC is keyed
/// with the decoded bytes.
///
/// A secret that fails to decode does NOT fail the call: the MAC falls back to
/// the raw secret string, yielding a signature the server will reject. The
/// failure then surfaces as a clean auth rejection from the far end instead of
/// a local crash mid-request. Intentional; do not turn this into a hard error.
pub(crate) fn headers(
    credentials: &Credentials,
    address: &str,
    method: &str,
    path: &str,
    body: &str,
    timestamp: Timestamp,
) -> HashMap<String, String> {
    let signature = match BASE64.decode(&credentials.secret) {
        Ok(secret) => hmac_base64(&secret, timestamp, method, path, body),
        Err(err) => {
            debug!(
                secret = %redact(&credentials.secret),
                %err,
                "L2 secret is not valid base64; signing with raw secret bytes"
            );
            hmac_base64(credentials.secret.as_bytes(), timestamp, method, path, body)
        }
    };

    HashMap::from([
        (HEADER_ADDRESS.to_owned(), address.to_owned()),
        (HEADER_API_KEY.to_owned(), credentials.key.clone()),
        (HEADER_TIMESTAMP.to_owned(), timestamp.to_string()),
        (HEADER_PASSPHRASE.to_owned(), credentials.passphrase.clone()),
        (HEADER_SIGNATURE.to_owned(), signature),
    ])
}
