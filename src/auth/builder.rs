//! Builder-family header generation.

use std::collections::HashMap;

use crate::Timestamp;
use crate::auth::{Credentials, hmac_base64};

const HEADER_API_KEY: &str = "POLY_BUILDER_API_KEY";
const HEADER_TIMESTAMP: &str = "POLY_BUILDER_TIMESTAMP";
const HEADER_PASSPHRASE: &str = "POLY_BUILDER_PASSPHRASE";
const HEADER_SIGNATURE: &str = "POLY_BUILDER_SIGNATURE";

/// Builder headers for one request. The MAC is keyed with the raw secret
/// string bytes; the Builder gateway holds the same literal secret.
pub(crate) fn headers(
    credentials: &Credentials,
    method: &str,
    path: &str,
    body: &str,
    timestamp: Timestamp,
) -> HashMap<String, String> {
    let signature = hmac_base64(credentials.secret.as_bytes(), timestamp, method, path, body);

    HashMap::from([
        (HEADER_API_KEY.to_owned(), credentials.key.clone()),
        (HEADER_TIMESTAMP.to_owned(), timestamp.to_string()),
        (HEADER_PASSPHRASE.to_owned(), credentials.passphrase.clone()),
        (HEADER_SIGNATURE.to_owned(), signature),
    ])
}
