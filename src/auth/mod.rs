//! HMAC request authentication for the Builder and L2 (CLOB) API families.
//!
//! Both families sign the same canonical message,
//! `{timestamp}{method}{path}{body}` with no delimiters, using HMAC-SHA256 and
//! emit the digest as standard base64. They differ only in how the shared
//! secret is decoded: the Builder family keys the MAC with the raw secret
//! bytes, the L2 family base64-decodes the secret first.
//!
//! Every operation here is a pure function of its arguments plus, for the
//! clock-sampling variants, the system time. The `*_at` variants exist so
//! callers (and tests) can pin the timestamp.

mod builder;
mod l2;

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac as _};
use sha2::Sha256;

use crate::Timestamp;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// API credentials for an authenticated session.
///
/// `secret` is base64-standard-encoded for the L2 family and used as raw bytes
/// for the Builder family. Immutable once constructed.
#[derive(Clone)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
    pub passphrase: String,
}

impl Credentials {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Redacted forms only; this is the single representation of
        // credentials allowed to reach a log sink.
        f.debug_struct("Credentials")
            .field("key", &redact(&self.key))
            .field("secret", &redact(&self.secret))
            .field("passphrase", &MASK)
            .finish()
    }
}

/// Computes the header sets the Builder and L2 API gateways verify.
///
/// Holds no mutable state; a single instance may be shared freely across
/// threads for the lifetime of the session.
#[derive(Clone, Debug)]
pub struct RequestAuthenticator {
    credentials: Credentials,
}

impl RequestAuthenticator {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Builder-family headers for `(method, path, body)` at the current time.
    #[must_use]
    pub fn builder_headers(
        &self,
        method: &str,
        path: &str,
        body: &str,
    ) -> HashMap<String, String> {
        self.builder_headers_at(method, path, body, unix_now())
    }

    /// Builder-family headers with an explicit timestamp.
    #[must_use]
    pub fn builder_headers_at(
        &self,
        method: &str,
        path: &str,
        body: &str,
        timestamp: Timestamp,
    ) -> HashMap<String, String> {
        builder::headers(&self.credentials, method, path, body, timestamp)
    }

    /// L2-family headers for `(method, path, body)` at the current time.
    #[must_use]
    pub fn l2_headers(
        &self,
        address: &str,
        method: &str,
        path: &str,
        body: &str,
    ) -> HashMap<String, String> {
        self.l2_headers_at(address, method, path, body, unix_now())
    }

    /// L2-family headers with an explicit timestamp.
    #[must_use]
    pub fn l2_headers_at(
        &self,
        address: &str,
        method: &str,
        path: &str,
        body: &str,
        timestamp: Timestamp,
    ) -> HashMap<String, String> {
        l2::headers(&self.credentials, address, method, path, body, timestamp)
    }
}

fn unix_now() -> Timestamp {
    Utc::now().timestamp()
}

/// HMAC-SHA256 over the canonical message, as standard base64.
pub(crate) fn hmac_base64(
    key: &[u8],
    timestamp: Timestamp,
    method: &str,
    path: &str,
    body: &str,
) -> String {
    let message = format!("{timestamp}{method}{path}{body}");
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(message.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

const MASK: &str = "****";

/// First four characters followed by a fixed mask, or the mask alone for
/// values of four characters or fewer.
#[must_use]
pub fn redact(value: &str) -> String {
    if value.chars().count() <= 4 {
        MASK.to_owned()
    } else {
        let head: String = value.chars().take(4).collect();
        format!("{head}{MASK}")
    }
}
