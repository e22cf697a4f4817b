//! Cryptographic core for Polymarket CLOB trading clients.
//!
//! This crate is the trust boundary of a trading client: everything that
//! touches a shared secret or a private key lives here, and nothing here
//! performs network I/O. Three independent pieces:
//!
//! - [`auth`] — HMAC-SHA256 request authentication headers for the Builder
//!   and L2 (CLOB) API families.
//! - [`signer`] — EIP-712 digest construction and secp256k1 signing for the
//!   CLOB authentication challenge and the CTF Exchange order struct.
//! - [`vault`] — password-based encryption of the private key and the
//!   precedence rule for resolving it at startup.
//!
//! The REST/WebSocket clients that consume the produced headers and
//! signatures are external collaborators; so are risk checks and retry
//! policy. Every output here must be bit-exact against an external verifier
//! (the API gateway's HMAC check or on-chain signature recovery), which is
//! why the modules carry reference test vectors.

pub mod auth;
pub mod error;
pub mod signer;
pub mod vault;

pub use auth::{Credentials, RequestAuthenticator};
pub use error::{Error, Result};
pub use signer::{OrderPayload, Side, SignatureType, TypedDataSigner};
pub use vault::{
    EncryptedKeyRecord, KeyResolutionConfig, decrypt_private_key, encrypt_private_key,
    resolve_private_key,
};

/// Unix timestamp in seconds.
pub type Timestamp = i64;
