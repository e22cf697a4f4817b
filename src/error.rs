//! Error type shared by the authentication, signing, and key-custody modules.

/// Errors produced by the signing and key-custody core.
///
/// Nothing in this crate retries; every error is reported synchronously to the
/// caller. Retry policy, where it exists at all, belongs to the network layer
/// consuming these primitives.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Malformed input: bad hex, a wrong-length key, an unparseable numeric
    /// order field, or an empty password. The message names the offending
    /// value.
    #[error("validation error: {0}")]
    Validation(String),

    /// The ECDSA primitive rejected a signing request. Should not occur for a
    /// valid 32-byte digest and a valid key.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Cipher construction or sealing failed.
    #[error("cipher error: {0}")]
    Cipher(String),

    /// Opening the sealed key failed. A wrong password and a corrupted file
    /// are deliberately indistinguishable here; the distinction is itself
    /// sensitive.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The key file declares a schema version this build does not understand.
    #[error("unsupported key file version: {0}")]
    UnsupportedKeyVersion(u32),

    /// Neither an inline key nor an encrypted key file was configured.
    #[error("no private key source configured")]
    NoKeySource,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn signing(message: impl Into<String>) -> Self {
        Self::Signing(message.into())
    }

    pub(crate) fn cipher(message: impl Into<String>) -> Self {
        Self::Cipher(message.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
