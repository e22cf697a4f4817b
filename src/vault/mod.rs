//! Password-based private key encryption and startup key resolution.
//!
//! The durable artifact is a small JSON record: a version gate, a PBKDF2 salt,
//! an AES-GCM nonce, and the sealed 32-byte key. Decryption refuses any record
//! version it does not understand rather than guessing at the layout.
//!
//! Key material in flight is held in zeroizing buffers and handed out as
//! [`SecretString`]; nothing here ever formats a raw key into a log line.

use std::path::PathBuf;

use aes_gcm::aead::{Aead as _, AeadCore as _, KeyInit as _, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use alloy::primitives::hex;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::Hmac;
use rand::Rng as _;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// The single key-file schema version this build understands.
pub const KEY_FILE_VERSION: u32 = 1;

/// PBKDF2-HMAC-SHA256 round count. A floor chosen to resist offline brute
/// force; raising it only affects newly written files since the derivation is
/// re-run from the stored salt on decrypt.
pub const PBKDF2_ITERATIONS: u32 = 480_000;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const PRIVATE_KEY_LEN: usize = 32;

/// On-disk form of an encrypted private key. All byte fields are standard
/// base64.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedKeyRecord {
    pub version: u32,
    pub salt: String,
    pub nonce: String,
    pub ciphertext: String,
}

/// Where the process gets "the" private key. Constructed fresh per process
/// start, never persisted.
#[derive(Clone, Debug, Default)]
pub struct KeyResolutionConfig {
    /// Inline hex key; always wins over the encrypted file when both are set,
    /// so operators can override a file-based key from the environment.
    pub raw_private_key_hex: Option<SecretString>,
    pub encrypted_key_path: Option<PathBuf>,
    pub key_password: Option<SecretString>,
}

/// Seals a 32-byte hex private key under `password` and returns the
/// pretty-printed JSON record bytes.
pub fn encrypt_private_key(private_key_hex: &str, password: &str) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Err(Error::validation("password must not be empty"));
    }

    let trimmed = private_key_hex.trim().trim_start_matches("0x");
    let key_bytes = Zeroizing::new(
        hex::decode(trimmed)
            .map_err(|e| Error::validation(format!("private key is not valid hex: {e}")))?,
    );
    if key_bytes.len() != PRIVATE_KEY_LEN {
        return Err(Error::validation(format!(
            "private key must be exactly {PRIVATE_KEY_LEN} bytes, got {}",
            key_bytes.len()
        )));
    }

    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill(&mut salt);

    let aes_key = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(aes_key.as_slice())
        .map_err(|e| Error::cipher(format!("cipher construction failed: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, key_bytes.as_slice())
        .map_err(|e| Error::cipher(format!("encryption failed: {e}")))?;

    let record = EncryptedKeyRecord {
        version: KEY_FILE_VERSION,
        salt: BASE64.encode(salt),
        nonce: BASE64.encode(nonce),
        ciphertext: BASE64.encode(&ciphertext),
    };

    Ok(serde_json::to_vec_pretty(&record)?)
}

/// Opens a record produced by [`encrypt_private_key`] and returns the original
/// hex key.
///
/// An authentication failure is reported as the single undifferentiated
/// [`Error::DecryptionFailed`]; wrong-password and corrupted-file are not
/// distinguished.
pub fn decrypt_private_key(record_bytes: &[u8], password: &str) -> Result<SecretString> {
    if password.is_empty() {
        return Err(Error::validation("password must not be empty"));
    }

    let record: EncryptedKeyRecord = serde_json::from_slice(record_bytes)?;
    if record.version != KEY_FILE_VERSION {
        return Err(Error::UnsupportedKeyVersion(record.version));
    }

    let salt = decode_field("salt", &record.salt)?;
    let nonce = decode_field("nonce", &record.nonce)?;
    let ciphertext = decode_field("ciphertext", &record.ciphertext)?;

    if salt.len() != SALT_LEN {
        return Err(Error::validation(format!(
            "key file salt must decode to {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    if nonce.len() != NONCE_LEN {
        return Err(Error::validation(format!(
            "key file nonce must decode to {NONCE_LEN} bytes, got {}",
            nonce.len()
        )));
    }

    let aes_key = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(aes_key.as_slice())
        .map_err(|e| Error::cipher(format!("cipher construction failed: {e}")))?;

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
            .map_err(|_| Error::DecryptionFailed)?,
    );

    Ok(SecretString::from(hex::encode(plaintext.as_slice())))
}

/// Resolves the private key for this process.
///
/// Precedence: (1) inline hex, validated and returned without touching the
/// file; (2) the encrypted key file, read once and decrypted with the
/// configured password; (3) a terminal [`Error::NoKeySource`].
pub fn resolve_private_key(config: &KeyResolutionConfig) -> Result<SecretString> {
    if let Some(raw) = &config.raw_private_key_hex {
        let trimmed = raw.expose_secret().trim().trim_start_matches("0x");
        let _decoded: Zeroizing<Vec<u8>> = Zeroizing::new(
            hex::decode(trimmed)
                .map_err(|e| Error::validation(format!("raw private key is not valid hex: {e}")))?,
        );
        debug!("resolved private key from inline value");
        return Ok(raw.clone());
    }

    if let Some(path) = &config.encrypted_key_path {
        let password = config
            .key_password
            .as_ref()
            .ok_or_else(|| Error::validation("a key password is required to decrypt the key file"))?;
        // Single synchronous read; a missing or unreadable file is a terminal
        // configuration error, not something to retry.
        let record_bytes = std::fs::read(path)?;
        debug!(path = %path.display(), "resolving private key from encrypted key file");
        return decrypt_private_key(&record_bytes, password.expose_secret());
    }

    Err(Error::NoKeySource)
}

fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    let mut key = Zeroizing::new([0u8; 32]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(
        password.as_bytes(),
        salt,
        PBKDF2_ITERATIONS,
        key.as_mut_slice(),
    )
    .map_err(|e| Error::cipher(format!("key derivation failed: {e}")))?;
    Ok(key)
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(value)
        .map_err(|e| Error::validation(format!("key file field `{field}` is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;

    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn round_trip_returns_original_hex() {
        let record = encrypt_private_key(TEST_KEY, "pw").unwrap();
        let decrypted = decrypt_private_key(&record, "pw").unwrap();
        assert_eq!(decrypted.expose_secret(), TEST_KEY);
    }

    #[test]
    fn round_trip_is_prefix_agnostic() {
        let record = encrypt_private_key(&format!("0x{TEST_KEY}"), "pw").unwrap();
        let decrypted = decrypt_private_key(&record, "pw").unwrap();
        assert_eq!(decrypted.expose_secret(), TEST_KEY);
    }

    #[test]
    fn wrong_password_is_a_generic_decryption_failure() {
        let record = encrypt_private_key(TEST_KEY, "pw1").unwrap();
        let err = decrypt_private_key(&record, "pw2").unwrap_err();
        assert!(matches!(err, Error::DecryptionFailed));
        assert_eq!(err.to_string(), "decryption failed");
    }

    #[test]
    fn tampered_ciphertext_is_the_same_generic_failure() {
        let record = encrypt_private_key(TEST_KEY, "pw").unwrap();
        let mut parsed: EncryptedKeyRecord = serde_json::from_slice(&record).unwrap();
        let mut raw = BASE64.decode(&parsed.ciphertext).unwrap();
        raw[0] ^= 0xff;
        parsed.ciphertext = BASE64.encode(&raw);
        let tampered = serde_json::to_vec_pretty(&parsed).unwrap();

        let err = decrypt_private_key(&tampered, "pw").unwrap_err();
        assert!(matches!(err, Error::DecryptionFailed));
    }

    #[test]
    fn empty_password_is_rejected_on_both_sides() {
        assert!(encrypt_private_key(TEST_KEY, "").is_err());
        let record = encrypt_private_key(TEST_KEY, "pw").unwrap();
        assert!(decrypt_private_key(&record, "").is_err());
    }

    #[test]
    fn wrong_length_keys_are_rejected() {
        // 31 and 33 bytes.
        let short = &TEST_KEY[..62];
        let long = format!("{TEST_KEY}ff");
        assert!(encrypt_private_key(short, "pw").is_err());
        assert!(encrypt_private_key(&long, "pw").is_err());
        assert!(encrypt_private_key("zz", "pw").is_err());
    }

    #[test]
    fn unknown_record_version_is_refused() {
        let record = encrypt_private_key(TEST_KEY, "pw").unwrap();
        let mut parsed: EncryptedKeyRecord = serde_json::from_slice(&record).unwrap();
        parsed.version = 2;
        let bumped = serde_json::to_vec_pretty(&parsed).unwrap();

        let err = decrypt_private_key(&bumped, "pw").unwrap_err();
        assert!(matches!(err, Error::UnsupportedKeyVersion(2)));
    }

    #[test]
    fn record_shape_matches_the_published_schema() {
        let record = encrypt_private_key(TEST_KEY, "pw").unwrap();
        let parsed: EncryptedKeyRecord = serde_json::from_slice(&record).unwrap();

        assert_eq!(parsed.version, KEY_FILE_VERSION);
        assert_eq!(BASE64.decode(&parsed.salt).unwrap().len(), SALT_LEN);
        assert_eq!(BASE64.decode(&parsed.nonce).unwrap().len(), NONCE_LEN);
        // 32 sealed bytes plus the 16-byte GCM tag.
        assert_eq!(BASE64.decode(&parsed.ciphertext).unwrap().len(), 48);
    }

    #[test]
    fn fresh_salt_and_nonce_per_encryption() {
        let first = encrypt_private_key(TEST_KEY, "pw").unwrap();
        let second = encrypt_private_key(TEST_KEY, "pw").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn inline_key_wins_over_encrypted_file() {
        // The configured path does not exist; precedence means it is never read.
        let config = KeyResolutionConfig {
            raw_private_key_hex: Some(SecretString::from(format!("0x{TEST_KEY}"))),
            encrypted_key_path: Some(PathBuf::from("/nonexistent/key.json")),
            key_password: Some(SecretString::from("pw")),
        };

        let resolved = resolve_private_key(&config).unwrap();
        assert_eq!(resolved.expose_secret(), format!("0x{TEST_KEY}"));
    }

    #[test]
    fn invalid_inline_key_is_rejected() {
        let config = KeyResolutionConfig {
            raw_private_key_hex: Some(SecretString::from("0xnot-hex")),
            ..KeyResolutionConfig::default()
        };
        assert!(resolve_private_key(&config).is_err());
    }

    #[test]
    fn resolves_from_encrypted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.json");
        std::fs::write(&path, encrypt_private_key(TEST_KEY, "pw").unwrap()).unwrap();

        let config = KeyResolutionConfig {
            raw_private_key_hex: None,
            encrypted_key_path: Some(path),
            key_password: Some(SecretString::from("pw")),
        };

        let resolved = resolve_private_key(&config).unwrap();
        assert_eq!(resolved.expose_secret(), TEST_KEY);
    }

    #[test]
    fn missing_password_for_file_source_is_a_validation_error() {
        let config = KeyResolutionConfig {
            raw_private_key_hex: None,
            encrypted_key_path: Some(PathBuf::from("/nonexistent/key.json")),
            key_password: None,
        };
        let err = resolve_private_key(&config).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn empty_config_has_no_key_source() {
        let err = resolve_private_key(&KeyResolutionConfig::default()).unwrap_err();
        assert!(matches!(err, Error::NoKeySource));
    }

    #[test]
    fn resolved_key_feeds_the_signer() {
        let config = KeyResolutionConfig {
            raw_private_key_hex: Some(SecretString::from(TEST_KEY)),
            ..KeyResolutionConfig::default()
        };
        let resolved = resolve_private_key(&config).unwrap();

        let signer = crate::signer::TypedDataSigner::new(resolved.expose_secret(), 137).unwrap();
        assert_eq!(
            signer.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn end_to_end_scenario() {
        // Key 0x00..01, password "correct horse".
        let key = format!("{:0>64}", "1");
        let blob = encrypt_private_key(&key, "correct horse").unwrap();

        let parsed: EncryptedKeyRecord = serde_json::from_slice(&blob).unwrap();
        assert_eq!(parsed.version, 1);

        let decrypted = decrypt_private_key(&blob, "correct horse").unwrap();
        assert_eq!(decrypted.expose_secret(), key);

        let err = decrypt_private_key(&blob, "wrong").unwrap_err();
        assert!(matches!(err, Error::DecryptionFailed));
    }
}
