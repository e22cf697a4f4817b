//! EIP-712 typed-data signing for the CLOB authentication challenge and the
//! CTF Exchange order struct.
//!
//! A [`TypedDataSigner`] owns one secp256k1 key and one target chain. Both
//! domain separators are derived once at construction and never change, so
//! concurrent signing from multiple threads needs no locking.

pub mod domain;
mod order;

use std::str::FromStr as _;

use alloy::primitives::hex;
use alloy::primitives::{Address, B256, Signature, U256, keccak256};
use alloy::signers::SignerSync as _;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolValue as _;

pub use order::{OrderPayload, Side, SignatureType};

use crate::Timestamp;
use crate::error::{Error, Result};
use crate::signer::domain::{CLOB_AUTH_TYPE_HASH, Eip712Domain, typed_data_digest};

/// Signs EIP-712 messages for one key on one chain.
///
/// Produced signatures are 65 bytes (`r ‖ s ‖ v`) rendered as a `0x`-prefixed
/// 130-hex-character string, with `v` normalized to the {27, 28} convention
/// on-chain verifiers expect.
#[derive(Clone)]
pub struct TypedDataSigner {
    signer: PrivateKeySigner,
    address: Address,
    chain_id: u64,
    auth_separator: B256,
    order_separator: B256,
}

impl TypedDataSigner {
    /// Creates a signer from a hex private key (with or without a `0x`
    /// prefix) targeting `chain_id`.
    ///
    /// Both domain separators are precomputed here; the chain id is immutable
    /// for the life of the instance, so multi-chain operation uses one signer
    /// per chain.
    pub fn new(private_key_hex: &str, chain_id: u64) -> Result<Self> {
        let trimmed = private_key_hex.trim().trim_start_matches("0x");
        let signer = PrivateKeySigner::from_str(trimmed)
            .map_err(|e| Error::validation(format!("invalid private key: {e}")))?;
        let address = signer.address();

        Ok(Self {
            signer,
            address,
            chain_id,
            auth_separator: Eip712Domain::auth(chain_id).separator(),
            order_separator: Eip712Domain::order(chain_id).separator(),
        })
    }

    /// Address derived from the held key.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Signs the authentication challenge `(address, timestamp, nonce)` under
    /// the cached auth domain.
    pub fn sign_auth_message(
        &self,
        address: Address,
        timestamp: Timestamp,
        nonce: u64,
    ) -> Result<String> {
        let struct_hash = auth_struct_hash(address, timestamp, nonce)?;
        let digest = typed_data_digest(self.auth_separator, struct_hash);
        self.sign_digest(digest)
    }

    /// Signs a 12-field order under the order-signing domain.
    ///
    /// Every field is validated before any cryptographic operation runs; a
    /// malformed field fails the call with the field named.
    pub fn sign_order(&self, payload: &OrderPayload) -> Result<String> {
        let struct_hash = payload.struct_hash()?;
        let digest = typed_data_digest(self.order_separator, struct_hash);
        self.sign_digest(digest)
    }

    fn sign_digest(&self, digest: B256) -> Result<String> {
        let signature = self
            .signer
            .sign_hash_sync(&digest)
            .map_err(|e| Error::signing(e.to_string()))?;
        Ok(encode_signature(&signature))
    }
}

impl std::fmt::Debug for TypedDataSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Address and chain only; the key never reaches a formatter.
        f.debug_struct("TypedDataSigner")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Struct hash for the 3-field `ClobAuth` challenge.
fn auth_struct_hash(address: Address, timestamp: Timestamp, nonce: u64) -> Result<B256> {
    let timestamp = u64::try_from(timestamp).map_err(|_e| {
        Error::validation(format!("auth timestamp must be non-negative, got {timestamp}"))
    })?;

    let encoded = (
        *CLOB_AUTH_TYPE_HASH,
        B256::left_padding_from(address.as_slice()),
        U256::from(timestamp),
        U256::from(nonce),
    )
        .abi_encode_packed();

    Ok(keccak256(&encoded))
}

/// `0x` + r ‖ s ‖ v as hex. Signing libraries report the recovery id as
/// {0, 1}; verifiers expect {27, 28}, so 27 is added to the raw parity bit.
fn encode_signature(signature: &Signature) -> String {
    let mut raw = signature.as_bytes();
    if raw[64] < 27 {
        raw[64] += 27;
    }
    format!("0x{}", hex::encode(raw))
}
