//! EIP-712 type hashes and domain separators for the CLOB signing flows.
//!
//! Neither flow binds a verifying contract: the domain is
//! `(name, version, chainId)` only, so the separator is a pure function of the
//! chain id and can be cached per signer instance.

use std::sync::LazyLock;

use alloy::primitives::{B256, U256, keccak256};
use alloy::sol_types::SolValue as _;

/// Domain name/version for the authentication-challenge flow.
pub const AUTH_DOMAIN_NAME: &str = "ClobAuthDomain";
pub const AUTH_DOMAIN_VERSION: &str = "1";

/// Domain name/version for the order-signing flow.
pub const ORDER_DOMAIN_NAME: &str = "Polymarket CTF Exchange";
pub const ORDER_DOMAIN_VERSION: &str = "1";

// The three type hashes are pure functions of fixed strings; computed once per
// process, never re-initialized.
pub(crate) static DOMAIN_TYPE_HASH: LazyLock<B256> = LazyLock::new(|| {
    keccak256(b"EIP712Domain(string name,string version,uint256 chainId)")
});

pub(crate) static CLOB_AUTH_TYPE_HASH: LazyLock<B256> = LazyLock::new(|| {
    keccak256(b"ClobAuth(address address,uint256 timestamp,uint256 nonce)")
});

pub(crate) static ORDER_TYPE_HASH: LazyLock<B256> = LazyLock::new(|| {
    keccak256(
        b"Order(uint256 salt,address maker,address signer,address taker,uint256 tokenId,uint256 makerAmount,uint256 takerAmount,uint256 expiration,uint256 nonce,uint256 feeRateBps,uint8 side,uint8 signatureType)",
    )
});

/// An EIP-712 domain over `(name, version, chainId)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Eip712Domain {
    pub name: &'static str,
    pub version: &'static str,
    pub chain_id: u64,
}

impl Eip712Domain {
    /// Domain for the authentication-challenge flow on `chain_id`.
    #[must_use]
    pub const fn auth(chain_id: u64) -> Self {
        Self {
            name: AUTH_DOMAIN_NAME,
            version: AUTH_DOMAIN_VERSION,
            chain_id,
        }
    }

    /// Domain for the order-signing flow on `chain_id`.
    #[must_use]
    pub const fn order(chain_id: u64) -> Self {
        Self {
            name: ORDER_DOMAIN_NAME,
            version: ORDER_DOMAIN_VERSION,
            chain_id,
        }
    }

    /// `keccak256(typeHash ‖ keccak256(name) ‖ keccak256(version) ‖ pad32(chainId))`.
    #[must_use]
    pub fn separator(&self) -> B256 {
        let name_hash = keccak256(self.name.as_bytes());
        let version_hash = keccak256(self.version.as_bytes());
        let encoded = (
            *DOMAIN_TYPE_HASH,
            name_hash,
            version_hash,
            U256::from(self.chain_id),
        )
            .abi_encode_packed();

        keccak256(&encoded)
    }
}

/// Final EIP-712 digest: `keccak256(0x19 0x01 ‖ domainSeparator ‖ structHash)`.
///
/// The two leading bytes go into the hashed buffer itself, ahead of the
/// separator; they are not part of either hash input.
pub(crate) fn typed_data_digest(domain_separator: B256, struct_hash: B256) -> B256 {
    let prefix = [0x19u8, 0x01];
    let data = (prefix, domain_separator, struct_hash).abi_encode_packed();
    keccak256(&data)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::hex;

    use super::*;

    #[test]
    fn type_hash_constants_match_declared_type_strings() {
        assert_eq!(
            hex::encode(*DOMAIN_TYPE_HASH),
            "c2f8787176b8ac6bf7215b4adcc1e069bf4ab82d9ab1df05a57a91d425935b6e"
        );
        assert_eq!(
            hex::encode(*CLOB_AUTH_TYPE_HASH),
            "e01f8d7361573666a2deee70d18ea786e5cde8aa643aaac68072f3efa686f11a"
        );
        assert_eq!(
            hex::encode(*ORDER_TYPE_HASH),
            "a852566c4e14d00869b6db0220888a9090a13eccdaea03713ff0a3d27bf9767c"
        );
    }

    #[test]
    fn polygon_separators_match_reference_vectors() {
        assert_eq!(
            hex::encode(Eip712Domain::auth(137).separator()),
            "cfc66be2a3b30464cb3b588324101f660c9a205fa76e8e5f83ee16a528e1c4cb"
        );
        assert_eq!(
            hex::encode(Eip712Domain::order(137).separator()),
            "aee1d7dd93bb10f6c6a59417017905bc5dbec7ddbd71475cd19d8a95845e632d"
        );
    }

    #[test]
    fn separator_depends_on_chain_id() {
        assert_ne!(
            Eip712Domain::auth(137).separator(),
            Eip712Domain::auth(80_002).separator()
        );
    }
}
