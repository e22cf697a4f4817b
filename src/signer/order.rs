//! The 12-field CTF Exchange order record and its EIP-712 struct hash.

use std::str::FromStr;

use alloy::primitives::{Address, B256, U256, keccak256};
use alloy::sol_types::SolValue as _;

use crate::error::{Error, Result};
use crate::signer::domain::ORDER_TYPE_HASH;

/// Order side, hashed as a `uint8`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn parse(value: &str) -> Result<Side> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "buy" => Ok(Side::Buy),
            "1" | "sell" => Ok(Side::Sell),
            other => Err(Error::validation(format!(
                "invalid side `{other}`; expected one of: buy|sell"
            ))),
        }
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Side::parse(s)
    }
}

/// Signature scheme the exchange uses to verify the order, hashed as a `uint8`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SignatureType {
    Eoa,
    Proxy,
    GnosisSafe,
}

impl SignatureType {
    pub fn parse(value: &str) -> Result<SignatureType> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "eoa" => Ok(SignatureType::Eoa),
            "1" | "proxy" => Ok(SignatureType::Proxy),
            "2" | "gnosis" | "gnosis_safe" | "gnosissafe" | "safe" => {
                Ok(SignatureType::GnosisSafe)
            }
            other => Err(Error::validation(format!(
                "invalid signature_type `{other}`; expected one of: eoa|proxy|gnosis"
            ))),
        }
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            SignatureType::Eoa => 0,
            SignatureType::Proxy => 1,
            SignatureType::GnosisSafe => 2,
        }
    }
}

impl FromStr for SignatureType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SignatureType::parse(s)
    }
}

/// One order exactly as it is hashed for the exchange contract.
///
/// Field order matches the declared `Order(...)` type string; it is part of
/// the wire contract and determines the struct-hash encoding. Addresses are
/// hex strings, numeric fields are decimal-string integers; both are parsed
/// at hash time and any malformed field is a hard error naming that field.
#[derive(Clone, Debug)]
pub struct OrderPayload {
    pub salt: String,
    pub maker: String,
    pub signer: String,
    pub taker: String,
    pub token_id: String,
    pub maker_amount: String,
    pub taker_amount: String,
    pub expiration: String,
    pub nonce: String,
    pub fee_rate_bps: String,
    pub side: Side,
    pub signature_type: SignatureType,
}

impl OrderPayload {
    /// `keccak256(typeHash ‖ encode(field_1) ‖ … ‖ encode(field_12))` with
    /// every field as a 32-byte big-endian word.
    pub(crate) fn struct_hash(&self) -> Result<B256> {
        let salt = uint_field("salt", &self.salt)?;
        let maker = address_field("maker", &self.maker)?;
        let signer = address_field("signer", &self.signer)?;
        let taker = address_field("taker", &self.taker)?;
        let token_id = uint_field("tokenId", &self.token_id)?;
        let maker_amount = uint_field("makerAmount", &self.maker_amount)?;
        let taker_amount = uint_field("takerAmount", &self.taker_amount)?;
        let expiration = uint_field("expiration", &self.expiration)?;
        let nonce = uint_field("nonce", &self.nonce)?;
        let fee_rate_bps = uint_field("feeRateBps", &self.fee_rate_bps)?;

        let encoded = (
            *ORDER_TYPE_HASH,
            salt,
            maker,
            signer,
            taker,
            token_id,
            maker_amount,
            taker_amount,
            expiration,
            nonce,
            fee_rate_bps,
            U256::from(self.side.as_u8()),
            U256::from(self.signature_type.as_u8()),
        )
            .abi_encode_packed();

        Ok(keccak256(&encoded))
    }
}

/// Decimal-string integer to a 32-byte word. A value that does not parse, or
/// does not fit 256 bits, is rejected outright; never substituted with zero.
pub(crate) fn uint_field(field: &'static str, value: &str) -> Result<U256> {
    U256::from_str_radix(value.trim(), 10).map_err(|e| {
        Error::validation(format!("order field `{field}` is not a valid integer: {e}"))
    })
}

/// Hex address to a 32-byte word, left-zero-padded from 20 bytes.
pub(crate) fn address_field(field: &'static str, value: &str) -> Result<B256> {
    let address = Address::from_str(value.trim()).map_err(|e| {
        Error::validation(format!("order field `{field}` is not a valid address: {e}"))
    })?;
    Ok(B256::left_padding_from(address.as_slice()))
}
