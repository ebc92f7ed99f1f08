//! Chain-native bech32 addresses derived from EVM addresses.

use alloy_primitives::Address;
use bech32::{Bech32, Hrp};

/// Error raised while converting between EVM and bech32 addresses.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Bech32Error {
    /// The human-readable part is not valid.
    #[error("invalid bech32 prefix {prefix:?}: {reason}")]
    InvalidPrefix {
        /// The rejected prefix.
        prefix: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The address could not be encoded.
    #[error("bech32 encoding failed: {0}")]
    Encode(String),
    /// The string is not a valid bech32 address.
    #[error("bech32 decoding failed: {0}")]
    Decode(String),
    /// The payload is not 20 bytes long.
    #[error("expected a 20-byte payload, got {0} bytes")]
    InvalidLength(usize),
}

/// Encodes the 20 address bytes under `prefix`.
pub fn encode_address(prefix: &str, address: Address) -> Result<String, Bech32Error> {
    let hrp = Hrp::parse(prefix).map_err(|err| Bech32Error::InvalidPrefix {
        prefix: prefix.to_string(),
        reason: err.to_string(),
    })?;
    bech32::encode::<Bech32>(hrp, address.as_slice())
        .map_err(|err| Bech32Error::Encode(err.to_string()))
}

/// Decodes a bech32 address into its prefix and the 20 address bytes.
pub fn decode_address(encoded: &str) -> Result<(String, Address), Bech32Error> {
    let (hrp, data) = bech32::decode(encoded).map_err(|err| Bech32Error::Decode(err.to_string()))?;
    if data.len() != Address::len_bytes() {
        return Err(Bech32Error::InvalidLength(data.len()));
    }
    Ok((hrp.to_string(), Address::from_slice(&data)))
}
