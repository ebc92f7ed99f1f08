//! Value codec between EVM encodings and domain types.

pub mod abi;
pub mod bech32;
pub mod opaque;
pub mod record;
