//! Test utilities for the AMM bridge precompile.

use alloy_primitives::{address, Address};

use crate::{constants::DEFAULT_BECH32_PREFIX, types::Sender};

pub mod calldata;

pub use crate::memory::*;

/// A funded test account.
pub const ALICE: Address = address!("0x1111111111111111111111111111111111111111");

/// A second test account.
pub const BOB: Address = address!("0x2222222222222222222222222222222222222222");

/// A third test account, usually an affiliate.
pub const CHARLIE: Address = address!("0x3333333333333333333333333333333333333333");

/// Returns the sender the bridge derives from `caller` with the default prefix.
pub fn sender(caller: Address) -> Sender {
    Sender::from_caller(caller, DEFAULT_BECH32_PREFIX).unwrap()
}
