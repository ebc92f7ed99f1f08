//! Constants for the AMM bridge precompile.
//!
//! It groups the constants by concern as sub-modules. The gas constants are part of the public
//! interface: clients budget calls ahead with them, so their values and order must stay stable.

use alloy_primitives::{address, Address};

/// The address of the AMM bridge precompile.
pub const AMM_BRIDGE_ADDRESS: Address = address!("0x0000000000000000000000000000000000001002");

/// The value of the `module` attribute attached to every emitted event.
pub const MODULE_NAME: &str = "gamm";

/// The human-readable part of the bech32 addresses of the host chain.
pub const DEFAULT_BECH32_PREFIX: &str = "bb";

/// Gas schedule of the precompile.
///
/// The price of a call is `base + PER_ROUTE·|routes| + PER_COIN·|coins| +
/// PER_AFFILIATE·|affiliates| + PER_MEMO_BYTE·|memo|`.
pub mod gas {
    /// Base cost of `joinPool`.
    pub const JOIN_POOL: u64 = 60_000;
    /// Base cost of `exitPool`.
    pub const EXIT_POOL: u64 = 60_000;
    /// Base cost of `swapExactAmountIn`.
    pub const SWAP_EXACT_AMOUNT_IN: u64 = 50_000;
    /// Base cost of `swapExactAmountInWithIBCTransfer`.
    pub const SWAP_EXACT_AMOUNT_IN_WITH_IBC_TRANSFER: u64 = 90_000;

    /// Base cost of `getPool`.
    pub const GET_POOL: u64 = 3_000;
    /// Base cost of `getPools`.
    pub const GET_POOLS: u64 = 5_000;
    /// Base cost of `getPoolType`.
    pub const GET_POOL_TYPE: u64 = 1_000;
    /// Base cost of `getPoolParams`.
    pub const GET_POOL_PARAMS: u64 = 2_000;
    /// Base cost of `getTotalShares`.
    pub const GET_TOTAL_SHARES: u64 = 2_000;
    /// Base cost of `getTotalLiquidity`.
    pub const GET_TOTAL_LIQUIDITY: u64 = 5_000;
    /// Base cost of `calcJoinPoolNoSwapShares`.
    pub const CALC_JOIN_POOL_NO_SWAP_SHARES: u64 = 4_000;
    /// Base cost of `calcExitPoolCoinsFromShares`.
    pub const CALC_EXIT_POOL_COINS_FROM_SHARES: u64 = 4_000;
    /// Base cost of `calcJoinPoolShares`.
    pub const CALC_JOIN_POOL_SHARES: u64 = 5_000;

    /// Cost per swap route hop.
    pub const PER_ROUTE: u64 = 10_000;
    /// Cost per coin in any coin list or single coin argument.
    pub const PER_COIN: u64 = 2_000;
    /// Cost per affiliate entry.
    pub const PER_AFFILIATE: u64 = 2_500;
    /// Cost per byte of IBC memo.
    pub const PER_MEMO_BYTE: u64 = 16;
}

/// Collection and value bounds. These are integrity constraints of the interface, not
/// configuration.
pub mod bounds {
    use alloy_primitives::U256;

    /// Maximum number of hops in a swap.
    pub const MAX_ROUTES: usize = 10;
    /// Maximum number of coins in a coin list.
    pub const MAX_COINS: usize = 20;
    /// Maximum number of affiliates of a swap.
    pub const MAX_AFFILIATES: usize = 10;
    /// Maximum length in bytes of any string argument.
    pub const MAX_STRING_LENGTH: usize = 10_000;
    /// Maximum length in bytes of an IBC memo.
    pub const MAX_MEMO_LENGTH: usize = 256;
    /// Maximum page size of `getPools`.
    pub const MAX_PAGINATION_LIMIT: u64 = 1_000;
    /// Maximum affiliate fee, i.e. 100%.
    pub const MAX_BASIS_POINTS: u64 = 10_000;
    /// Maximum length in bytes of the sanitized detail of an error.
    pub const MAX_ERROR_DETAIL_LENGTH: usize = 500;

    /// Largest amount accepted by the bridge, `2^255 - 1`, i.e. the maximum of a signed 256-bit
    /// integer.
    pub const MAX_AMOUNT: U256 = U256::from_limbs([u64::MAX, u64::MAX, u64::MAX, i64::MAX as u64]);
}
