//! Solidity interface of the AMM bridge precompile.
//!
//! This crate embeds the ABI schema the precompile loads at start-up, the static `IAmmBridge`
//! bindings callers use to build calldata, and the selector table generated at build time from
//! the schema.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use)]

pub use alloy_primitives;

/// The JSON ABI schema of the bridge precompile.
pub const ABI_JSON: &str = include_str!("../abi/IAmmBridge.json");

/// Selector constants, generated by the build script from [`ABI_JSON`].
pub mod selectors {
    use alloy_primitives::{b256, hex, B256};

    include!(concat!(env!("OUT_DIR"), "/selectors.rs"));
}

alloy_sol_types::sol! {
    /// Interface of the AMM bridge precompile.
    #[derive(Debug, PartialEq, Eq)]
    interface IAmmBridge {
        /// A denominated amount.
        struct Coin {
            string denom;
            uint256 amount;
        }

        /// One hop of a swap.
        struct SwapAmountInRoute {
            uint64 poolId;
            string tokenOutDenom;
        }

        /// A fee recipient taking a cut of the swap output.
        struct Affiliate {
            address addr;
            uint256 basisPointsFee;
        }

        /// Parameters of the IBC transfer following a swap.
        struct IBCTransferInfo {
            string sourceChannel;
            string receiver;
            string memo;
            uint64 timeoutTimestamp;
        }

        /// Revert payload carrying the stable error code.
        error PrecompileError(uint8 code, string message);

        function joinPool(uint64 poolId, uint256 shareOutAmount, Coin[] tokenInMaxs)
            external
            returns (uint256 shareOut, Coin[] tokenIn);

        function exitPool(uint64 poolId, uint256 shareInAmount, Coin[] tokenOutMins)
            external
            returns (Coin[] tokenOut);

        function swapExactAmountIn(
            SwapAmountInRoute[] routes,
            Coin tokenIn,
            uint256 tokenOutMinAmount,
            Affiliate[] affiliates
        ) external returns (uint256 tokenOutAmount);

        function swapExactAmountInWithIBCTransfer(
            SwapAmountInRoute[] routes,
            Coin tokenIn,
            uint256 tokenOutMinAmount,
            IBCTransferInfo ibcInfo,
            Affiliate[] affiliates
        ) external returns (uint256 tokenOutAmount);

        function getPool(uint64 poolId) external view returns (bytes pool);

        function getPools(uint64 offset, uint64 limit) external view returns (bytes pools);

        function getPoolType(uint64 poolId) external view returns (string poolType);

        function getPoolParams(uint64 poolId) external view returns (bytes params);

        function getTotalShares(uint64 poolId) external view returns (Coin totalShares);

        function getTotalLiquidity() external view returns (Coin[] liquidity);

        function calcJoinPoolNoSwapShares(uint64 poolId, Coin[] tokensIn)
            external
            view
            returns (uint256 sharesOut, Coin[] tokensOut);

        function calcExitPoolCoinsFromShares(uint64 poolId, uint256 shareInAmount)
            external
            view
            returns (Coin[] tokensOut);

        function calcJoinPoolShares(uint64 poolId, Coin[] tokensIn)
            external
            view
            returns (uint256 shareOutAmount, Coin[] tokensOut);

        function joinPoolJson(string payload) external returns (string response);

        function exitPoolJson(string payload) external returns (string response);

        function swapExactAmountInJson(string payload) external returns (string response);

        function swapExactAmountInWithIBCTransferJson(string payload)
            external
            returns (string response);

        function getPoolJson(string payload) external view returns (string response);

        function getPoolsJson(string payload) external view returns (string response);

        function calcJoinPoolNoSwapSharesJson(string payload) external view returns (string response);

        function calcExitPoolCoinsFromSharesJson(string payload)
            external
            view
            returns (string response);

        function calcJoinPoolSharesJson(string payload) external view returns (string response);
    }
}
