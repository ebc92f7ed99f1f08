//! The AMM engine the bridge forwards decoded calls to.
//!
//! The engine owns pool math, share accounting and token bookkeeping. The bridge only guarantees
//! that every message it forwards is validated and that transactions carry the verified sender.

use auto_impl::auto_impl;

use crate::{
    message::{
        CalcJoinPoolResponse, ExitPoolResponse, JoinPoolResponse, MsgExitPool, MsgJoinPool,
        MsgSwapExactAmountIn, MsgSwapExactAmountInWithIbcTransfer, SwapResponse,
    },
    types::{Amount, Coin, Pagination, PoolInfo, PoolParams, Sender},
};

/// Failure reported by the engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// No pool with this id exists.
    #[error("pool {0} not found")]
    PoolNotFound(u64),
    /// A denomination is not part of the pool.
    #[error("denom {0} not found in pool")]
    DenomNotFound(String),
    /// The sender cannot cover the operation.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    /// The result is below the requested minimum or above the requested maximum.
    #[error("slippage exceeded: {0}")]
    SlippageExceeded(String),
    /// The engine rejected an argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The engine rejected the sender.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The IBC transfer following a swap failed.
    #[error("ibc transfer failed: {0}")]
    IbcTransfer(String),
    /// Any other engine failure.
    #[error("{0}")]
    Other(String),
}

/// Operations of the AMM engine used by the bridge.
///
/// Transactions take the verified [`Sender`]; queries are read-only.
#[auto_impl(&mut, Box)]
pub trait AmmEngine {
    /// Joins a pool for an exact number of shares.
    fn join_pool(
        &mut self,
        sender: &Sender,
        msg: &MsgJoinPool,
    ) -> Result<JoinPoolResponse, EngineError>;

    /// Exits a pool. A successful exit may pay out nothing.
    fn exit_pool(
        &mut self,
        sender: &Sender,
        msg: &MsgExitPool,
    ) -> Result<ExitPoolResponse, EngineError>;

    /// Swaps an exact input along the routes.
    fn swap_exact_amount_in(
        &mut self,
        sender: &Sender,
        msg: &MsgSwapExactAmountIn,
    ) -> Result<SwapResponse, EngineError>;

    /// Swaps an exact input and transfers the output over IBC.
    fn swap_exact_amount_in_with_ibc_transfer(
        &mut self,
        sender: &Sender,
        msg: &MsgSwapExactAmountInWithIbcTransfer,
    ) -> Result<SwapResponse, EngineError>;

    /// Returns a pool snapshot.
    fn pool(&self, pool_id: u64) -> Result<PoolInfo, EngineError>;

    /// Returns a page of pool snapshots ordered by id.
    fn pools(&self, pagination: &Pagination) -> Result<Vec<PoolInfo>, EngineError>;

    /// Returns the type name of a pool.
    fn pool_type(&self, pool_id: u64) -> Result<String, EngineError>;

    /// Returns the fee parameters of a pool.
    fn pool_params(&self, pool_id: u64) -> Result<PoolParams, EngineError>;

    /// Returns the outstanding shares of a pool.
    fn total_shares(&self, pool_id: u64) -> Result<Coin, EngineError>;

    /// Returns the reserves of all pools, summed per denomination.
    fn total_liquidity(&self) -> Result<Vec<Coin>, EngineError>;

    /// Prices a join that uses the tokens in their pool ratio without swapping.
    fn calc_join_pool_no_swap_shares(
        &self,
        pool_id: u64,
        tokens_in: &[Coin],
    ) -> Result<CalcJoinPoolResponse, EngineError>;

    /// Prices an exit of `share_in_amount` shares.
    fn calc_exit_pool_coins_from_shares(
        &self,
        pool_id: u64,
        share_in_amount: Amount,
    ) -> Result<Vec<Coin>, EngineError>;

    /// Prices a join with arbitrary tokens, swapping as needed.
    fn calc_join_pool_shares(
        &self,
        pool_id: u64,
        tokens_in: &[Coin],
    ) -> Result<CalcJoinPoolResponse, EngineError>;
}
