//! Engine messages built from decoded calldata, and the engine's replies.
//!
//! Transaction messages carry no sender: the verified [`Sender`](crate::Sender) is passed to the
//! engine next to the message, so nothing decoded from calldata or a JSON payload can name it.

use serde::{Deserialize, Serialize};

use crate::{
    registry::Method,
    types::{lenient_u64, Affiliate, Amount, Coin, IbcTransferInfo, Pagination, PoolInfo, PoolParams, SwapRoute},
};

/// Join a pool for an exact number of shares, paying at most `token_in_maxs`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgJoinPool {
    /// Pool to join.
    #[serde(with = "lenient_u64")]
    pub pool_id: u64,
    /// Shares to mint.
    pub share_out_amount: Amount,
    /// Upper bound on every reserve token paid in.
    pub token_in_maxs: Vec<Coin>,
}

/// Burn shares of a pool, receiving at least `token_out_mins`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgExitPool {
    /// Pool to exit.
    #[serde(with = "lenient_u64")]
    pub pool_id: u64,
    /// Shares to burn.
    pub share_in_amount: Amount,
    /// Lower bound on every reserve token paid out. Empty and zero entries are allowed.
    #[serde(default)]
    pub token_out_mins: Vec<Coin>,
}

/// Swap an exact input along a route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSwapExactAmountIn {
    /// Hops of the swap.
    pub routes: Vec<SwapRoute>,
    /// Input paid by the sender.
    pub token_in: Coin,
    /// Minimum output of the last hop.
    pub token_out_min_amount: Amount,
    /// Fee recipients.
    #[serde(default)]
    pub affiliates: Vec<Affiliate>,
}

/// Swap an exact input along a route and send the output over IBC.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSwapExactAmountInWithIbcTransfer {
    /// Hops of the swap.
    pub routes: Vec<SwapRoute>,
    /// Input paid by the sender.
    pub token_in: Coin,
    /// Minimum output of the last hop.
    pub token_out_min_amount: Amount,
    /// Transfer of the output.
    pub ibc_info: IbcTransferInfo,
    /// Fee recipients.
    #[serde(default)]
    pub affiliates: Vec<Affiliate>,
}

/// Query addressing a single pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPool {
    /// Pool queried.
    #[serde(with = "lenient_u64")]
    pub pool_id: u64,
}

/// Query pricing a join with the given tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCalcJoinPool {
    /// Pool queried.
    #[serde(with = "lenient_u64")]
    pub pool_id: u64,
    /// Tokens offered.
    pub tokens_in: Vec<Coin>,
}

/// Query pricing an exit of the given shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCalcExitPool {
    /// Pool queried.
    #[serde(with = "lenient_u64")]
    pub pool_id: u64,
    /// Shares burned.
    pub share_in_amount: Amount,
}

/// Reply to a join.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPoolResponse {
    /// Shares minted.
    pub share_out_amount: Amount,
    /// Tokens actually paid in.
    pub token_in: Vec<Coin>,
}

/// Reply to an exit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitPoolResponse {
    /// Tokens paid out. May be empty on success.
    pub token_out: Vec<Coin>,
}

/// Reply to a swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResponse {
    /// Output of the last hop.
    pub token_out_amount: Amount,
}

/// Reply to both join pricing queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcJoinPoolResponse {
    /// Shares a join would mint.
    pub share_out_amount: Amount,
    /// Tokens a join would consume.
    pub tokens_out: Vec<Coin>,
}

/// A decoded call, one variant per operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "method", content = "args", rename_all = "camelCase")]
pub enum BridgeRequest {
    /// `joinPool`
    JoinPool(MsgJoinPool),
    /// `exitPool`
    ExitPool(MsgExitPool),
    /// `swapExactAmountIn`
    SwapExactAmountIn(MsgSwapExactAmountIn),
    /// `swapExactAmountInWithIBCTransfer`
    #[serde(rename = "swapExactAmountInWithIBCTransfer")]
    SwapExactAmountInWithIbcTransfer(MsgSwapExactAmountInWithIbcTransfer),
    /// `getPool`
    GetPool(QueryPool),
    /// `getPools`
    GetPools(Pagination),
    /// `getPoolType`
    GetPoolType(QueryPool),
    /// `getPoolParams`
    GetPoolParams(QueryPool),
    /// `getTotalShares`
    GetTotalShares(QueryPool),
    /// `getTotalLiquidity`
    GetTotalLiquidity,
    /// `calcJoinPoolNoSwapShares`
    CalcJoinPoolNoSwapShares(QueryCalcJoinPool),
    /// `calcExitPoolCoinsFromShares`
    CalcExitPoolCoinsFromShares(QueryCalcExitPool),
    /// `calcJoinPoolShares`
    CalcJoinPoolShares(QueryCalcJoinPool),
}

impl BridgeRequest {
    /// Returns the ABI method carrying this request.
    pub const fn method(&self) -> Method {
        match self {
            Self::JoinPool(_) => Method::JoinPool,
            Self::ExitPool(_) => Method::ExitPool,
            Self::SwapExactAmountIn(_) => Method::SwapExactAmountIn,
            Self::SwapExactAmountInWithIbcTransfer(_) => Method::SwapExactAmountInWithIbcTransfer,
            Self::GetPool(_) => Method::GetPool,
            Self::GetPools(_) => Method::GetPools,
            Self::GetPoolType(_) => Method::GetPoolType,
            Self::GetPoolParams(_) => Method::GetPoolParams,
            Self::GetTotalShares(_) => Method::GetTotalShares,
            Self::GetTotalLiquidity => Method::GetTotalLiquidity,
            Self::CalcJoinPoolNoSwapShares(_) => Method::CalcJoinPoolNoSwapShares,
            Self::CalcExitPoolCoinsFromShares(_) => Method::CalcExitPoolCoinsFromShares,
            Self::CalcJoinPoolShares(_) => Method::CalcJoinPoolShares,
        }
    }

    /// Returns `true` if the request mutates engine state.
    pub const fn is_transaction(&self) -> bool {
        self.method().is_transaction()
    }
}

/// An engine reply, one variant per reply shape.
///
/// The JSON form is the bare inner value, which is what the `*Json` methods return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BridgeResponse {
    /// Reply to `joinPool`.
    JoinPool(JoinPoolResponse),
    /// Reply to `exitPool`.
    ExitPool(ExitPoolResponse),
    /// Reply to both swap methods.
    Swap(SwapResponse),
    /// Reply to `getPool`.
    Pool(PoolInfo),
    /// Reply to `getPools`.
    Pools(Vec<PoolInfo>),
    /// Reply to `getPoolType`.
    PoolType(String),
    /// Reply to `getPoolParams`.
    PoolParams(PoolParams),
    /// Reply to `getTotalShares`.
    TotalShares(Coin),
    /// Reply to `getTotalLiquidity`.
    TotalLiquidity(Vec<Coin>),
    /// Reply to `calcJoinPoolNoSwapShares` and `calcJoinPoolShares`.
    CalcJoinPool(CalcJoinPoolResponse),
    /// Reply to `calcExitPoolCoinsFromShares`.
    CalcExitPool(Vec<Coin>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_payload_shape() {
        let msg: MsgJoinPool = serde_json::from_str(
            r#"{"pool_id":1,"share_out_amount":"1000000","token_in_maxs":[{"denom":"uatom","amount":"5"}]}"#,
        )
        .unwrap();
        assert_eq!(msg.pool_id, 1);
        assert_eq!(msg.share_out_amount, Amount::from_u64(1_000_000));
        assert_eq!(msg.token_in_maxs, vec![Coin::new("uatom", 5u64)]);
    }

    #[test]
    fn test_exit_mins_default_to_empty() {
        let msg: MsgExitPool =
            serde_json::from_str(r#"{"pool_id":"3","share_in_amount":"10"}"#).unwrap();
        assert!(msg.token_out_mins.is_empty());
    }

    #[test]
    fn test_request_serializes_with_method_tag() {
        let request = BridgeRequest::GetPool(QueryPool { pool_id: 9 });
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["method"], "getPool");
        assert_eq!(json["args"]["pool_id"], 9);

        let json = serde_json::to_value(BridgeRequest::GetTotalLiquidity).unwrap();
        assert_eq!(json["method"], "getTotalLiquidity");
    }

    #[test]
    fn test_response_serializes_bare() {
        let response = BridgeResponse::Swap(SwapResponse { token_out_amount: 7u64.into() });
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"token_out_amount":"7"}"#);
    }
}
