//! Calldata builders over the `IAmmBridge` bindings.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use amm_bridge_contracts::IAmmBridge;

use crate::registry::{self, Method};

/// Builds a Solidity `Coin`.
pub fn coin(denom: &str, amount: u64) -> IAmmBridge::Coin {
    IAmmBridge::Coin { denom: denom.into(), amount: U256::from(amount) }
}

/// Builds a Solidity `Coin[]`.
pub fn coins(entries: &[(&str, u64)]) -> Vec<IAmmBridge::Coin> {
    entries.iter().map(|(denom, amount)| coin(denom, *amount)).collect()
}

/// Builds Solidity swap routes.
pub fn routes(hops: &[(u64, &str)]) -> Vec<IAmmBridge::SwapAmountInRoute> {
    hops.iter()
        .map(|(pool_id, denom)| IAmmBridge::SwapAmountInRoute {
            poolId: *pool_id,
            tokenOutDenom: (*denom).into(),
        })
        .collect()
}

/// Builds Solidity affiliates.
pub fn affiliates(entries: &[(Address, u64)]) -> Vec<IAmmBridge::Affiliate> {
    entries
        .iter()
        .map(|(addr, fee)| IAmmBridge::Affiliate { addr: *addr, basisPointsFee: U256::from(*fee) })
        .collect()
}

/// Builds a Solidity IBC transfer.
pub fn ibc_info(channel: &str, receiver: &str, memo: &str, timeout: u64) -> IAmmBridge::IBCTransferInfo {
    IAmmBridge::IBCTransferInfo {
        sourceChannel: channel.into(),
        receiver: receiver.into(),
        memo: memo.into(),
        timeoutTimestamp: timeout,
    }
}

/// `joinPool` calldata.
pub fn join_pool(pool_id: u64, share_out: U256, token_in_maxs: &[(&str, u64)]) -> Bytes {
    IAmmBridge::joinPoolCall { poolId: pool_id, shareOutAmount: share_out, tokenInMaxs: coins(token_in_maxs) }
        .abi_encode()
        .into()
}

/// `exitPool` calldata.
pub fn exit_pool(pool_id: u64, share_in: U256, token_out_mins: &[(&str, u64)]) -> Bytes {
    IAmmBridge::exitPoolCall { poolId: pool_id, shareInAmount: share_in, tokenOutMins: coins(token_out_mins) }
        .abi_encode()
        .into()
}

/// `swapExactAmountIn` calldata.
pub fn swap_exact_amount_in(
    hops: &[(u64, &str)],
    token_in: (&str, u64),
    token_out_min: u64,
    fees: &[(Address, u64)],
) -> Bytes {
    IAmmBridge::swapExactAmountInCall {
        routes: routes(hops),
        tokenIn: coin(token_in.0, token_in.1),
        tokenOutMinAmount: U256::from(token_out_min),
        affiliates: affiliates(fees),
    }
    .abi_encode()
    .into()
}

/// `swapExactAmountInWithIBCTransfer` calldata.
pub fn swap_exact_amount_in_with_ibc_transfer(
    hops: &[(u64, &str)],
    token_in: (&str, u64),
    token_out_min: u64,
    info: IAmmBridge::IBCTransferInfo,
    fees: &[(Address, u64)],
) -> Bytes {
    IAmmBridge::swapExactAmountInWithIBCTransferCall {
        routes: routes(hops),
        tokenIn: coin(token_in.0, token_in.1),
        tokenOutMinAmount: U256::from(token_out_min),
        ibcInfo: info,
        affiliates: affiliates(fees),
    }
    .abi_encode()
    .into()
}

/// `getPool` calldata.
pub fn get_pool(pool_id: u64) -> Bytes {
    IAmmBridge::getPoolCall { poolId: pool_id }.abi_encode().into()
}

/// `getPools` calldata.
pub fn get_pools(offset: u64, limit: u64) -> Bytes {
    IAmmBridge::getPoolsCall { offset, limit }.abi_encode().into()
}

/// `getPoolType` calldata.
pub fn get_pool_type(pool_id: u64) -> Bytes {
    IAmmBridge::getPoolTypeCall { poolId: pool_id }.abi_encode().into()
}

/// `getPoolParams` calldata.
pub fn get_pool_params(pool_id: u64) -> Bytes {
    IAmmBridge::getPoolParamsCall { poolId: pool_id }.abi_encode().into()
}

/// `getTotalShares` calldata.
pub fn get_total_shares(pool_id: u64) -> Bytes {
    IAmmBridge::getTotalSharesCall { poolId: pool_id }.abi_encode().into()
}

/// `getTotalLiquidity` calldata.
pub fn get_total_liquidity() -> Bytes {
    IAmmBridge::getTotalLiquidityCall {}.abi_encode().into()
}

/// `calcJoinPoolNoSwapShares` calldata.
pub fn calc_join_pool_no_swap_shares(pool_id: u64, tokens_in: &[(&str, u64)]) -> Bytes {
    IAmmBridge::calcJoinPoolNoSwapSharesCall { poolId: pool_id, tokensIn: coins(tokens_in) }
        .abi_encode()
        .into()
}

/// `calcExitPoolCoinsFromShares` calldata.
pub fn calc_exit_pool_coins_from_shares(pool_id: u64, share_in: U256) -> Bytes {
    IAmmBridge::calcExitPoolCoinsFromSharesCall { poolId: pool_id, shareInAmount: share_in }
        .abi_encode()
        .into()
}

/// `calcJoinPoolShares` calldata.
pub fn calc_join_pool_shares(pool_id: u64, tokens_in: &[(&str, u64)]) -> Bytes {
    IAmmBridge::calcJoinPoolSharesCall { poolId: pool_id, tokensIn: coins(tokens_in) }
        .abi_encode()
        .into()
}

/// Calldata of a `*Json` method carrying `payload`.
pub fn json(method: Method, payload: &str) -> Bytes {
    assert!(method.is_json(), "{method} takes ABI arguments");
    let registry = registry::global().as_ref().unwrap();
    let mut calldata = registry.descriptor(method).selector().to_vec();
    calldata.extend(alloy_sol_types::SolValue::abi_encode_params(&(payload.to_string(),)));
    calldata.into()
}
