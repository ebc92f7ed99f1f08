//! Read-only queries, in both ABI and JSON form.

use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use amm_bridge::{
    codec::opaque,
    test_utils::{calldata, MemoryEngine, MemoryPool, MemoryHost, ALICE},
    AmmBridge, Amount, Coin, ErrorCode, Method,
};
use amm_bridge_contracts::IAmmBridge;
use serde_json::{json, Value};

fn query(engine: &mut MemoryEngine, input: &[u8]) -> Vec<u8> {
    let mut host = MemoryHost::new(ALICE);
    let output = AmmBridge::default().call(&mut host, engine, input, true).unwrap();
    // queries only report metrics
    assert_eq!(host.events.len(), 1);
    output.to_vec()
}

fn query_json(engine: &mut MemoryEngine, method: Method, payload: &str) -> Value {
    let output = query(engine, &calldata::json(method, payload));
    let response = IAmmBridge::getPoolJsonCall::abi_decode_returns(&output).unwrap();
    serde_json::from_str(&response).unwrap()
}

#[test]
fn test_get_pool() {
    let mut engine = MemoryEngine::default();
    let output = query(&mut engine, &calldata::get_pool(1));
    let bytes = IAmmBridge::getPoolCall::abi_decode_returns(&output).unwrap();
    let pool = opaque::decode_pool(&bytes).unwrap();

    assert_eq!(pool.id, 1);
    assert_eq!(pool.pool_type, "balancer");
    assert_eq!(pool.total_shares.denom, "gamm/pool/1");
    let denoms: Vec<_> = pool.assets.iter().map(|asset| asset.token.denom.as_str()).collect();
    assert_eq!(denoms, ["uatom", "uosmo"]);
    assert_eq!(pool.params, engine.memory_pool(1).unwrap().params);
}

#[test]
fn test_get_pools_pages_in_id_order() {
    let mut engine = MemoryEngine::default()
        .with_pool(3, MemoryPool::new(vec![Coin::new("uion", 5u64), Coin::new("uatom", 5u64)]));

    let output = query(&mut engine, &calldata::get_pools(1, 2));
    let bytes = IAmmBridge::getPoolsCall::abi_decode_returns(&output).unwrap();
    let ids: Vec<_> = opaque::decode_pools(&bytes).unwrap().iter().map(|pool| pool.id).collect();
    assert_eq!(ids, [2, 3]);

    let output = query(&mut engine, &calldata::get_pools(10, 5));
    let bytes = IAmmBridge::getPoolsCall::abi_decode_returns(&output).unwrap();
    assert!(opaque::decode_pools(&bytes).unwrap().is_empty());
}

#[test]
fn test_get_pools_limit_bounds() {
    let bridge = AmmBridge::default();
    let mut host = MemoryHost::new(ALICE);
    let mut engine = MemoryEngine::default();
    for (limit, message) in [(0, "limit cannot be zero"), (1_001, "limit exceeds maximum of 1000")] {
        let err =
            bridge.call(&mut host, &mut engine, &calldata::get_pools(0, limit), true).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert!(err.message().contains(message), "{err}");
    }
    bridge.call(&mut host, &mut engine, &calldata::get_pools(0, 1_000), true).unwrap();
}

#[test]
fn test_pool_scalars() {
    let mut engine = MemoryEngine::default();

    let output = query(&mut engine, &calldata::get_pool_type(2));
    assert_eq!(IAmmBridge::getPoolTypeCall::abi_decode_returns(&output).unwrap(), "balancer");

    let output = query(&mut engine, &calldata::get_pool_params(2));
    let bytes = IAmmBridge::getPoolParamsCall::abi_decode_returns(&output).unwrap();
    let params = opaque::decode_pool_params(&bytes).unwrap();
    assert_eq!(params.swap_fee, Amount::from_u64(3_000_000_000_000_000));
    assert_eq!(params.exit_fee, Amount::ZERO);

    let output = query(&mut engine, &calldata::get_total_shares(2));
    let shares = IAmmBridge::getTotalSharesCall::abi_decode_returns(&output).unwrap();
    assert_eq!(shares, calldata::coin("gamm/pool/2", 1_000_000_000_000_000_000));
}

#[test]
fn test_total_liquidity_sums_across_pools() {
    let mut engine = MemoryEngine::default();
    let output = query(&mut engine, &calldata::get_total_liquidity());
    let liquidity = IAmmBridge::getTotalLiquidityCall::abi_decode_returns(&output).unwrap();
    assert_eq!(
        liquidity,
        calldata::coins(&[
            ("uatom", 1_000_000_000_000),
            ("uion", 1_000_000_000_000),
            ("uosmo", 2_000_000_000_000),
        ])
    );
}

#[test]
fn test_calc_queries() {
    let mut engine = MemoryEngine::default();

    let input = calldata::calc_join_pool_no_swap_shares(1, &[("uatom", 1_000_000), ("uosmo", 2_000_000)]);
    let output = query(&mut engine, &input);
    let reply = IAmmBridge::calcJoinPoolNoSwapSharesCall::abi_decode_returns(&output).unwrap();
    assert_eq!(reply.sharesOut, U256::from(1_000_000_000_000u64));
    assert_eq!(reply.tokensOut, calldata::coins(&[("uatom", 1_000_000), ("uosmo", 1_000_000)]));

    let input = calldata::calc_exit_pool_coins_from_shares(1, U256::from(2_000_000_000_000u64));
    let output = query(&mut engine, &input);
    let tokens = IAmmBridge::calcExitPoolCoinsFromSharesCall::abi_decode_returns(&output).unwrap();
    assert_eq!(tokens, calldata::coins(&[("uatom", 2_000_000), ("uosmo", 2_000_000)]));

    let output = query(&mut engine, &calldata::calc_join_pool_shares(1, &[("uatom", 1_000_000)]));
    let reply = IAmmBridge::calcJoinPoolSharesCall::abi_decode_returns(&output).unwrap();
    assert!(reply.shareOutAmount > U256::ZERO);
    assert!(reply.shareOutAmount < U256::from(1_000_000_000_000u64));

    // pricing never touches the pools
    assert_eq!(engine.memory_pool(1), MemoryEngine::default().memory_pool(1));
}

#[test]
fn test_calc_join_requires_tokens() {
    let bridge = AmmBridge::default();
    let mut host = MemoryHost::new(ALICE);
    let input = calldata::calc_join_pool_shares(1, &[]);
    let err = bridge.call(&mut host, &mut MemoryEngine::default(), &input, true).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);
    assert!(err.message().contains("tokensIn cannot be empty"), "{err}");
}

#[test]
fn test_json_queries() {
    let mut engine = MemoryEngine::default();

    let pool = query_json(&mut engine, Method::GetPoolJson, r#"{"pool_id":"2"}"#);
    assert_eq!(pool["id"], 2);
    assert_eq!(pool["pool_type"], "balancer");
    assert_eq!(pool["total_shares"], json!({"denom":"gamm/pool/2","amount":"1000000000000000000"}));

    let pools = query_json(&mut engine, Method::GetPoolsJson, r#"{"limit":1}"#);
    assert_eq!(pools.as_array().map(Vec::len), Some(1));
    assert_eq!(pools[0]["id"], 1);

    let exit = query_json(
        &mut engine,
        Method::CalcExitPoolCoinsFromSharesJson,
        r#"{"pool_id":1,"share_in_amount":"1000000000000"}"#,
    );
    assert_eq!(
        exit,
        json!([{"denom":"uatom","amount":"1000000"},{"denom":"uosmo","amount":"1000000"}])
    );

    let join = query_json(
        &mut engine,
        Method::CalcJoinPoolNoSwapSharesJson,
        r#"{"pool_id":1,"tokens_in":[{"denom":"uatom","amount":"10"},{"denom":"uosmo","amount":"10"}]}"#,
    );
    assert_eq!(join["share_out_amount"], "10000000");
}

#[test]
fn test_queries_run_without_a_sender() {
    let mut engine = MemoryEngine::default();
    query(&mut engine, &calldata::get_pool_type(1));
    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::GetPoolType);
    assert_eq!(calls[0].sender, None);
}
