//! Error codes and error text surfaced to EVM callers.

use alloy_primitives::U256;
use alloy_sol_types::SolError;
use amm_bridge::{
    test_utils::{calldata, sender, MemoryEngine, MemoryHost, ALICE, DEFAULT_TIMESTAMP},
    AmmBridge, BridgeError, Coin, EngineError, ErrorCode, EventKind, Method,
};
use amm_bridge_contracts::IAmmBridge;

fn call(engine: &mut MemoryEngine, input: &[u8]) -> Result<MemoryHost, BridgeError> {
    let mut host = MemoryHost::new(ALICE);
    AmmBridge::default().call(&mut host, engine, input, false).map(|_| host)
}

fn call_err(engine: &mut MemoryEngine, input: &[u8]) -> BridgeError {
    call(engine, input).unwrap_err()
}

#[test]
fn test_missing_pool_maps_to_pool_not_found() {
    let mut engine = MemoryEngine::default();
    let err = call_err(&mut engine, &calldata::join_pool(7, U256::from(1), &[("uatom", 1)]));
    assert_eq!(err.code(), ErrorCode::PoolNotFound);
    assert_eq!(err.message(), "join pool failed");
    assert_eq!(err.detail(), Some("pool 7 not found"));
    assert_eq!(err.to_string(), "precompile error [code=2]: join pool failed: pool 7 not found");

    let err = call_err(&mut engine, &calldata::get_pool(7));
    assert_eq!(err.code(), ErrorCode::PoolNotFound);
}

#[test]
fn test_engine_failures_keep_the_operation_code() {
    let mut engine = MemoryEngine::default();

    let swap = calldata::swap_exact_amount_in(&[(1, "uosmo")], ("uatom", 100), 1, &[]);
    let err = call_err(&mut engine, &swap);
    assert_eq!(err.code(), ErrorCode::SwapFailed);
    assert_eq!(err.message(), "swap failed");
    assert!(err.detail().unwrap().starts_with("insufficient funds"));

    let join = calldata::join_pool(1, U256::from(1_000_000_000_000u64), &[("uatom", 1), ("uosmo", 1)]);
    engine.fail_next(EngineError::SlippageExceeded("token in above max".into()));
    assert_eq!(call_err(&mut engine, &join).code(), ErrorCode::JoinFailed);

    engine.fail_next(EngineError::Other("ledger unavailable".into()));
    let err = call_err(&mut engine, &calldata::exit_pool(1, U256::from(1), &[]));
    assert_eq!(err.code(), ErrorCode::ExitFailed);
    assert_eq!(err.to_string(), "precompile error [code=8]: exit pool failed: ledger unavailable");

    engine.fail_next(EngineError::Other("store closed".into()));
    let err = call_err(&mut engine, &calldata::get_total_liquidity());
    assert_eq!(err.code(), ErrorCode::QueryFailed);
    assert_eq!(err.message(), "query failed");
}

#[test]
fn test_specific_engine_errors_override_the_operation_code() {
    let mut engine = MemoryEngine::default();

    engine.fail_next(EngineError::InvalidArgument("bad denom".into()));
    let err = call_err(&mut engine, &calldata::get_pool_type(1));
    assert_eq!(err.code(), ErrorCode::InvalidInput);

    engine.fail_next(EngineError::Unauthorized("account frozen".into()));
    let swap = calldata::swap_exact_amount_in(&[(1, "uosmo")], ("uatom", 100), 1, &[]);
    assert_eq!(call_err(&mut engine, &swap).code(), ErrorCode::Unauthorized);
}

#[test]
fn test_unknown_ibc_channel() {
    let mut engine = MemoryEngine::default().funded(
        sender(ALICE).bech32(),
        &[Coin::new("uatom", 1_000u64)],
    );
    let info = calldata::ibc_info("transfer-0", "cosmos1receiver", "", DEFAULT_TIMESTAMP + 1);
    let input = calldata::swap_exact_amount_in_with_ibc_transfer(
        &[(1, "uosmo")],
        ("uatom", 1_000),
        1,
        info,
        &[],
    );
    let err = call_err(&mut engine, &input);
    assert_eq!(err.code(), ErrorCode::IbcFailed);
    assert_eq!(err.message(), "swap with IBC transfer failed");
    assert!(engine.ibc_transfers().is_empty());
}

#[test]
fn test_malformed_calldata() {
    let mut engine = MemoryEngine::default();

    let err = call_err(&mut engine, &[0x12, 0x34]);
    assert_eq!(err.code(), ErrorCode::InvalidInput);
    assert_eq!(err.to_string(), "precompile error [code=1]: calldata too short: 2 bytes");

    let err = call_err(&mut engine, &[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(err.to_string(), "precompile error [code=1]: unknown method: 0xdeadbeef");

    // valid selector, truncated arguments
    let input = calldata::get_pool(1);
    let err = call_err(&mut engine, &input[..20]);
    assert_eq!(err.code(), ErrorCode::InvalidInput);

    let err = call_err(&mut engine, &calldata::json(Method::GetPoolsJson, "[1,2]"));
    assert_eq!(err.code(), ErrorCode::InvalidInput);
    assert_eq!(err.message(), "JSON payload must be an object");
    assert!(engine.calls().is_empty());
}

#[test]
fn test_failed_call_still_emits_metrics() {
    let bridge = AmmBridge::default();
    let mut host = MemoryHost::new(ALICE);
    let mut engine = MemoryEngine::default();

    bridge.call(&mut host, &mut engine, &calldata::get_pool(9), false).unwrap_err();
    let [metrics] = host.events.as_slice() else { panic!("expected metrics only") };
    assert_eq!(metrics.kind, EventKind::Metrics);
    assert_eq!(metrics.attribute("method"), Some("getPool"));
    assert_eq!(metrics.attribute("success"), Some("false"));
    assert_eq!(metrics.attribute("gas_used"), Some("3000"));
}

#[test]
fn test_unresolved_call_emits_nothing() {
    let bridge = AmmBridge::default();
    let mut host = MemoryHost::new(ALICE);
    bridge.call(&mut host, &mut MemoryEngine::default(), &[0; 3], false).unwrap_err();
    assert!(host.events.is_empty());
}

#[test]
fn test_revert_payload() {
    let err = call_err(&mut MemoryEngine::default(), &calldata::get_pool_type(0));
    let revert = IAmmBridge::PrecompileError::abi_decode(&err.abi_encode_revert()).unwrap();
    assert_eq!(revert.code, ErrorCode::InvalidInput.as_u8());
    assert_eq!(revert.message, err.to_string());
}

#[test]
fn test_engine_paths_are_scrubbed_from_details() {
    let mut engine = MemoryEngine::default();
    engine.fail_next(EngineError::Other(
        "panicked at /home/builder/src/keeper/pool.rs:42 in gamm::keeper::pool::get".into(),
    ));
    let err = call_err(&mut engine, &calldata::get_pool_type(1));
    let detail = err.detail().unwrap();
    assert!(!detail.contains("/home/builder"), "{detail}");
    assert!(!detail.contains("gamm::keeper::pool"), "{detail}");
}

#[test]
fn test_oversized_details_are_truncated() {
    let mut engine = MemoryEngine::default();
    engine.fail_next(EngineError::Other("x".repeat(2_000)));
    let err = call_err(&mut engine, &calldata::get_pool_type(1));
    assert!(err.detail().unwrap().len() < 600);
    assert!(err.detail().unwrap().ends_with(amm_bridge::TRUNCATION_MARKER));
}
