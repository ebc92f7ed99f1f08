//! The bridge running as a revm precompile.

use alloy_evm::{precompiles::PrecompileInput, EvmInternals};
use alloy_primitives::{address, keccak256, Address, U256};
use alloy_sol_types::SolCall;
use amm_bridge::{
    constants::AMM_BRIDGE_ADDRESS,
    test_utils::{calldata, sender, MemoryEngine, ALICE},
    AmmBridgePrecompile, Amount, Coin,
};
use amm_bridge_contracts::IAmmBridge;
use revm::{
    context::{
        journal::{Journal, JournalInner},
        BlockEnv,
    },
    database::{CacheDB, EmptyDB},
    precompile::{PrecompileError, PrecompileResult},
    primitives::hardfork::SpecId,
};

const TIMESTAMP: u64 = 1_700_000_000;
const GAS_LIMIT: u64 = 1_000_000;
const ROUTER: Address = address!("0x4444444444444444444444444444444444444444");

/// One EVM frame calling into the precompile.
struct Frame {
    caller: Address,
    target: Address,
    is_static: bool,
    gas: u64,
}

impl Default for Frame {
    fn default() -> Self {
        Self { caller: ALICE, target: AMM_BRIDGE_ADDRESS, is_static: false, gas: GAS_LIMIT }
    }
}

struct Harness {
    precompile: AmmBridgePrecompile<MemoryEngine>,
    journal: Journal<CacheDB<EmptyDB>>,
    block_env: BlockEnv,
}

impl Harness {
    fn new(engine: MemoryEngine) -> Self {
        let mut journal = Journal::new_with_inner(CacheDB::default(), JournalInner::new());
        journal.inner.set_spec_id(SpecId::PRAGUE);
        Self {
            precompile: AmmBridgePrecompile::with_engine(engine),
            journal,
            block_env: BlockEnv { timestamp: U256::from(TIMESTAMP), ..Default::default() },
        }
    }

    fn funded() -> Self {
        Self::new(MemoryEngine::default().funded(
            sender(ALICE).bech32(),
            &[Coin::new("uatom", 1_000_000u64)],
        ))
    }

    fn call(&mut self, frame: Frame, data: &[u8]) -> PrecompileResult {
        let input = PrecompileInput {
            data,
            gas: frame.gas,
            caller: frame.caller,
            value: U256::ZERO,
            target_address: frame.target,
            bytecode_address: AMM_BRIDGE_ADDRESS,
            internals: EvmInternals::new(&mut self.journal, &self.block_env),
        };
        self.precompile.call(input, frame.is_static)
    }
}

fn swap() -> Vec<u8> {
    calldata::swap_exact_amount_in(&[(1, "uosmo")], ("uatom", 100_000), 1, &[]).to_vec()
}

#[test]
fn test_swap_emits_logs_from_precompile_address() {
    let mut harness = Harness::funded();
    let output = harness.call(Frame::default(), &swap()).unwrap();

    assert_eq!(output.gas_used, 62_000);
    let amount = IAmmBridge::swapExactAmountInCall::abi_decode_returns(&output.bytes).unwrap();
    assert_eq!(amount, U256::from(99_699));

    let logs = &harness.journal.inner.logs;
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|log| log.address == AMM_BRIDGE_ADDRESS));
    assert_eq!(logs[0].topics(), [keccak256("swap_exact_in")]);
    assert_eq!(logs[1].topics(), [keccak256("metrics")]);

    let engine = harness.precompile.engine().lock();
    assert_eq!(engine.balance(sender(ALICE).bech32(), "uosmo"), Amount::from_u64(99_699));
}

#[test]
fn test_delegatecall_is_rejected() {
    let mut harness = Harness::funded();
    let frame = Frame { target: ROUTER, ..Default::default() };
    let err = harness.call(frame, &swap()).unwrap_err();
    assert!(err.to_string().contains("[code=6]: delegatecall not allowed"), "{err}");
    assert!(harness.precompile.engine().lock().calls().is_empty());
    assert!(harness.journal.inner.logs.is_empty());
}

#[test]
fn test_static_call_allows_queries_only() {
    let mut harness = Harness::funded();

    let err = harness.call(Frame { is_static: true, ..Default::default() }, &swap()).unwrap_err();
    assert!(err.to_string().contains("write protection"), "{err}");

    let output = harness
        .call(Frame { is_static: true, ..Default::default() }, &calldata::get_total_shares(1))
        .unwrap();
    assert_eq!(output.gas_used, 2_000);
}

#[test]
fn test_gas_is_checked_before_execution() {
    let mut harness = Harness::funded();
    let result = harness.call(Frame { gas: 61_999, ..Default::default() }, &swap());
    assert_eq!(result, Err(PrecompileError::OutOfGas));
    assert!(harness.precompile.engine().lock().calls().is_empty());
}

#[test]
fn test_ibc_timeout_is_checked_against_block_time() {
    let mut harness = Harness::funded();
    let input = |timeout| {
        calldata::swap_exact_amount_in_with_ibc_transfer(
            &[(1, "uosmo")],
            ("uatom", 1_000),
            1,
            calldata::ibc_info("channel-0", "cosmos1receiver", "", timeout),
            &[],
        )
    };

    let err = harness.call(Frame::default(), &input(TIMESTAMP)).unwrap_err();
    assert!(err.to_string().contains("[code=1]"), "{err}");
    harness.call(Frame::default(), &input(TIMESTAMP + 1)).unwrap();
}

#[test]
fn test_sender_comes_from_the_frame() {
    let mut harness = Harness::new(MemoryEngine::default());
    let caller = address!("0x5555555555555555555555555555555555555555");
    let err = harness.call(Frame { caller, ..Default::default() }, &swap()).unwrap_err();
    assert!(err.to_string().contains("insufficient funds"), "{err}");

    let calls = harness.precompile.engine().lock().calls();
    let expected = sender(caller);
    assert_eq!(calls[0].sender.as_deref(), Some(expected.bech32()));
}
