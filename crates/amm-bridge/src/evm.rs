//! Integration of the bridge into revm.
//!
//! [`AmmBridgePrecompile`] adapts [`AmmBridge`] to [`PrecompileInput`]: the caller and block
//! timestamp are read from the EVM frame, the meter's price is charged against the frame's gas,
//! and events become EVM logs emitted from the precompile address.
//!
//! alloy-evm's [`PrecompilesMap`] does not pass the static flag of a frame to its precompiles, so
//! the bridge is served by [`BridgePrecompiles`], a [`PrecompileProvider`] that wraps the map and
//! reads [`CallInputs::is_static`] itself. [`PrecompileActivation`] tracks the two host steps
//! that make the precompile callable.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use alloy_evm::{
    precompiles::{PrecompileInput, PrecompilesMap},
    EvmInternals,
};
use alloy_primitives::{Address, Bytes};
use parking_lot::Mutex;
use revm::{
    context::{Block, Cfg, LocalContextTr, Transaction},
    handler::PrecompileProvider,
    interpreter::{CallInput, CallInputs, Gas, InstructionResult, InterpreterResult},
    precompile::{PrecompileError, PrecompileOutput, PrecompileResult},
    Context, Journal,
};
use tracing::{trace, warn};

use crate::{
    config::BridgeConfig, dispatch::AmmBridge, engine::AmmEngine, events::Event,
    host::PrecompileHost, BridgeError,
};

/// The bridge precompile bound to an engine.
#[derive(Debug)]
pub struct AmmBridgePrecompile<E> {
    bridge: Arc<AmmBridge>,
    engine: Arc<Mutex<E>>,
    enabled: Arc<AtomicBool>,
}

impl<E> Clone for AmmBridgePrecompile<E> {
    fn clone(&self) -> Self {
        Self {
            bridge: Arc::clone(&self.bridge),
            engine: Arc::clone(&self.engine),
            enabled: Arc::clone(&self.enabled),
        }
    }
}

impl<E: AmmEngine + Send + 'static> AmmBridgePrecompile<E> {
    /// Creates an enabled precompile.
    pub fn new(bridge: AmmBridge, engine: Arc<Mutex<E>>) -> Self {
        Self { bridge: Arc::new(bridge), engine, enabled: Arc::new(AtomicBool::new(true)) }
    }

    /// Creates an enabled precompile with the default configuration.
    pub fn with_engine(engine: E) -> Self {
        Self::new(AmmBridge::new(BridgeConfig::default()), Arc::new(Mutex::new(engine)))
    }

    /// The bridge run by the precompile.
    pub fn bridge(&self) -> &AmmBridge {
        &self.bridge
    }

    /// The engine shared with the host.
    pub fn engine(&self) -> &Arc<Mutex<E>> {
        &self.engine
    }

    fn with_enabled_flag(mut self, enabled: Arc<AtomicBool>) -> Self {
        self.enabled = enabled;
        self
    }

    /// Executes one EVM call of the precompile. `is_static` is set when the frame, or any frame
    /// above it, is a STATICCALL.
    pub fn call(&self, mut input: PrecompileInput<'_>, is_static: bool) -> PrecompileResult {
        if !self.enabled.load(Ordering::Acquire) {
            return Err(PrecompileError::other(
                BridgeError::internal("precompile is not enabled").to_string(),
            ));
        }

        // the caller of a DELEGATECALL frame is not the account whose assets would move
        if !input.is_direct_call() {
            warn!(
                target: "amm_bridge::evm",
                caller = %input.caller,
                target = %input.target_address,
                "DELEGATECALL into the bridge rejected"
            );
            return Err(PrecompileError::other(
                BridgeError::unauthorized("delegatecall not allowed").to_string(),
            ));
        }

        let gas_used = self.bridge.required_gas(input.data);
        if gas_used > input.gas {
            trace!(target: "amm_bridge::evm", gas_used, gas_limit = input.gas, "out of gas");
            return Err(PrecompileError::OutOfGas);
        }

        let data = input.data;
        let mut host = EvmHost { address: self.bridge.config().address, input: &mut input };
        let mut engine = self.engine.lock();
        self.bridge
            .call(&mut host, &mut *engine, data, is_static)
            .map(|output| PrecompileOutput::new(gas_used, output))
            .map_err(|err| PrecompileError::other(err.to_string()))
    }
}

/// [`PrecompileHost`] over an EVM frame.
struct EvmHost<'a, 'b> {
    address: Address,
    input: &'a mut PrecompileInput<'b>,
}

impl PrecompileHost for EvmHost<'_, '_> {
    fn caller(&self) -> Address {
        self.input.caller
    }

    fn block_timestamp(&self) -> u64 {
        self.input.internals().block_timestamp().saturating_to()
    }

    fn emit_event(&mut self, event: Event) {
        self.input.internals_mut().log(event.to_log(self.address));
    }
}

/// A [`PrecompilesMap`] with the bridge precompile installed next to it.
#[derive(Debug)]
pub struct BridgePrecompiles<E> {
    inner: PrecompilesMap,
    bridge: Option<(Address, AmmBridgePrecompile<E>)>,
}

impl<E> BridgePrecompiles<E> {
    /// Wraps `inner` without a bridge.
    pub const fn new(inner: PrecompilesMap) -> Self {
        Self { inner, bridge: None }
    }

    /// The wrapped precompiles.
    pub const fn inner(&self) -> &PrecompilesMap {
        &self.inner
    }

    /// The installed bridge and its address.
    pub fn bridge(&self) -> Option<(Address, &AmmBridgePrecompile<E>)> {
        self.bridge.as_ref().map(|(address, precompile)| (*address, precompile))
    }

    fn bridge_at(&self, address: &Address) -> Option<&AmmBridgePrecompile<E>> {
        self.bridge.as_ref().filter(|(bridge, _)| bridge == address).map(|(_, precompile)| precompile)
    }
}

impl<E, BLOCK, TX, CFG, DB, CHAIN> PrecompileProvider<Context<BLOCK, TX, CFG, DB, Journal<DB>, CHAIN>>
    for BridgePrecompiles<E>
where
    E: AmmEngine + Send + 'static,
    BLOCK: Block,
    TX: Transaction,
    CFG: Cfg,
    DB: alloy_evm::Database,
{
    type Output = InterpreterResult;

    fn set_spec(&mut self, spec: CFG::Spec) -> bool {
        PrecompileProvider::<Context<BLOCK, TX, CFG, DB, Journal<DB>, CHAIN>>::set_spec(
            &mut self.inner,
            spec,
        )
    }

    fn run(
        &mut self,
        context: &mut Context<BLOCK, TX, CFG, DB, Journal<DB>, CHAIN>,
        inputs: &CallInputs,
    ) -> Result<Option<InterpreterResult>, String> {
        let Some(bridge) = self.bridge_at(&inputs.bytecode_address) else {
            return PrecompileProvider::<Context<BLOCK, TX, CFG, DB, Journal<DB>, CHAIN>>::run(
                &mut self.inner,
                context,
                inputs,
            );
        };

        let mut result = InterpreterResult {
            result: InstructionResult::Return,
            gas: Gas::new(inputs.gas_limit),
            output: Bytes::new(),
        };

        let (local, journal) = (&context.local, &mut context.journaled_state);
        let shared;
        let data = match &inputs.input {
            CallInput::SharedBuffer(range) => {
                match local.shared_memory_buffer_slice(range.clone()) {
                    Some(slice) => {
                        shared = slice;
                        &*shared
                    }
                    None => &[],
                }
            }
            CallInput::Bytes(bytes) => bytes.as_ref(),
        };

        let input = PrecompileInput {
            data,
            gas: inputs.gas_limit,
            caller: inputs.caller,
            value: inputs.call_value(),
            internals: EvmInternals::new(journal, &context.block),
            target_address: inputs.target_address,
            bytecode_address: inputs.bytecode_address,
        };
        match bridge.call(input, inputs.is_static) {
            Ok(output) if result.gas.record_cost(output.gas_used) => result.output = output.bytes,
            Ok(_) => result.result = InstructionResult::PrecompileOOG,
            Err(PrecompileError::Fatal(err)) => return Err(err),
            Err(err) if err.is_oog() => result.result = InstructionResult::PrecompileOOG,
            Err(_) => result.result = InstructionResult::PrecompileError,
        }
        Ok(Some(result))
    }

    fn warm_addresses(&self) -> Box<impl Iterator<Item = Address>> {
        let bridge = self.bridge.as_ref().map(|(address, _)| *address);
        Box::new(self.inner.addresses().copied().chain(bridge))
    }

    fn contains(&self, address: &Address) -> bool {
        self.bridge_at(address).is_some()
            || PrecompileProvider::<Context<BLOCK, TX, CFG, DB, Journal<DB>, CHAIN>>::contains(
                &self.inner,
                address,
            )
    }
}

/// Error raised by the host registration steps.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActivationError {
    /// The precompile was already registered.
    #[error("bridge precompile already registered at {0}")]
    AlreadyRegistered(Address),
    /// Another precompile lives at the address.
    #[error("address {0} is occupied by another precompile")]
    AddressOccupied(Address),
    /// `enable` was called before `register`.
    #[error("bridge precompile at {0} must be registered before it is enabled")]
    NotRegistered(Address),
}

/// Registration state of the bridge precompile in a host.
///
/// A host first registers the precompile at its address, then enables it. Both steps are
/// required before a call succeeds.
#[derive(Debug)]
pub struct PrecompileActivation {
    address: Address,
    registered: bool,
    enabled: Arc<AtomicBool>,
}

impl PrecompileActivation {
    /// Creates the activation state for a precompile at `address`.
    pub fn new(address: Address) -> Self {
        Self { address, registered: false, enabled: Arc::new(AtomicBool::new(false)) }
    }

    /// Installs the precompile into `precompiles`, disabled.
    pub fn register<E: AmmEngine + Send + 'static>(
        &mut self,
        precompiles: &mut BridgePrecompiles<E>,
        precompile: AmmBridgePrecompile<E>,
    ) -> Result<(), ActivationError> {
        if self.registered || precompiles.bridge.is_some() {
            return Err(ActivationError::AlreadyRegistered(self.address));
        }
        if precompiles.inner.addresses().any(|address| *address == self.address) {
            return Err(ActivationError::AddressOccupied(self.address));
        }

        let precompile = precompile.with_enabled_flag(Arc::clone(&self.enabled));
        precompiles.bridge = Some((self.address, precompile));
        self.registered = true;
        trace!(target: "amm_bridge::evm", address = %self.address, "bridge precompile registered");
        Ok(())
    }

    /// Enables a registered precompile. Returns `false` if it was already enabled.
    pub fn enable(&mut self) -> Result<bool, ActivationError> {
        if !self.registered {
            return Err(ActivationError::NotRegistered(self.address));
        }
        Ok(!self.enabled.swap(true, Ordering::AcqRel))
    }

    /// Registers and enables the precompile in one step.
    pub fn install<E: AmmEngine + Send + 'static>(
        &mut self,
        precompiles: &mut BridgePrecompiles<E>,
        precompile: AmmBridgePrecompile<E>,
    ) -> Result<(), ActivationError> {
        self.register(precompiles, precompile)?;
        self.enable().map(|_| ())
    }

    /// Returns `true` once the precompile is both registered and enabled.
    pub fn is_active(&self) -> bool {
        self.registered && self.enabled.load(Ordering::Acquire)
    }
}
