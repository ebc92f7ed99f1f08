//! Selector dispatch of the bridge precompile.

use std::sync::Arc;

use alloy_primitives::{hex, Bytes};
use tracing::{debug, error, warn};

use crate::{
    codec::abi,
    config::BridgeConfig,
    engine::AmmEngine,
    events::Event,
    gas, handler,
    host::PrecompileHost,
    json,
    message::BridgeRequest,
    registry::{self, AbiRegistry, MethodDescriptor, RegistryError},
    BridgeError, ErrorCode,
};

/// The bridge precompile, independent of any EVM.
///
/// It is stateless across invocations: the only shared state is the immutable ABI registry.
#[derive(Clone, Debug)]
pub struct AmmBridge {
    config: BridgeConfig,
    registry: Result<Arc<AbiRegistry>, RegistryError>,
}

impl Default for AmmBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl AmmBridge {
    /// Creates a bridge backed by the process-wide registry.
    pub fn new(config: BridgeConfig) -> Self {
        Self { config, registry: registry::global().clone() }
    }

    /// Creates a bridge backed by the given registry load result.
    pub const fn with_registry(
        config: BridgeConfig,
        registry: Result<Arc<AbiRegistry>, RegistryError>,
    ) -> Self {
        Self { config, registry }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns the registry, or [`ErrorCode::Internal`] if it failed to load.
    pub fn registry(&self) -> Result<&AbiRegistry, BridgeError> {
        self.registry.as_deref().map_err(|err| {
            BridgeError::internal("ABI registry is not loaded").with_detail(err)
        })
    }

    /// Prices calldata. Returns 0 when the registry is not loaded.
    pub fn required_gas(&self, input: &[u8]) -> u64 {
        self.registry().map_or(0, |registry| gas::required_gas(registry, input))
    }

    /// Decodes calldata into a request without validating or executing it.
    pub fn decode(&self, input: &[u8]) -> Result<BridgeRequest, BridgeError> {
        let (descriptor, args) = self.resolve(input)?;
        if descriptor.method.is_json() {
            json::decode_request(descriptor, args)
        } else {
            abi::decode_request(descriptor, args)
        }
    }

    fn resolve<'a>(
        &'a self,
        input: &'a [u8],
    ) -> Result<(&'a MethodDescriptor, &'a [u8]), BridgeError> {
        let registry = self.registry()?;
        let Some((selector, args)) = input.split_first_chunk::<4>() else {
            return Err(BridgeError::invalid_input("calldata too short")
                .with_detail(format_args!("{} bytes", input.len())));
        };
        let descriptor = registry.resolve(selector).ok_or_else(|| {
            BridgeError::invalid_input("unknown method").with_detail(hex::encode_prefixed(selector))
        })?;
        Ok((descriptor, args))
    }

    /// Runs one invocation.
    ///
    /// `readonly` is set when the EVM frame forbids state changes; transaction methods are then
    /// rejected before anything is decoded. Every resolved call closes with a `metrics` event,
    /// whether it succeeded or not.
    pub fn call<H, E>(
        &self,
        host: &mut H,
        engine: &mut E,
        input: &[u8],
        readonly: bool,
    ) -> Result<Bytes, BridgeError>
    where
        H: PrecompileHost,
        E: AmmEngine,
    {
        let (descriptor, args) = self.resolve(input).inspect_err(|err| log_failure(None, err))?;
        let method = descriptor.method;
        if readonly && method.is_transaction() {
            let err = BridgeError::write_protection(method.name());
            log_failure(Some(descriptor), &err);
            return Err(err);
        }

        let gas_used = self.required_gas(input);
        let result = host
            .native_action(|host| handler::handle(&self.config, descriptor, host, engine, args));

        host.emit_event(Event::metrics(&self.config.module_name, method, result.is_ok(), gas_used));
        match &result {
            Ok(output) => {
                debug!(target: "amm_bridge::dispatch", %method, gas_used, output_len = output.len(), "call succeeded");
            }
            Err(err) => log_failure(Some(descriptor), err),
        }
        result
    }
}

fn log_failure(descriptor: Option<&MethodDescriptor>, err: &BridgeError) {
    let method = descriptor.map(|descriptor| descriptor.method.name()).unwrap_or("unresolved");
    match err.code() {
        ErrorCode::Internal => error!(target: "amm_bridge::dispatch", method, %err, "call failed"),
        ErrorCode::InvalidInput | ErrorCode::Unauthorized => {
            debug!(target: "amm_bridge::dispatch", method, %err, "call rejected")
        }
        _ => warn!(target: "amm_bridge::dispatch", method, %err, "engine call failed"),
    }
}
