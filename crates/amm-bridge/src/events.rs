//! Structured events emitted by the precompile.
//!
//! Every event carries string attributes only: amounts are decimal, coin lists use the
//! `100uatom,200uosmo` form and route lists the `[1:uosmo,2:uatom]` form. Attribute names are
//! part of the public interface.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{keccak256, Address, Log};

use crate::{
    message::{ExitPoolResponse, JoinPoolResponse},
    registry::Method,
    types::{format_coins, format_routes, Amount, Coin, IbcTransferInfo, Sender, SwapRoute},
};

/// The type of an event.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, derive_more::Display)]
pub enum EventKind {
    /// A pool was joined.
    #[display("join_pool")]
    JoinPool,
    /// A pool was exited.
    #[display("exit_pool")]
    ExitPool,
    /// An exact-input swap was executed.
    #[display("swap_exact_in")]
    SwapExactIn,
    /// An exact-input swap was executed and its output sent over IBC.
    #[display("swap_exact_in_ibc")]
    SwapExactInIbc,
    /// An invocation completed, successfully or not.
    #[display("metrics")]
    Metrics,
}

/// An attribute-keyed event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// The type of the event.
    pub kind: EventKind,
    /// The attributes, in emission order.
    pub attributes: Vec<(String, String)>,
}

impl Event {
    fn new(kind: EventKind, module: &str) -> Self {
        Self { kind, attributes: vec![("module".to_string(), module.to_string())] }
    }

    fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    /// Returns the value of an attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// The `join_pool` event.
    pub fn join_pool(
        module: &str,
        pool_id: u64,
        sender: &Sender,
        response: &JoinPoolResponse,
    ) -> Self {
        Self::new(EventKind::JoinPool, module)
            .with("pool_id", pool_id)
            .with("sender", sender)
            .with("share_out_amount", response.share_out_amount)
            .with("token_in", format_coins(&response.token_in))
    }

    /// The `exit_pool` event.
    pub fn exit_pool(
        module: &str,
        pool_id: u64,
        sender: &Sender,
        response: &ExitPoolResponse,
    ) -> Self {
        Self::new(EventKind::ExitPool, module)
            .with("pool_id", pool_id)
            .with("sender", sender)
            .with("token_out", format_coins(&response.token_out))
    }

    /// The `swap_exact_in` event.
    pub fn swap_exact_in(
        module: &str,
        sender: &Sender,
        routes: &[SwapRoute],
        token_in: &Coin,
        token_out_amount: Amount,
    ) -> Self {
        Self::new(EventKind::SwapExactIn, module)
            .with("sender", sender)
            .with("routes", format_routes(routes))
            .with("token_in", token_in)
            .with("token_out_amount", token_out_amount)
    }

    /// The `swap_exact_in_ibc` event.
    pub fn swap_exact_in_ibc(
        module: &str,
        sender: &Sender,
        ibc_info: &IbcTransferInfo,
        token_out_amount: Amount,
    ) -> Self {
        Self::new(EventKind::SwapExactInIbc, module)
            .with("sender", sender)
            .with("source_channel", &ibc_info.source_channel)
            .with("receiver", &ibc_info.receiver)
            .with("token_out_amount", token_out_amount)
    }

    /// The `metrics` event closing every invocation.
    pub fn metrics(module: &str, method: Method, success: bool, gas_used: u64) -> Self {
        Self::new(EventKind::Metrics, module)
            .with("method", method)
            .with("success", success)
            .with("gas_used", gas_used)
    }

    /// Encodes the event as an EVM log emitted by `address`.
    ///
    /// `topic0` is the keccak-256 hash of the event type, the data is the ABI encoding of the
    /// attributes as `(string,string)[]`.
    pub fn to_log(&self, address: Address) -> Log {
        let attributes = self
            .attributes
            .iter()
            .map(|(key, value)| {
                DynSolValue::Tuple(vec![
                    DynSolValue::String(key.clone()),
                    DynSolValue::String(value.clone()),
                ])
            })
            .collect();
        let data = DynSolValue::Array(attributes).abi_encode();
        Log::new_unchecked(address, vec![keccak256(self.kind.to_string())], data.into())
    }
}
