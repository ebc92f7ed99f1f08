//! Input-proportional gas metering.

use tracing::trace;

use crate::{
    codec::abi,
    constants::gas::{PER_AFFILIATE, PER_COIN, PER_MEMO_BYTE, PER_ROUTE},
    json,
    message::BridgeRequest,
    registry::AbiRegistry,
};

/// The counted dimensions of a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasUsage {
    /// Number of swap hops.
    pub routes: usize,
    /// Number of coins across every coin argument; a single coin counts as one.
    pub coins: usize,
    /// Number of affiliates.
    pub affiliates: usize,
    /// Length of the IBC memo in bytes.
    pub memo_bytes: usize,
}

impl GasUsage {
    /// Prices the usage on top of `base`. Saturates instead of overflowing.
    pub fn price(&self, base: u64) -> u64 {
        let per = |count: usize, cost: u64| (count as u64).saturating_mul(cost);
        base.saturating_add(per(self.routes, PER_ROUTE))
            .saturating_add(per(self.coins, PER_COIN))
            .saturating_add(per(self.affiliates, PER_AFFILIATE))
            .saturating_add(per(self.memo_bytes, PER_MEMO_BYTE))
    }
}

impl BridgeRequest {
    /// Counts the dimensions priced by the meter.
    pub fn gas_usage(&self) -> GasUsage {
        match self {
            Self::JoinPool(msg) => GasUsage { coins: msg.token_in_maxs.len(), ..Default::default() },
            Self::ExitPool(msg) => GasUsage { coins: msg.token_out_mins.len(), ..Default::default() },
            Self::SwapExactAmountIn(msg) => GasUsage {
                routes: msg.routes.len(),
                coins: 1,
                affiliates: msg.affiliates.len(),
                memo_bytes: 0,
            },
            Self::SwapExactAmountInWithIbcTransfer(msg) => GasUsage {
                routes: msg.routes.len(),
                coins: 1,
                affiliates: msg.affiliates.len(),
                memo_bytes: msg.ibc_info.memo.len(),
            },
            Self::CalcJoinPoolNoSwapShares(query) | Self::CalcJoinPoolShares(query) => {
                GasUsage { coins: query.tokens_in.len(), ..Default::default() }
            }
            Self::GetPool(_) |
            Self::GetPools(_) |
            Self::GetPoolType(_) |
            Self::GetPoolParams(_) |
            Self::GetTotalShares(_) |
            Self::GetTotalLiquidity |
            Self::CalcExitPoolCoinsFromShares(_) => GasUsage::default(),
        }
    }
}

/// Prices calldata.
///
/// Returns 0 for calldata shorter than a selector or carrying an unknown selector; the dispatcher
/// rejects both. Arguments that fail to decode are priced at the base of the method.
pub fn required_gas(registry: &AbiRegistry, input: &[u8]) -> u64 {
    let Some((selector, args)) = input.split_first_chunk::<4>() else { return 0 };
    let Some(descriptor) = registry.resolve(selector) else { return 0 };

    let method = descriptor.method;
    let decoded = if method.is_json() {
        json::decode_request(descriptor, args)
    } else {
        abi::decode_request(descriptor, args)
    };
    match decoded {
        Ok(request) => request.gas_usage().price(method.base_gas()),
        Err(err) => {
            trace!(target: "amm_bridge::gas", %method, %err, "pricing at base gas");
            method.base_gas()
        }
    }
}
