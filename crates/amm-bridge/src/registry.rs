//! Method table of the precompile, loaded once from the embedded ABI schema.
//!
//! The registry is either loaded and usable for the lifetime of the process, or failed, in which
//! case every invocation of the precompile is rejected with
//! [`ErrorCode::Internal`](crate::ErrorCode::Internal). A failed load never aborts the host.

use std::sync::Arc;

use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{map::HashMap, Selector};
use amm_bridge_contracts::ABI_JSON;
use once_cell::race::OnceBox;
use tracing::error;

use crate::constants::gas;

/// Every method the precompile dispatches.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Method {
    /// `joinPool`
    JoinPool,
    /// `exitPool`
    ExitPool,
    /// `swapExactAmountIn`
    SwapExactAmountIn,
    /// `swapExactAmountInWithIBCTransfer`
    SwapExactAmountInWithIbcTransfer,
    /// `getPool`
    GetPool,
    /// `getPools`
    GetPools,
    /// `getPoolType`
    GetPoolType,
    /// `getPoolParams`
    GetPoolParams,
    /// `getTotalShares`
    GetTotalShares,
    /// `getTotalLiquidity`
    GetTotalLiquidity,
    /// `calcJoinPoolNoSwapShares`
    CalcJoinPoolNoSwapShares,
    /// `calcExitPoolCoinsFromShares`
    CalcExitPoolCoinsFromShares,
    /// `calcJoinPoolShares`
    CalcJoinPoolShares,
    /// `joinPoolJson`
    JoinPoolJson,
    /// `exitPoolJson`
    ExitPoolJson,
    /// `swapExactAmountInJson`
    SwapExactAmountInJson,
    /// `swapExactAmountInWithIBCTransferJson`
    SwapExactAmountInWithIbcTransferJson,
    /// `getPoolJson`
    GetPoolJson,
    /// `getPoolsJson`
    GetPoolsJson,
    /// `calcJoinPoolNoSwapSharesJson`
    CalcJoinPoolNoSwapSharesJson,
    /// `calcExitPoolCoinsFromSharesJson`
    CalcExitPoolCoinsFromSharesJson,
    /// `calcJoinPoolSharesJson`
    CalcJoinPoolSharesJson,
}

impl Method {
    /// All methods, in declaration order.
    pub const ALL: [Self; 22] = [
        Self::JoinPool,
        Self::ExitPool,
        Self::SwapExactAmountIn,
        Self::SwapExactAmountInWithIbcTransfer,
        Self::GetPool,
        Self::GetPools,
        Self::GetPoolType,
        Self::GetPoolParams,
        Self::GetTotalShares,
        Self::GetTotalLiquidity,
        Self::CalcJoinPoolNoSwapShares,
        Self::CalcExitPoolCoinsFromShares,
        Self::CalcJoinPoolShares,
        Self::JoinPoolJson,
        Self::ExitPoolJson,
        Self::SwapExactAmountInJson,
        Self::SwapExactAmountInWithIbcTransferJson,
        Self::GetPoolJson,
        Self::GetPoolsJson,
        Self::CalcJoinPoolNoSwapSharesJson,
        Self::CalcExitPoolCoinsFromSharesJson,
        Self::CalcJoinPoolSharesJson,
    ];

    /// The ABI name of the method.
    pub const fn name(self) -> &'static str {
        match self {
            Self::JoinPool => "joinPool",
            Self::ExitPool => "exitPool",
            Self::SwapExactAmountIn => "swapExactAmountIn",
            Self::SwapExactAmountInWithIbcTransfer => "swapExactAmountInWithIBCTransfer",
            Self::GetPool => "getPool",
            Self::GetPools => "getPools",
            Self::GetPoolType => "getPoolType",
            Self::GetPoolParams => "getPoolParams",
            Self::GetTotalShares => "getTotalShares",
            Self::GetTotalLiquidity => "getTotalLiquidity",
            Self::CalcJoinPoolNoSwapShares => "calcJoinPoolNoSwapShares",
            Self::CalcExitPoolCoinsFromShares => "calcExitPoolCoinsFromShares",
            Self::CalcJoinPoolShares => "calcJoinPoolShares",
            Self::JoinPoolJson => "joinPoolJson",
            Self::ExitPoolJson => "exitPoolJson",
            Self::SwapExactAmountInJson => "swapExactAmountInJson",
            Self::SwapExactAmountInWithIbcTransferJson => "swapExactAmountInWithIBCTransferJson",
            Self::GetPoolJson => "getPoolJson",
            Self::GetPoolsJson => "getPoolsJson",
            Self::CalcJoinPoolNoSwapSharesJson => "calcJoinPoolNoSwapSharesJson",
            Self::CalcExitPoolCoinsFromSharesJson => "calcExitPoolCoinsFromSharesJson",
            Self::CalcJoinPoolSharesJson => "calcJoinPoolSharesJson",
        }
    }

    /// Looks a method up by its ABI name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.name() == name)
    }

    /// The operation performed by the method: JSON methods map to their ABI counterpart.
    pub const fn operation(self) -> Self {
        match self {
            Self::JoinPoolJson => Self::JoinPool,
            Self::ExitPoolJson => Self::ExitPool,
            Self::SwapExactAmountInJson => Self::SwapExactAmountIn,
            Self::SwapExactAmountInWithIbcTransferJson => Self::SwapExactAmountInWithIbcTransfer,
            Self::GetPoolJson => Self::GetPool,
            Self::GetPoolsJson => Self::GetPools,
            Self::CalcJoinPoolNoSwapSharesJson => Self::CalcJoinPoolNoSwapShares,
            Self::CalcExitPoolCoinsFromSharesJson => Self::CalcExitPoolCoinsFromShares,
            Self::CalcJoinPoolSharesJson => Self::CalcJoinPoolShares,
            other => other,
        }
    }

    /// Returns `true` if the method takes a single JSON payload string.
    pub const fn is_json(self) -> bool {
        self.operation() as u8 != self as u8
    }

    /// Returns `true` if the method mutates engine state.
    pub const fn is_transaction(self) -> bool {
        matches!(
            self.operation(),
            Self::JoinPool |
                Self::ExitPool |
                Self::SwapExactAmountIn |
                Self::SwapExactAmountInWithIbcTransfer
        )
    }

    /// The base gas price of the method. JSON methods share the price of their operation.
    pub const fn base_gas(self) -> u64 {
        match self {
            Self::JoinPool | Self::JoinPoolJson => gas::JOIN_POOL,
            Self::ExitPool | Self::ExitPoolJson => gas::EXIT_POOL,
            Self::SwapExactAmountIn | Self::SwapExactAmountInJson => gas::SWAP_EXACT_AMOUNT_IN,
            Self::SwapExactAmountInWithIbcTransfer | Self::SwapExactAmountInWithIbcTransferJson => {
                gas::SWAP_EXACT_AMOUNT_IN_WITH_IBC_TRANSFER
            }
            Self::GetPool | Self::GetPoolJson => gas::GET_POOL,
            Self::GetPools | Self::GetPoolsJson => gas::GET_POOLS,
            Self::GetPoolType => gas::GET_POOL_TYPE,
            Self::GetPoolParams => gas::GET_POOL_PARAMS,
            Self::GetTotalShares => gas::GET_TOTAL_SHARES,
            Self::GetTotalLiquidity => gas::GET_TOTAL_LIQUIDITY,
            Self::CalcJoinPoolNoSwapShares | Self::CalcJoinPoolNoSwapSharesJson => {
                gas::CALC_JOIN_POOL_NO_SWAP_SHARES
            }
            Self::CalcExitPoolCoinsFromShares | Self::CalcExitPoolCoinsFromSharesJson => {
                gas::CALC_EXIT_POOL_COINS_FROM_SHARES
            }
            Self::CalcJoinPoolShares | Self::CalcJoinPoolSharesJson => gas::CALC_JOIN_POOL_SHARES,
        }
    }
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A method and its ABI description.
#[derive(Clone, Debug)]
pub struct MethodDescriptor {
    /// The dispatched method.
    pub method: Method,
    /// The ABI function, carrying the input and output types.
    pub function: Function,
}

impl MethodDescriptor {
    /// The 4-byte selector of the method.
    pub fn selector(&self) -> Selector {
        self.function.selector()
    }
}

/// Error raised while loading the ABI schema.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The schema is not valid JSON ABI.
    #[error("failed to parse ABI schema: {0}")]
    Parse(String),
    /// A dispatched method is absent from the schema.
    #[error("method {0} is missing from the ABI schema")]
    MissingMethod(&'static str),
    /// A dispatched method is overloaded in the schema.
    #[error("method {0} is declared more than once in the ABI schema")]
    Overloaded(&'static str),
    /// Two methods share a selector.
    #[error("selector {selector} of {method} collides with {other}")]
    SelectorCollision {
        /// The colliding selector.
        selector: Selector,
        /// The method being registered.
        method: &'static str,
        /// The method already holding the selector.
        other: &'static str,
    },
}

/// Selector to method table.
#[derive(Clone, Debug)]
pub struct AbiRegistry {
    descriptors: Vec<MethodDescriptor>,
    by_selector: HashMap<Selector, usize>,
}

impl AbiRegistry {
    /// Builds the registry from a JSON ABI schema. Every [`Method`] must be declared exactly once.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let abi: JsonAbi =
            serde_json::from_str(json).map_err(|err| RegistryError::Parse(err.to_string()))?;

        let mut descriptors = Vec::with_capacity(Method::ALL.len());
        let mut by_selector = HashMap::default();
        for method in Method::ALL {
            let function = match abi.function(method.name()).map(Vec::as_slice) {
                Some([function]) => function.clone(),
                Some([]) | None => return Err(RegistryError::MissingMethod(method.name())),
                Some(_) => return Err(RegistryError::Overloaded(method.name())),
            };
            let selector = function.selector();
            if let Some(index) = by_selector.insert(selector, descriptors.len()) {
                let other: &MethodDescriptor = &descriptors[index];
                return Err(RegistryError::SelectorCollision {
                    selector,
                    method: method.name(),
                    other: other.method.name(),
                });
            }
            descriptors.push(MethodDescriptor { method, function });
        }

        Ok(Self { descriptors, by_selector })
    }

    /// Builds the registry from the schema embedded in the contracts crate.
    pub fn embedded() -> Result<Self, RegistryError> {
        Self::from_json(ABI_JSON)
    }

    /// Resolves a selector. O(1).
    pub fn resolve(&self, selector: &[u8; 4]) -> Option<&MethodDescriptor> {
        self.by_selector.get(&Selector::from(*selector)).map(|index| &self.descriptors[*index])
    }

    /// Returns the descriptor of a method.
    pub fn descriptor(&self, method: Method) -> &MethodDescriptor {
        // descriptors are pushed in `Method::ALL` order
        &self.descriptors[method as usize]
    }

    /// Iterates over every descriptor in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.descriptors.iter()
    }
}

static REGISTRY: OnceBox<Result<Arc<AbiRegistry>, RegistryError>> = OnceBox::new();

/// Returns the process-wide registry, loading the embedded schema on first use.
pub fn global() -> &'static Result<Arc<AbiRegistry>, RegistryError> {
    REGISTRY.get_or_init(|| {
        let loaded = AbiRegistry::embedded().map(Arc::new);
        if let Err(err) = &loaded {
            error!(target: "amm_bridge::registry", %err, "ABI registry failed to load, precompile disabled");
        }
        Box::new(loaded)
    })
}

/// Returns the load error of the process-wide registry, if loading failed.
pub fn load_error() -> Option<&'static RegistryError> {
    global().as_ref().err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm_bridge_contracts::selectors;

    #[test]
    fn test_embedded_registry_loads() {
        assert!(load_error().is_none());
        let registry = global().as_ref().unwrap();
        assert_eq!(registry.iter().count(), 22);
        for descriptor in registry.iter() {
            assert_eq!(registry.descriptor(descriptor.method).method, descriptor.method);
            let resolved = registry.resolve(&descriptor.selector().0).unwrap();
            assert_eq!(resolved.method, descriptor.method);
        }
    }

    #[test]
    fn test_selectors_match_generated_table() {
        let registry = AbiRegistry::embedded().unwrap();
        for (name, _, selector) in selectors::ALL {
            let method = Method::from_name(name).unwrap();
            assert_eq!(registry.descriptor(method).selector().0, *selector);
        }
        assert_eq!(registry.resolve(&selectors::JOIN_POOL).unwrap().method, Method::JoinPool);
        assert!(registry.resolve(&[0xde, 0xad, 0xbe, 0xef]).is_none());
    }

    #[test]
    fn test_classification() {
        let transactions: Vec<_> = Method::ALL.into_iter().filter(|m| m.is_transaction()).collect();
        assert_eq!(transactions.len(), 8);
        assert!(Method::JoinPoolJson.is_transaction());
        assert!(!Method::GetPoolJson.is_transaction());

        assert_eq!(Method::ALL.into_iter().filter(|m| m.is_json()).count(), 9);
        assert!(!Method::JoinPool.is_json());
        assert!(Method::CalcJoinPoolSharesJson.is_json());
        assert_eq!(Method::CalcJoinPoolSharesJson.operation(), Method::CalcJoinPoolShares);
    }

    #[test]
    fn test_base_gas_is_shared_by_json_methods() {
        assert_eq!(Method::JoinPool.base_gas(), gas::JOIN_POOL);
        assert_eq!(Method::JoinPoolJson.base_gas(), gas::JOIN_POOL);
        assert_eq!(Method::CalcJoinPoolShares.base_gas(), gas::CALC_JOIN_POOL_SHARES);
        assert_eq!(Method::GetPoolsJson.base_gas(), gas::GET_POOLS);
    }

    #[test]
    fn test_missing_method_is_reported() {
        let err = AbiRegistry::from_json("[]").unwrap_err();
        assert_eq!(err, RegistryError::MissingMethod("joinPool"));
        assert!(matches!(AbiRegistry::from_json("{"), Err(RegistryError::Parse(_))));
    }
}
