//! Deployment configuration of the bridge precompile.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::constants::{AMM_BRIDGE_ADDRESS, DEFAULT_BECH32_PREFIX, MODULE_NAME};

/// Deployment parameters of the bridge precompile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Address the precompile is installed at. Emitted logs carry this address.
    pub address: Address,
    /// Human-readable part of the bech32 addresses derived from EVM callers.
    pub bech32_prefix: String,
    /// Value of the `module` attribute of every event.
    pub module_name: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: AMM_BRIDGE_ADDRESS,
            bech32_prefix: DEFAULT_BECH32_PREFIX.to_string(),
            module_name: MODULE_NAME.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Sets the precompile address.
    pub const fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Sets the bech32 prefix.
    pub fn with_bech32_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.bech32_prefix = prefix.into();
        self
    }

    /// Sets the event module name.
    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = module_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.address, address!("0x0000000000000000000000000000000000001002"));
        assert_eq!(config.bech32_prefix, "bb");
        assert_eq!(config.module_name, "gamm");
    }

    #[test]
    fn test_config_serde() {
        let config = BridgeConfig::default().with_bech32_prefix("osmo");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"bech32Prefix\":\"osmo\""));
        assert_eq!(serde_json::from_str::<BridgeConfig>(&json).unwrap(), config);
    }
}
