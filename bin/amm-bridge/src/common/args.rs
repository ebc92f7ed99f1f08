use alloy_primitives::{Address, Bytes};
use amm_bridge::{constants::DEFAULT_BECH32_PREFIX, AmmBridge, BridgeConfig};
use clap::Args;

use super::{load_hex, Result};

/// Deployment of the bridge the command runs against.
#[derive(Args, Debug, Clone)]
pub struct BridgeArgs {
    /// Human-readable part of derived bech32 senders
    #[arg(long, env = "AMM_BRIDGE_PREFIX", default_value = DEFAULT_BECH32_PREFIX)]
    pub prefix: String,

    /// Address the precompile is installed at
    #[arg(long = "precompile", env = "AMM_BRIDGE_ADDRESS")]
    pub precompile: Option<Address>,
}

impl BridgeArgs {
    /// Builds the bridge described by the arguments.
    pub fn bridge(&self) -> AmmBridge {
        let mut config = BridgeConfig::default().with_bech32_prefix(&self.prefix);
        if let Some(address) = self.precompile {
            config = config.with_address(address);
        }
        AmmBridge::new(config)
    }
}

/// Calldata given inline or through a file.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Hex-encoded calldata
    #[arg(long, conflicts_with = "input_file")]
    pub input: Option<String>,

    /// File holding hex-encoded calldata, `-` for stdin
    #[arg(long = "input-file")]
    pub input_file: Option<String>,
}

impl InputArgs {
    /// Loads the calldata.
    pub fn load(&self) -> Result<Bytes> {
        load_hex(self.input.as_deref(), self.input_file.as_deref())
    }
}
