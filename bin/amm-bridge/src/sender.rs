use alloy_primitives::Address;
use amm_bridge::{codec::bech32, constants::DEFAULT_BECH32_PREFIX, Sender};
use clap::Parser;

use crate::common::{CliError, Result};

/// Derive the bech32 sender of an EVM address, or recover the address of a bech32 sender
#[derive(Parser, Debug)]
pub struct Cmd {
    /// EVM address or bech32 address to convert
    pub address: String,

    /// Human-readable part of the derived bech32 address
    #[arg(long, env = "AMM_BRIDGE_PREFIX", default_value = DEFAULT_BECH32_PREFIX)]
    pub prefix: String,
}

impl Cmd {
    /// Execute the sender command
    pub fn run(&self) -> Result<()> {
        println!("{}", self.convert()?);
        Ok(())
    }

    fn convert(&self) -> Result<String> {
        if let Ok(address) = self.address.parse::<Address>() {
            return Ok(Sender::from_caller(address, &self.prefix)?.bech32().to_string());
        }
        let (_, address) = bech32::decode_address(&self.address)
            .map_err(|err| CliError::InvalidInput(format!("{}: {err}", self.address)))?;
        Ok(address.to_checksum(None))
    }
}
