use clap::Parser;
use tracing::debug;

use crate::common::{BridgeArgs, InputArgs, Result};

/// Price calldata with the gas meter
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Calldata to price
    #[command(flatten)]
    pub input_args: InputArgs,

    /// Bridge deployment
    #[command(flatten)]
    pub bridge_args: BridgeArgs,
}

impl Cmd {
    /// Execute the gas command
    pub fn run(&self) -> Result<()> {
        let input = self.input_args.load()?;
        let gas = self.bridge_args.bridge().required_gas(&input);
        debug!(input_len = input.len(), gas, "Priced calldata");
        println!("{gas}");
        Ok(())
    }
}
