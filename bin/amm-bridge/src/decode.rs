use clap::Parser;
use tracing::info;

use crate::common::{BridgeArgs, InputArgs, Result};

/// Decode calldata into a request
///
/// Prints the request as JSON, in the `{"method": .., "args": ..}` shape. The request is checked
/// against the argument bounds unless `--no-validate` is given.
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Calldata to decode
    #[command(flatten)]
    pub input_args: InputArgs,

    /// Bridge deployment
    #[command(flatten)]
    pub bridge_args: BridgeArgs,

    /// Block timestamp used to check IBC timeouts
    #[arg(long, default_value_t = 0)]
    pub timestamp: u64,

    /// Skip argument validation
    #[arg(long)]
    pub no_validate: bool,
}

impl Cmd {
    /// Execute the decode command
    pub fn run(&self) -> Result<()> {
        let input = self.input_args.load()?;
        let request = self.bridge_args.bridge().decode(&input)?;
        info!(method = %request.method(), "Decoded calldata");
        if !self.no_validate {
            request.validate(self.timestamp)?;
        }
        println!("{}", serde_json::to_string_pretty(&request)?);
        Ok(())
    }
}
