use clap::Parser;

use crate::common::{CliError, LogArgs};

/// Command line interface of the amm-bridge tool.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub cmd: MainCmd,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

/// Main command enumeration for the amm-bridge CLI tool
#[derive(Parser, Debug)]
#[command(infer_subcommands = true)]
pub enum MainCmd {
    /// List the selectors of every bridge method
    Selectors(crate::selectors::Cmd),
    /// Price calldata with the gas meter
    Gas(crate::gas::Cmd),
    /// Decode calldata into a request
    Decode(crate::decode::Cmd),
    /// Derive the bech32 sender of an EVM address
    Sender(crate::sender::Cmd),
    /// Run calldata against an in-memory engine
    Call(crate::call::Cmd),
}

/// Error types for the main command system
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error raised by a subcommand
    #[error("{0}")]
    Cli(#[from] CliError),
}

impl MainCmd {
    /// Execute the main command
    pub fn run(&self) -> Result<(), Error> {
        match self {
            Self::Selectors(cmd) => cmd.run()?,
            Self::Gas(cmd) => cmd.run()?,
            Self::Decode(cmd) => cmd.run()?,
            Self::Sender(cmd) => cmd.run()?,
            Self::Call(cmd) => cmd.run()?,
        }
        Ok(())
    }
}
