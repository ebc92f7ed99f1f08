//! `amm-bridge` CLI tool for inspecting and simulating calls into the AMM bridge precompile.
//!
//! The tool prices and decodes calldata with the same registry the precompile uses, derives the
//! chain-native sender of an EVM caller, and runs calls against an in-memory engine.

use clap::Parser;

mod cmd;
pub use cmd::*;

mod call;
mod common;
mod decode;
mod gas;
mod selectors;
mod sender;

fn main() -> Result<(), Error> {
    set_thread_panic_hook();
    let cli = Cli::parse();
    cli.log_args.init()?;
    cli.cmd.run().inspect_err(|e| eprintln!("{e}"))
}

/// Sets thread panic hook, useful for having tests that panic.
fn set_thread_panic_hook() {
    use std::{
        backtrace::Backtrace,
        panic::{set_hook, take_hook},
        process::exit,
    };
    let orig_hook = take_hook();
    set_hook(Box::new(move |panic_info| {
        eprintln!("Custom backtrace: {}", Backtrace::capture());
        orig_hook(panic_info);
        exit(1);
    }));
}
