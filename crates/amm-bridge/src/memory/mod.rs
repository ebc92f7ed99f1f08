//! An in-memory engine and host for running the bridge without a chain.
//!
//! [`MemoryEngine`] is a small constant-product AMM; [`MemoryHost`] records events. The CLI's
//! `call` command and the test suites run the bridge on top of them.

mod engine;
mod host;

pub use engine::*;
pub use host::*;
