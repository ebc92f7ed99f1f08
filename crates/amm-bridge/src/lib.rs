//! An EVM precompile bridging Solidity callers to a balancer-style AMM engine.
//!
//! Calldata is decoded against the embedded `IAmmBridge` schema, validated, priced, and routed
//! to an [`AmmEngine`] either as a transaction carrying the verified [`Sender`] or as a
//! read-only query. Every engine failure surfaces as a [`BridgeError`] with a stable
//! [`ErrorCode`].
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod codec;
pub mod constants;
pub mod json;
pub mod memory;
pub mod registry;
pub mod validate;

mod config;
pub use config::*;

mod dispatch;
pub use dispatch::*;

mod engine;
pub use engine::*;

mod error;
pub use error::*;

mod events;
pub use events::*;

mod evm;
pub use evm::*;

mod gas;
pub use gas::*;

mod handler;

mod host;
pub use host::*;

mod message;
pub use message::*;

pub use registry::{AbiRegistry, Method, MethodDescriptor, RegistryError};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod types;
pub use types::*;
