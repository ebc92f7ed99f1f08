//! A host that records what the bridge emits instead of writing it to an EVM.

use alloy_primitives::Address;

use crate::{events::Event, host::PrecompileHost};

/// Block timestamp used by [`MemoryHost`] unless overridden.
pub const DEFAULT_TIMESTAMP: u64 = 1_700_000_000;

/// A host recording emitted events, used to run the bridge outside an EVM.
#[derive(Clone, Debug)]
pub struct MemoryHost {
    /// Caller reported to the precompile.
    pub caller: Address,
    /// Block timestamp reported to the precompile.
    pub timestamp: u64,
    /// Events emitted so far, in order.
    pub events: Vec<Event>,
    /// Number of native action scopes entered.
    pub native_actions: usize,
}

impl MemoryHost {
    /// Creates a host calling from `caller` at [`DEFAULT_TIMESTAMP`].
    pub const fn new(caller: Address) -> Self {
        Self { caller, timestamp: DEFAULT_TIMESTAMP, events: Vec::new(), native_actions: 0 }
    }

    /// Sets the block timestamp.
    pub const fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl PrecompileHost for MemoryHost {
    fn caller(&self) -> Address {
        self.caller
    }

    fn block_timestamp(&self) -> u64 {
        self.timestamp
    }

    fn emit_event(&mut self, event: Event) {
        self.events.push(event);
    }

    fn native_action<R>(&mut self, action: impl FnOnce(&mut Self) -> R) -> R {
        self.native_actions += 1;
        action(self)
    }
}
