//! The seam between the bridge and the chain executing it.

use alloy_primitives::Address;

use crate::events::Event;

/// The execution context the precompile runs in.
///
/// The host supplies the caller and the block timestamp, and owns the transaction event log.
pub trait PrecompileHost {
    /// The EVM caller of the invocation.
    fn caller(&self) -> Address;

    /// The timestamp of the block being executed, in seconds.
    fn block_timestamp(&self) -> u64;

    /// Appends an event to the transaction event log.
    fn emit_event(&mut self, event: Event);

    /// Runs `action` inside the host's native action scope, which pins the chain context for the
    /// duration of the handler. Hosts without such a scope run the action directly.
    fn native_action<R>(&mut self, action: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        action(self)
    }
}
