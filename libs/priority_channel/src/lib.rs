//! A priority-aware rendezvous channel.
//!
//! Producers hand values to consumers directly, with no internal buffering.
//! When senders are blocked on several priority levels at once, a receiver is
//! steered to the highest level that currently has a value in flight.

mod chan;
mod node;
mod waiting;

// region:    --- Exports
pub use chan::PriorityChannel;
// endregion: --- Exports
