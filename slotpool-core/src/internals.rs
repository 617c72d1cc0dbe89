//! The internals of slotpool-core.
//!
//! The internals provide all the heavy-lifting.

pub mod arena;
pub mod block_chain;
pub mod free_list;

mod atomic;
