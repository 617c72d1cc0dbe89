#![deny(missing_docs)]

//! Building blocks for a fixed-size-class memory pool.
//!
//! slotpool-core carves small, uniformly-sized allocations out of large blocks, without calling into the system
//! allocator on every request. It contains:
//! -   A platform trait, used to allocate the raw blocks to be carved up, and to serve oversized requests.
//! -   A configuration trait, defining the block size and the range of size classes.
//! -   The `Pools` dispatcher, owning one arena per size class.
//!
//! Each arena serves its slots in O(1): a lock-free LIFO free list of reclaimed slots first, and a bump cursor into
//! the current block, guarded by a narrow lock, second.

mod api;
mod internals;
mod utils;

pub use api::*;
