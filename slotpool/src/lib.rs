#![deny(missing_docs)]

//! A fixed-size-class memory pool.
//!
//! The type `SlotPool` serves small allocations, of up to 512 bytes by default, out of per-size-class arenas, and
//! forwards larger ones to the system allocator.
//!
//! #   Warning
//!
//! This pool is not a general-purpose allocator:
//!
//! -   Memory is only returned to the system allocator when the pool is dropped.
//! -   Each pooled allocation must be deallocated with the size it was allocated with.
//!
//! #   Example
//!
//! ```
//! use slotpool::SlotPool;
//!
//! let pool = SlotPool::new().expect("Valid configuration");
//!
//! let point = pool.boxed((1.0f64, 2.0f64)).expect("Allocated");
//! assert_eq!(3.0, point.0 + point.1);
//! ```

mod boxed;
mod configuration;
mod platform;
mod pool;

pub use boxed::PoolBox;
pub use configuration::DefaultConfiguration;
pub use platform::SystemPlatform;
pub use pool::SlotPool;

pub use slotpool_core::{
    ArenaStatistics, ClassIndex, Configuration, Layout, Platform, PoolError, PowerOf2, Properties, Route,
};
