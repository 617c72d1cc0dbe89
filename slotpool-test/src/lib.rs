//! Test utilities for slotpool.
//!
//! The centerpiece is `LockStep`, a multi-thread coordinator to flush out data-races and race-conditions in lock-free
//! code.

#![deny(missing_docs)]

mod lock_step;

pub use lock_step::{LockStep, LockStepBuilder};
