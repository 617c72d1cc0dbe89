//! Errors reported by the pools.

use thiserror::Error;

/// PoolError
///
/// Configuration errors are reported once, when the pools are created; `OutOfMemory` is reported by the typed
/// operations whenever the platform fails to supply storage.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Error)]
pub enum PoolError {
    /// The smallest slot cannot hold the free-list link.
    #[error("slot base size of {base} bytes cannot hold a free-list link of {link} bytes")]
    BaseTooSmall {
        /// Configured slot base size.
        base: usize,
        /// Size of the free-list link.
        link: usize,
    },
    /// The largest slot size is zero, or not a multiple of the slot base size.
    #[error("maximum slot size of {maximum} bytes is not a non-zero multiple of {base} bytes")]
    InvalidMaximum {
        /// Configured maximum slot size.
        maximum: usize,
        /// Configured slot base size.
        base: usize,
    },
    /// A block cannot hold a single slot of the largest size class.
    #[error("block of {block} bytes cannot hold a single slot of {slot} bytes")]
    BlockTooSmall {
        /// Configured block size.
        block: usize,
        /// Largest slot size.
        slot: usize,
    },
    /// A block exceeds the limits of `Layout`.
    #[error("block of {block} bytes cannot be described by a layout")]
    BlockTooLarge {
        /// Configured block size.
        block: usize,
    },
    /// The platform failed to supply the requested storage.
    #[error("platform failed to supply {size} bytes aligned on {align}")]
    OutOfMemory {
        /// Requested size.
        size: usize,
        /// Requested alignment.
        align: usize,
    },
}
