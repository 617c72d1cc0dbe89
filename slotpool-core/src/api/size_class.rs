//! Description of the size classes, and of the routing of requests.

use core::num;

pub use core::alloc::Layout;
pub use crate::utils::PowerOf2;

/// ClassIndex
///
/// The index of a size class, and of the arena serving it.
///
/// Class `i` serves slots of `(i + 1) * base` bytes, hence with a base of 8:
///
/// -    1-8   -> 0
/// -    9-16  -> 1
/// -   17-24  -> 2
/// -   ...
/// -  505-512 -> 63
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ClassIndex(usize);

impl ClassIndex {
    /// Creates a new instance.
    pub const fn new(value: usize) -> Self { Self(value) }

    /// Creates an instance based on the requested size of the allocation.
    ///
    /// Equivalent to `ceil(size / base) - 1`, without risk of overflow.
    pub fn from_size(size: num::NonZeroUsize, base: PowerOf2) -> Self { Self((size.get() - 1) / base) }

    /// Returns the underlying value.
    pub const fn value(&self) -> usize { self.0 }

    /// Returns the size of the slots of this class.
    pub fn slot_size(&self, base: PowerOf2) -> usize { (self.0 + 1) * base }
}

/// Route
///
/// Where a request of a given size is served.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Route {
    /// Zero-sized requests are not served at all.
    Empty,
    /// Served by the arena of the given class.
    Pooled(ClassIndex),
    /// Too large for any class, forwarded to the platform.
    Oversized,
}
