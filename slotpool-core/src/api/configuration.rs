//! The configuration of slotpool-core.
//!
//! The Configuration determines the shape of the pools:
//!
//! -   The size of the blocks requested from the Platform, and carved into slots.
//! -   The granularity of the size classes, which is also the size of the smallest slot.
//! -   The largest slot size; any request above it is forwarded to the Platform.

use core::{mem, num};

use super::{ClassIndex, Layout, PoolError, PowerOf2, Route};

/// Configuration
///
/// The Configuration instance allows adjusting the shape of the pools.
pub trait Configuration {
    /// The size of the blocks requested from the Platform.
    ///
    /// Each block starts with a link to the previously acquired block, followed by padding to align the first slot;
    /// it must therefore be able to hold at least one slot of `MAX_SLOT_SIZE` after the worst-case padding.
    const BLOCK_SIZE: usize;

    /// The granularity of the size classes, and the size of the smallest slot.
    ///
    /// Freed slots store a link to the next free slot, hence this cannot be less than the size of a pointer.
    const SLOT_BASE_SIZE: PowerOf2;

    /// The size of the largest slot.
    ///
    /// Must be a multiple of `SLOT_BASE_SIZE`.
    const MAX_SLOT_SIZE: usize;
}

/// Properties
///
/// Properties of a given Configuration.
///
/// Work-around for the inability to implement static methods directly on a trait.
pub struct Properties<C>(C);

impl<C> Properties<C>
    where
        C: Configuration
{
    /// Returns the number of size classes, hence of arenas.
    pub fn number_classes() -> usize { C::MAX_SLOT_SIZE / C::SLOT_BASE_SIZE }

    /// Returns the route of a request of `size` bytes.
    pub fn route(size: usize) -> Route {
        match num::NonZeroUsize::new(size) {
            None => Route::Empty,
            Some(size) if size.get() > C::MAX_SLOT_SIZE => Route::Oversized,
            Some(size) => Route::Pooled(ClassIndex::from_size(size, C::SLOT_BASE_SIZE)),
        }
    }

    /// Returns the size of the slots of the given class.
    pub fn slot_size(class: ClassIndex) -> usize { class.slot_size(C::SLOT_BASE_SIZE) }

    /// Returns the layout of the blocks requested from the Platform.
    pub fn block_layout() -> Result<Layout, PoolError> {
        Layout::from_size_align(C::BLOCK_SIZE, mem::align_of::<usize>())
            .map_err(|_| PoolError::BlockTooLarge { block: C::BLOCK_SIZE })
    }

    /// Returns the layout of an oversized request of `size` bytes, forwarded to the Platform.
    pub fn oversized_layout(size: usize) -> Option<Layout> {
        Layout::from_size_align(size, C::SLOT_BASE_SIZE.value()).ok()
    }

    /// Checks the consistency of the Configuration.
    pub fn validate() -> Result<(), PoolError> {
        let base = C::SLOT_BASE_SIZE.value();
        let link = mem::size_of::<usize>();

        if base < link {
            return Err(PoolError::BaseTooSmall { base, link });
        }

        if C::MAX_SLOT_SIZE == 0 || C::MAX_SLOT_SIZE % C::SLOT_BASE_SIZE != 0 {
            return Err(PoolError::InvalidMaximum { maximum: C::MAX_SLOT_SIZE, base });
        }

        Self::block_layout()?;

        //  Block link, then worst-case padding, then one slot.
        let required = (C::MAX_SLOT_SIZE - 1)
            .checked_add(C::MAX_SLOT_SIZE)
            .and_then(|n| n.checked_add(link));

        match required {
            Some(required) if required <= C::BLOCK_SIZE => Ok(()),
            _ => Err(PoolError::BlockTooSmall { block: C::BLOCK_SIZE, slot: C::MAX_SLOT_SIZE }),
        }
    }
}
