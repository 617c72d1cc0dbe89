//! Pools
//!
//! The dispatcher over the size classes: a registry of one Arena per size class, routing each request to the Arena of
//! its class, or to the Platform for oversized requests.
//!
//! An instance of `Pools` is self-contained:
//!
//! -   All Arenas are created, and told their slot size, when the `Pools` is created.
//! -   Any piece of memory allocated by a `Pools` MUST be deallocated by the same `Pools`, with the same size.
//! -   All blocks are returned to the Platform when the `Pools` is dropped.

use core::{alloc::Layout, marker::PhantomData, ptr::NonNull};

use tracing::{debug, error, trace, warn};

use crate::{ClassIndex, Configuration, Platform, PoolError, Properties, Route};
use crate::internals::arena::Arena;

/// ArenaStatistics
///
/// A snapshot of the state of the Arena of a given size class.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ArenaStatistics {
    /// Size of the slots of the Arena.
    pub slot_size: usize,
    /// Number of blocks acquired from the Platform.
    pub blocks: usize,
}

/// Pools
///
/// The registry of Arenas, one per size class.
///
/// #   Thread Safety
///
/// A `Pools` may be shared freely between threads, as long as its `Platform` is `Sync`: the Arenas are independent
/// from one another, and each is safe to use concurrently.
pub struct Pools<C, P>
    where
        P: Platform,
{
    arenas: Box<[Arena]>,
    platform: P,
    _configuration: PhantomData<fn() -> C>,
}

impl<C, P> Pools<C, P>
    where
        C: Configuration,
        P: Platform,
{
    /// Creates the Pools, initializing one Arena per size class.
    ///
    /// No block is acquired until the first allocation of each class.
    ///
    /// Returns an error if the Configuration is inconsistent.
    pub fn new(platform: P) -> Result<Self, PoolError> {
        if let Err(error) = Properties::<C>::validate() {
            warn!(%error, "rejected pools configuration");
            return Err(error);
        }

        let block_layout = Properties::<C>::block_layout()?;

        let arenas: Box<[Arena]> = (0..Properties::<C>::number_classes())
            .map(|index| Arena::new(Properties::<C>::slot_size(ClassIndex::new(index)), block_layout))
            .collect();

        debug!(classes = arenas.len(), block_size = C::BLOCK_SIZE, max_slot_size = C::MAX_SLOT_SIZE,
            "initialized pools");

        Ok(Self { arenas, platform, _configuration: PhantomData })
    }

    /// Returns the Platform.
    pub fn platform(&self) -> &P { &self.platform }

    /// Returns the route of a request of `size` bytes.
    pub fn route(&self, size: usize) -> Route { Properties::<C>::route(size) }

    /// Allocates `size` bytes of memory.
    ///
    /// Pooled allocations are aligned on the slot size of their class, which is a multiple of
    /// `C::SLOT_BASE_SIZE`; oversized allocations are aligned on `C::SLOT_BASE_SIZE`.
    ///
    /// Returns None if `size` is 0, or if the Platform fails to supply the memory.
    pub fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        match Properties::<C>::route(size) {
            Route::Empty => None,
            Route::Pooled(class) => self.allocate_pooled(class),
            Route::Oversized => self.allocate_oversized(Properties::<C>::oversized_layout(size)?),
        }
    }

    /// Deallocates the memory located at `pointer`.
    ///
    /// #   Safety
    ///
    /// -   Assumes `pointer` has been returned by a prior call to `allocate` on this instance, with the same `size`.
    /// -   Assumes `pointer` has not been deallocated since its allocation.
    /// -   Assumes the memory pointed by `pointer` is no longer in use.
    pub unsafe fn deallocate(&self, pointer: NonNull<u8>, size: usize) {
        match Properties::<C>::route(size) {
            Route::Empty => debug_assert!(false, "Cannot deallocate a zero-sized allocation"),
            Route::Pooled(class) => self.arena(class).deallocate(pointer),
            Route::Oversized => match Properties::<C>::oversized_layout(size) {
                Some(layout) => self.platform.deallocate(pointer, layout),
                None => debug_assert!(false, "Cannot deallocate {} bytes, never allocated", size),
            },
        }
    }

    /// Allocates memory as per `layout`.
    ///
    /// Routes on the size of `layout` padded to its alignment, guaranteeing that pooled allocations are suitably
    /// aligned; oversized allocations are forwarded to the Platform with `layout`.
    ///
    /// Returns None if `layout` has a size of 0, or if the Platform fails to supply the memory.
    pub fn allocate_layout(&self, layout: Layout) -> Option<NonNull<u8>> {
        let layout = layout.pad_to_align();

        match Properties::<C>::route(layout.size()) {
            Route::Empty => None,
            Route::Pooled(class) => self.allocate_pooled(class),
            Route::Oversized => self.allocate_oversized(layout),
        }
    }

    /// Deallocates the memory located at `pointer`.
    ///
    /// #   Safety
    ///
    /// -   Assumes `pointer` has been returned by a prior call to `allocate_layout` on this instance, with the same
    ///     `layout`.
    /// -   Assumes `pointer` has not been deallocated since its allocation.
    /// -   Assumes the memory pointed by `pointer` is no longer in use.
    pub unsafe fn deallocate_layout(&self, pointer: NonNull<u8>, layout: Layout) {
        let layout = layout.pad_to_align();

        match Properties::<C>::route(layout.size()) {
            Route::Empty => debug_assert!(false, "Cannot deallocate a zero-sized allocation"),
            Route::Pooled(class) => self.arena(class).deallocate(pointer),
            Route::Oversized => self.platform.deallocate(pointer, layout),
        }
    }

    /// Returns the statistics of the Arena of `class`, if any.
    pub fn class_statistics(&self, class: ClassIndex) -> Option<ArenaStatistics> {
        self.arenas.get(class.value()).map(Arena::statistics)
    }

    /// Returns the statistics of all Arenas, in order of increasing slot size.
    pub fn statistics(&self) -> Vec<ArenaStatistics> { self.arenas.iter().map(Arena::statistics).collect() }

    //  Internal; returns the arena of `class`.
    fn arena(&self, class: ClassIndex) -> &Arena {
        debug_assert!(class.value() < self.arenas.len());

        &self.arenas[class.value()]
    }

    //  Internal; allocates from the arena of `class`.
    #[inline(always)]
    fn allocate_pooled(&self, class: ClassIndex) -> Option<NonNull<u8>> {
        let arena = self.arena(class);
        debug_assert_eq!(Properties::<C>::slot_size(class), arena.slot_size());

        arena.allocate(&self.platform)
    }

    //  Internal; forwards to the platform.
    #[cold]
    fn allocate_oversized(&self, layout: Layout) -> Option<NonNull<u8>> {
        trace!(size = layout.size(), align = layout.align(), "forwarding oversized allocation");

        //  Safety:
        //  -   `layout.size()` is non-zero, as it exceeds `C::MAX_SLOT_SIZE`.
        let pointer = unsafe { self.platform.allocate(layout) };

        if pointer.is_none() {
            error!(size = layout.size(), align = layout.align(), "platform failed to supply oversized allocation");
        }

        pointer
    }
}

impl<C, P> Drop for Pools<C, P>
    where
        P: Platform,
{
    fn drop(&mut self) {
        let platform = &self.platform;

        for arena in self.arenas.iter_mut() {
            //  Safety:
            //  -   All blocks were allocated by `platform`.
            //  -   Exclusive access guarantees no slot is in use any longer.
            unsafe { arena.release(platform) };
        }
    }
}

// mod tests
