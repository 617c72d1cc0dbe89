//! SlotPool

use std::{
    alloc::Layout,
    any,
    ptr::{self, NonNull},
};

use slotpool_core::{ArenaStatistics, Configuration, Platform, PoolError, Pools};
use tracing::warn;

use crate::{DefaultConfiguration, PoolBox, SystemPlatform};

/// Fixed-size-class memory pool.
///
/// `SlotPool` offers two interfaces:
///
/// -   An untyped one, `alloc` and `free`, handing out raw bytes.
/// -   A typed one, `create` and `destroy`, or `boxed`, moving values in and out of pooled storage.
///
/// Storage obtained through one interface must be returned through the same one.
pub struct SlotPool<C = DefaultConfiguration, P = SystemPlatform>
    where
        P: Platform,
{
    pools: Pools<C, P>,
}

impl SlotPool {
    /// Creates an instance, with the default configuration, on top of the system allocator.
    pub fn new() -> Result<Self, PoolError> { Self::with_platform(SystemPlatform::new()) }
}

impl<C, P> SlotPool<C, P>
    where
        C: Configuration,
        P: Platform,
{
    /// Creates an instance, requesting its blocks from `platform`.
    ///
    /// Returns an error if the configuration `C` is inconsistent.
    pub fn with_platform(platform: P) -> Result<Self, PoolError> {
        Pools::new(platform).map(|pools| Self { pools })
    }

    /// Returns the underlying Pools.
    pub fn pools(&self) -> &Pools<C, P> { &self.pools }

    /// Returns the statistics of all size classes, in order of increasing slot size.
    pub fn statistics(&self) -> Vec<ArenaStatistics> { self.pools.statistics() }

    /// Allocates `size` bytes of memory.
    ///
    /// Returns a null pointer if `size` is 0, or if the platform fails to supply the memory.
    pub fn alloc(&self, size: usize) -> *mut u8 {
        self.pools.allocate(size).map(NonNull::as_ptr).unwrap_or(ptr::null_mut())
    }

    /// Deallocates the memory located at `pointer`; a null `pointer` is ignored.
    ///
    /// #   Safety
    ///
    /// -   Assumes `pointer` has been returned by a prior call to `alloc` on this instance, with the same `size`.
    /// -   Assumes `pointer` has not been deallocated since its allocation.
    /// -   Assumes the memory pointed by `pointer` is no longer in use.
    pub unsafe fn free(&self, pointer: *mut u8, size: usize) {
        if let Some(pointer) = NonNull::new(pointer) {
            self.pools.deallocate(pointer, size);
        }
    }

    /// Moves `value` into pooled storage.
    ///
    /// Zero-sized types are not allocated at all; a dangling, well-aligned, pointer is returned instead.
    ///
    /// Returns an error, dropping `value`, if the platform fails to supply the storage.
    pub fn create<T>(&self, value: T) -> Result<NonNull<T>, PoolError> {
        let layout = Layout::new::<T>();

        let pointer = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            match self.pools.allocate_layout(layout) {
                Some(pointer) => pointer.cast(),
                None => {
                    warn!(type_name = any::type_name::<T>(), size = layout.size(), "failed to create value");
                    return Err(PoolError::OutOfMemory { size: layout.size(), align: layout.align() });
                }
            }
        };

        //  Safety:
        //  -   `pointer` is valid for writes, and suitably aligned, for `T`.
        unsafe { ptr::write(pointer.as_ptr(), value) };

        Ok(pointer)
    }

    /// Drops the value located at `pointer`, then returns its storage to the pool.
    ///
    /// #   Safety
    ///
    /// -   Assumes `pointer` has been returned by a prior call to `create::<T>` on this instance.
    /// -   Assumes `pointer` has not been destroyed since its creation.
    /// -   Assumes the value pointed by `pointer` is no longer in use.
    pub unsafe fn destroy<T>(&self, pointer: NonNull<T>) {
        let layout = Layout::new::<T>();

        ptr::drop_in_place(pointer.as_ptr());

        if layout.size() != 0 {
            self.pools.deallocate_layout(pointer.cast(), layout);
        }
    }

    /// Moves `value` into pooled storage, returning an owning handle which destroys it when dropped.
    ///
    /// Returns an error, dropping `value`, if the platform fails to supply the storage.
    pub fn boxed<T>(&self, value: T) -> Result<PoolBox<'_, T, C, P>, PoolError> {
        let pointer = self.create(value)?;

        //  Safety:
        //  -   `pointer` was created by `self`, and is owned by no one else.
        Ok(unsafe { PoolBox::from_raw(self, pointer) })
    }
}

// mod tests
