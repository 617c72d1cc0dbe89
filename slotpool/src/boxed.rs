//! An owning handle to a value stored in a SlotPool.

use std::{fmt, marker::PhantomData, mem, ops, ptr::NonNull};

use slotpool_core::{Configuration, Platform};

use crate::SlotPool;

/// PoolBox
///
/// Similar to `Box<T>`, except that the value lives in the storage of a `SlotPool`, to which it is returned on drop.
pub struct PoolBox<'a, T, C, P>
    where
        C: Configuration,
        P: Platform,
{
    pointer: NonNull<T>,
    pool: &'a SlotPool<C, P>,
    _marker: PhantomData<T>,
}

impl<'a, T, C, P> PoolBox<'a, T, C, P>
    where
        C: Configuration,
        P: Platform,
{
    /// Rematerializes from a raw pointer.
    ///
    /// #   Safety
    ///
    /// -   Assumes `pointer` was returned by `pool.create::<T>`, or by `into_raw` on a PoolBox of `pool`.
    /// -   Assumes `pointer` is owned by no one else.
    pub unsafe fn from_raw(pool: &'a SlotPool<C, P>, pointer: NonNull<T>) -> Self {
        Self { pointer, pool, _marker: PhantomData }
    }

    /// Turns into a raw pointer, which must eventually be destroyed by the pool.
    pub fn into_raw(this: Self) -> NonNull<T> {
        let pointer = this.pointer;
        mem::forget(this);
        pointer
    }

    /// Returns the pool owning the storage.
    pub fn pool(this: &Self) -> &'a SlotPool<C, P> { this.pool }
}

impl<'a, T, C, P> ops::Deref for PoolBox<'a, T, C, P>
    where
        C: Configuration,
        P: Platform,
{
    type Target = T;

    fn deref(&self) -> &T {
        //  Safety:
        //  -   `self.pointer` points to a valid `T`, exclusively owned.
        unsafe { self.pointer.as_ref() }
    }
}

impl<'a, T, C, P> ops::DerefMut for PoolBox<'a, T, C, P>
    where
        C: Configuration,
        P: Platform,
{
    fn deref_mut(&mut self) -> &mut T {
        //  Safety:
        //  -   `self.pointer` points to a valid `T`, exclusively owned.
        unsafe { self.pointer.as_mut() }
    }
}

impl<'a, T, C, P> Drop for PoolBox<'a, T, C, P>
    where
        C: Configuration,
        P: Platform,
{
    fn drop(&mut self) {
        //  Safety:
        //  -   `self.pointer` was created by `self.pool`, and is exclusively owned.
        unsafe { self.pool.destroy(self.pointer) }
    }
}

impl<'a, T, C, P> fmt::Debug for PoolBox<'a, T, C, P>
    where
        T: fmt::Debug,
        C: Configuration,
        P: Platform,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(&**self, f) }
}

//  Safety:
//  -   Same as `Box<T>`, with the pool shared between threads.
unsafe impl<'a, T, C, P> Send for PoolBox<'a, T, C, P>
    where
        T: Send,
        C: Configuration,
        P: Platform,
        SlotPool<C, P>: Sync,
{}

//  Safety:
//  -   Same as `Box<T>`.
unsafe impl<'a, T, C, P> Sync for PoolBox<'a, T, C, P>
    where
        T: Sync,
        C: Configuration,
        P: Platform,
        SlotPool<C, P>: Sync,
{}

// mod tests
