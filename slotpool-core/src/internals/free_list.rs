//! A lock-free intrusively-linked LIFO list of free slots.
//!
//! #   Warning
//!
//! A Treiber stack built on a plain pointer CAS suffers from the ABA problem: a `pop` reads the head A and its next
//! link B, gets preempted while A and B are popped and A is pushed back, then successfully swaps the head to B, which
//! is in use.
//!
//! The list sidesteps the issue by versioning the head: each successful `push` or `pop` bumps a tag packed alongside
//! the address, so that the stale `pop` fails its CAS and retries. The protection is only as good as the width of the
//! tag: the tag must not wrap around within the window between the read of the head and the CAS.
//!
//! #   Safety
//!
//! The list assumes that the slots stashed within are:
//!
//! -   Exclusively accessible through the list; ie, the list _owns_ them.
//! -   Part of memory which outlives the list, as a stale `pop` may still read the link of a slot it lost the race
//!     for.

use core::ptr::NonNull;

use super::atomic::{AtomicHead, Slot};

/// FreeList
#[derive(Default)]
pub(crate) struct FreeList(AtomicHead);

impl FreeList {
    /// Creates an empty instance of the FreeList.
    pub(crate) fn new() -> Self { Self(AtomicHead::new()) }

    /// Checks whether the list is empty, or not.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool { self.0.load().address() == 0 }

    /// Pops the most recently pushed slot, if any.
    ///
    /// The returned slot, if any, is guaranteed to have exclusive access to its storage.
    pub(crate) fn pop(&self) -> Option<NonNull<Slot>> {
        //  WARNING:
        //
        //  Due to concurrency, another thread may pop `head` and start writing to it prior to this call terminating.
        //
        //  DO NOT WRITE to `head` before having won the CAS.
        let mut current = self.0.load();

        loop {
            let head = Slot::at(current.address())?;

            //  Safety:
            //  -   `head` points within a block, and blocks outlive the list.
            //
            //  The value read is garbage if another thread won the race for `head` in the meantime; the tag then
            //  guarantees that the CAS below fails.
            let next = unsafe { head.as_ref().next() };

            match self.0.compare_exchange_weak(current, current.successor(next)) {
                Ok(_) => return Some(head),
                Err(actual) => current = actual,
            }
        }
    }

    /// Pushes a slot at the top.
    ///
    /// #   Safety
    ///
    /// -   Assumes `slot` is not in use, and not already in the list.
    /// -   Assumes `slot` points within memory outliving the list.
    pub(crate) unsafe fn push(&self, slot: NonNull<Slot>) {
        let mut current = self.0.load();

        loop {
            slot.as_ref().set_next(current.address());

            match self.0.compare_exchange_weak(current, current.successor(Slot::address(slot))) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

// mod tests
