//! Arena
//!
//! An Arena serves the slots of a single size class.
//!
//! Slots are served from two sources, in order:
//!
//! -   The FreeList of reclaimed slots: lock-free, O(1).
//! -   The Bump cursor into the current block: O(1), under a narrow lock, acquiring a new block from the Platform
//!     whenever the current one is exhausted.
//!
//! The Bump is an explicit two-state machine, whose transitions only ever occur with the lock held:
//!
//! -   Ready: at least one never-used slot remains between the cursor and the boundary.
//! -   Growing: the cursor reached the boundary, a new block must be acquired before carving further.

use core::{alloc::Layout, mem, ptr::NonNull};

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{ArenaStatistics, Platform};
use crate::utils::padding_for;

use super::{atomic::{Slot, Versioned}, block_chain::BlockChain, free_list::FreeList};

/// GrowthState
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub(crate) enum GrowthState {
    /// Room remains in the current block.
    Ready,
    /// The current block, if any, is exhausted.
    Growing,
}

/// Arena
pub(crate) struct Arena {
    slot_size: usize,
    block_layout: Layout,
    free_list: FreeList,
    bump: Mutex<Bump>,
}

impl Arena {
    /// Creates an Arena, with no block.
    ///
    /// `slot_size` is immutable for the lifetime of the Arena.
    ///
    /// #   Panics
    ///
    /// In Debug, if `slot_size` is insufficient to hold a free-list link.
    pub(crate) fn new(slot_size: usize, block_layout: Layout) -> Self {
        debug_assert!(slot_size >= mem::size_of::<usize>());
        debug_assert!(slot_size % mem::align_of::<usize>() == 0);

        let free_list = FreeList::new();
        let bump = Mutex::new(Bump::default());

        Self { slot_size, block_layout, free_list, bump, }
    }

    /// Returns the size of the slots.
    pub(crate) fn slot_size(&self) -> usize { self.slot_size }

    /// Allocates a slot.
    ///
    /// Returns None only if a new block was required and `platform` could not supply it.
    pub(crate) fn allocate<P>(&self, platform: &P) -> Option<NonNull<u8>>
        where
            P: Platform,
    {
        if let Some(slot) = self.free_list.pop() {
            return Some(slot.cast());
        }

        self.bump.lock().carve(self.slot_size, self.block_layout, platform)
    }

    /// Deallocates a slot, pushing it on the FreeList.
    ///
    /// #   Safety
    ///
    /// -   Assumes `pointer` was allocated by this Arena.
    /// -   Assumes `pointer` has not been deallocated since its allocation.
    /// -   Assumes the memory pointed by `pointer` is no longer in use.
    pub(crate) unsafe fn deallocate(&self, pointer: NonNull<u8>) {
        debug_assert!(pointer.as_ptr() as usize % self.slot_size == 0,
            "{:x} is not aligned on {}", pointer.as_ptr() as usize, self.slot_size);

        self.free_list.push(Slot::from_storage(pointer));
    }

    /// Returns the current state of the Bump.
    #[cfg(test)]
    pub(crate) fn state(&self) -> GrowthState { self.bump.lock().state() }

    /// Returns the statistics of the Arena.
    pub(crate) fn statistics(&self) -> ArenaStatistics {
        let blocks = self.bump.lock().blocks.len();

        ArenaStatistics { slot_size: self.slot_size, blocks, }
    }

    /// Returns all blocks to the `platform`.
    ///
    /// #   Safety
    ///
    /// -   Assumes all blocks were allocated by `platform`.
    /// -   Assumes no slot of this Arena is referenced any longer.
    pub(crate) unsafe fn release<P>(&mut self, platform: &P)
        where
            P: Platform,
    {
        self.free_list = FreeList::new();

        let bump = self.bump.get_mut();
        bump.blocks.release(platform, self.block_layout);
        bump.cursor = 0;
        bump.boundary = 0;
    }
}

//
//  Implementation
//

//  Invariant: cursor <= boundary, and both are 0 until the first block is acquired.
#[derive(Default)]
struct Bump {
    cursor: usize,
    boundary: usize,
    blocks: BlockChain,
}

impl Bump {
    fn state(&self) -> GrowthState {
        debug_assert!(self.cursor <= self.boundary);

        if self.cursor == self.boundary { GrowthState::Growing } else { GrowthState::Ready }
    }

    //  Carves the next never-used slot, growing first if need be.
    fn carve<P>(&mut self, slot_size: usize, layout: Layout, platform: &P) -> Option<NonNull<u8>>
        where
            P: Platform,
    {
        if self.state() == GrowthState::Growing {
            self.grow(slot_size, layout, platform)?;
        }

        debug_assert_eq!(GrowthState::Ready, self.state());

        let slot = self.cursor;
        self.cursor += slot_size;

        NonNull::new(slot as *mut u8)
    }

    //  Acquires a new block, and points cursor and boundary at its usable region.
    //
    //  The usable region starts at the first multiple of `slot_size` past the block header, and ends at the end of
    //  the last whole slot.
    #[cold]
    #[inline(never)]
    fn grow<P>(&mut self, slot_size: usize, layout: Layout, platform: &P) -> Option<()>
        where
            P: Platform,
    {
        //  Safety:
        //  -   `layout` has a non-zero size, as validated by the Configuration.
        let block = match unsafe { platform.allocate(layout) } {
            Some(block) => block,
            None => {
                error!(slot_size, block_size = layout.size(), "platform failed to supply a new block");
                return None;
            }
        };

        //  Every slot address within the block must survive packing in the free list head.
        let last = block.as_ptr() as usize + (layout.size() - 1);

        if !Versioned::can_hold(last) {
            error!(slot_size, block = ?block, "platform supplied a block beyond the addressable range");

            //  Safety:
            //  -   `block` was allocated by `platform`, with `layout`, and never used.
            unsafe { platform.deallocate(block, layout) };
            return None;
        }

        //  Safety:
        //  -   `block` is aligned for a pointer, as per `layout`.
        //  -   `block` is freshly allocated, hence exclusively owned.
        let body = unsafe { self.blocks.link(block) };

        let end = block.as_ptr() as usize + layout.size();
        let first = body + padding_for(body, slot_size);
        debug_assert!(first + slot_size <= end, "Block of {} bytes too small for {}", layout.size(), slot_size);

        let slots = (end - first) / slot_size;

        self.cursor = first;
        self.boundary = first + slots * slot_size;

        debug!(slot_size, slots, blocks = self.blocks.len(), "acquired new block");

        Some(())
    }
}

// mod tests
