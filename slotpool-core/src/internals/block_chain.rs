//! Chain of the blocks acquired by an Arena.
//!
//! Each block starts with a header linking to the previously acquired block; the chain is only ever walked to return
//! the blocks to the Platform.

use core::{
    alloc::Layout,
    mem,
    ptr::{self, NonNull},
};

use crate::Platform;

/// BlockChain
///
/// The owner of the blocks of an Arena, most recently acquired first.
pub(crate) struct BlockChain {
    head: Option<NonNull<BlockHeader>>,
    length: usize,
}

impl BlockChain {
    /// Creates an empty chain.
    pub(crate) fn new() -> Self { Self { head: None, length: 0 } }

    /// Returns the number of blocks in the chain.
    pub(crate) fn len(&self) -> usize { self.length }

    /// Returns the most recently linked block, if any.
    #[cfg(test)]
    pub(crate) fn head(&self) -> Option<NonNull<u8>> { self.head.map(NonNull::cast) }

    /// Links `block` at the head of the chain.
    ///
    /// Returns the address of the first byte past the header, from which slots may be carved.
    ///
    /// #   Safety
    ///
    /// -   Assumes `block` is aligned for a pointer, and large enough to hold the header.
    /// -   Assumes `block` is exclusively owned by the chain from now on.
    pub(crate) unsafe fn link(&mut self, block: NonNull<u8>) -> usize {
        let header = block.cast::<BlockHeader>();

        ptr::write(header.as_ptr(), BlockHeader { previous: self.head });

        self.head = Some(header);
        self.length += 1;

        block.as_ptr() as usize + mem::size_of::<BlockHeader>()
    }

    /// Returns all blocks to the `platform`, leaving the chain empty.
    ///
    /// #   Safety
    ///
    /// -   Assumes all blocks were allocated by `platform`, with `layout`.
    /// -   Assumes no slot carved out of the blocks is referenced any longer.
    pub(crate) unsafe fn release<P>(&mut self, platform: &P, layout: Layout)
        where
            P: Platform,
    {
        while let Some(header) = self.head {
            self.head = header.as_ref().previous;
            self.length -= 1;

            platform.deallocate(header.cast(), layout);
        }

        debug_assert_eq!(0, self.length);
    }
}

impl Default for BlockChain {
    fn default() -> Self { Self::new() }
}

//  Safety:
//  -   The blocks are exclusively owned by the chain, and the chain is only ever accessed under the Arena lock.
unsafe impl Send for BlockChain {}

//
//  Implementation
//

#[repr(C)]
struct BlockHeader {
    previous: Option<NonNull<BlockHeader>>,
}

// mod tests
