//! Building bricks for the FreeList.

use core::{
    ptr::NonNull,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

/// Slot
///
/// The overlay of a free slot: its first word links to the next free slot, or is 0.
#[repr(C)]
pub(crate) struct Slot {
    next: AtomicUsize,
}

impl Slot {
    /// Reinterprets raw storage as a Slot.
    ///
    /// #   Safety
    ///
    /// -   Assumes `storage` is aligned for `usize`, and spans at least `size_of::<usize>()` bytes.
    pub(crate) unsafe fn from_storage(storage: NonNull<u8>) -> NonNull<Slot> {
        debug_assert!(storage.as_ptr() as usize % core::mem::align_of::<Slot>() == 0);

        storage.cast()
    }

    /// Returns the address of the next free slot, or 0.
    ///
    /// The read is Relaxed: the Acquire load of the head it was reached from synchronizes with the Release publication
    /// of the slot.
    pub(crate) fn next(&self) -> usize { self.next.load(Ordering::Relaxed) }

    /// Sets the address of the next free slot, or 0.
    pub(crate) fn set_next(&self, next: usize) { self.next.store(next, Ordering::Relaxed) }

    /// Returns the address of the slot.
    pub(crate) fn address(slot: NonNull<Slot>) -> usize { slot.as_ptr() as usize }

    /// Returns the slot at `address`, if not 0.
    pub(crate) fn at(address: usize) -> Option<NonNull<Slot>> { NonNull::new(address as *mut Slot) }
}

/// Versioned
///
/// A slot address packed together with a wrapping tag.
///
/// The tag is bumped on every successful exchange, so that a head which was popped, then pushed back, no longer
/// compares equal to a stale copy of itself.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Versioned(u64);

impl Versioned {
    /// An empty head, with a tag of 0.
    pub(crate) const EMPTY: Versioned = Versioned(0);

    /// Returns whether `address` fits in the address bits, and thus can be packed without loss.
    pub(crate) fn can_hold(address: usize) -> bool { (address as u64) & !ADDRESS_MASK == 0 }

    /// Packs `address` and `tag`; the tag is truncated to the remaining bits.
    ///
    /// `address` must satisfy `can_hold`.
    pub(crate) fn new(address: usize, tag: u64) -> Self {
        let address = address as u64;
        debug_assert_eq!(0, address & !ADDRESS_MASK, "Address {:x} exceeds {} bits", address, ADDRESS_BITS);

        Self(((tag & TAG_MASK) << ADDRESS_BITS) | address)
    }

    /// Returns the address, 0 if empty.
    pub(crate) fn address(&self) -> usize { (self.0 & ADDRESS_MASK) as usize }

    /// Returns the tag.
    pub(crate) fn tag(&self) -> u64 { self.0 >> ADDRESS_BITS }

    /// Returns the head replacing this one, pointing to `address`.
    pub(crate) fn successor(&self, address: usize) -> Self { Self::new(address, self.tag().wrapping_add(1)) }
}

//  Automatically uses Acquire/Release, to synchronize the links of the slots.
pub(crate) struct AtomicHead(AtomicU64);

impl AtomicHead {
    pub(crate) fn new() -> Self { Self(AtomicU64::new(Versioned::EMPTY.0)) }

    pub(crate) fn load(&self) -> Versioned { Versioned(self.0.load(Ordering::Acquire)) }

    pub(crate) fn compare_exchange_weak(&self, current: Versioned, new: Versioned) -> Result<Versioned, Versioned> {
        self.0.compare_exchange_weak(current.0, new.0, Ordering::AcqRel, Ordering::Acquire)
            .map(Versioned)
            .map_err(Versioned)
    }
}

impl Default for AtomicHead {
    fn default() -> Self { Self::new() }
}

//
//  Implementation
//

//  User-space addresses fit within 48 bits on 64-bits platforms, leaving 16 bits of tag.
#[cfg(target_pointer_width = "64")]
const ADDRESS_BITS: u32 = 48;

//  On 32-bits platforms, the address and the tag each get half of the word.
#[cfg(not(target_pointer_width = "64"))]
const ADDRESS_BITS: u32 = 32;

const ADDRESS_MASK: u64 = (1u64 << ADDRESS_BITS) - 1;

const TAG_MASK: u64 = u64::MAX >> ADDRESS_BITS;

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn versioned_empty() {
    assert_eq!(0, Versioned::EMPTY.address());
    assert_eq!(0, Versioned::EMPTY.tag());
}

#[test]
fn versioned_pack_unpack() {
    let versioned = Versioned::new(0x1234_5678, 3);

    assert_eq!(0x1234_5678, versioned.address());
    assert_eq!(3, versioned.tag());
}

#[test]
fn versioned_successor() {
    let first = Versioned::new(0x1000, 7);
    let second = first.successor(0x2000);

    assert_eq!(0x2000, second.address());
    assert_eq!(8, second.tag());

    //  Same address, different tag: not equal.
    let third = second.successor(0x1000);
    assert_eq!(first.address(), third.address());
    assert_ne!(first, third);
}

#[test]
fn versioned_can_hold() {
    assert!(Versioned::can_hold(0));
    assert!(Versioned::can_hold(0x7fff_1234_5678));
    assert!(Versioned::can_hold(ADDRESS_MASK as usize));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn versioned_cannot_hold_top_bits() {
    //  Top-byte tagged pointer, as handed out by some aarch64 allocators.
    assert!(!Versioned::can_hold(0xb400_0070_1234_5678));
    assert!(!Versioned::can_hold(1 << 48));
}

#[test]
fn versioned_tag_wraps() {
    let last = Versioned::new(0x1000, TAG_MASK);
    let wrapped = last.successor(0x1000);

    assert_eq!(0, wrapped.tag());
    assert_eq!(0x1000, wrapped.address());
}

#[test]
fn atomic_head_compare_exchange() {
    let head = AtomicHead::default();
    let current = head.load();

    assert_eq!(Versioned::EMPTY, current);

    let next = current.successor(0x4000);
    assert_eq!(Ok(current), head.compare_exchange_weak_until_done(current, next));
    assert_eq!(Err(next), head.compare_exchange_weak(current, next));
    assert_eq!(next, head.load());
}

impl AtomicHead {
    //  compare_exchange_weak may fail spuriously.
    fn compare_exchange_weak_until_done(&self, current: Versioned, new: Versioned) -> Result<Versioned, Versioned> {
        loop {
            match self.compare_exchange_weak(current, new) {
                Err(actual) if actual == current => continue,
                result => return result,
            }
        }
    }
}

#[test]
fn slot_next() {
    let mut storage = [0usize; 2];
    let storage = NonNull::from(&mut storage).cast::<u8>();

    let slot = unsafe { Slot::from_storage(storage) };
    let slot = unsafe { slot.as_ref() };

    assert_eq!(0, slot.next());

    slot.set_next(0x8000);
    assert_eq!(0x8000, slot.next());
}

}
