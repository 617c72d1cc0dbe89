//! Implementation of the Platform on top of the system allocator.

use std::{
    alloc::{GlobalAlloc, Layout, System},
    ptr::NonNull,
};

use slotpool_core::Platform;

/// Implementation of the Platform trait, forwarding to `std::alloc::System`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPlatform;

impl SystemPlatform {
    /// Creates an instance.
    pub const fn new() -> Self { Self }
}

impl Platform for SystemPlatform {
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0);

        NonNull::new(System.alloc(layout))
    }

    unsafe fn deallocate(&self, pointer: NonNull<u8>, layout: Layout) {
        System.dealloc(pointer.as_ptr(), layout);
    }
}
