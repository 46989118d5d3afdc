//! Optional `GlobalAlloc` wrapper, enabled by the `locked` feature.
//!
//! The allocator core itself stays single-threaded and unlocked by design;
//! this is the thin shell around it for callers that do want to register
//! it as the process allocator. Mirrors `fzkernel`'s
//! `LockedBuddyAllocator`-over-`BuddyAllocator` shape: the lock lives in
//! the wrapper, not the allocator it wraps.

use core::alloc::{GlobalAlloc, Layout};

use spin::Mutex;

use crate::error::HeapResult;
use crate::heap::SegregatedHeap;
use crate::host::HeapHost;

pub struct LockedHeap<H: HeapHost>(Mutex<SegregatedHeap<H>>);

impl<H: HeapHost> LockedHeap<H> {
    pub const fn new(host: H) -> Self {
        Self(Mutex::new(SegregatedHeap::new(host)))
    }

    pub fn init(&self) -> HeapResult {
        self.0.lock().init()
    }
}

unsafe impl<H: HeapHost> GlobalAlloc for LockedHeap<H> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() > 16 {
            return core::ptr::null_mut();
        }
        self.0
            .lock()
            .alloc(layout.size())
            .unwrap_or(core::ptr::null_mut())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        self.0.lock().free(ptr);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if layout.align() > 16 {
            return core::ptr::null_mut();
        }
        self.0
            .lock()
            .realloc(ptr, new_size)
            .unwrap_or(core::ptr::null_mut())
    }
}
