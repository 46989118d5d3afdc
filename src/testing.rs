//! `std`-backed [`HeapHost`] fake used by the test suite, standing in for
//! a real `sbrk` so the block manager can be exercised without a kernel
//! or libc underneath it.

use crate::host::HeapHost;

/// Ample headroom for unit tests; every [`VecHeapHost::new`] fake reserves
/// this much capacity up front so a `resize` inside `heap_extend` never
/// reallocates the backing `Vec` and invalidates pointers already handed
/// out to the allocator under test.
const DEFAULT_CAPACITY: usize = 1 << 20;

pub(crate) struct VecHeapHost {
    region: Vec<u8>,
    limit: usize,
}

impl VecHeapHost {
    pub(crate) fn new() -> Self {
        Self::with_limit(DEFAULT_CAPACITY)
    }

    /// A fake capped at `limit` bytes, for exercising the OOM path.
    pub(crate) fn with_limit(limit: usize) -> Self {
        Self {
            region: Vec::with_capacity(limit),
            limit,
        }
    }
}

unsafe impl HeapHost for VecHeapHost {
    fn heap_extend(&mut self, bytes: usize) -> Option<*mut u8> {
        let start = self.region.len();
        if start + bytes > self.limit {
            return None;
        }
        self.region.resize(start + bytes, 0);
        Some(unsafe { self.region.as_mut_ptr().add(start) })
    }

    fn heap_hi(&self) -> *mut u8 {
        unsafe { self.region.as_ptr().add(self.region.len()) as *mut u8 }
    }
}
