//! Heap lifecycle and public API: owns the prologue, bucket array, and
//! host handle, and exposes `alloc`/`free`/`realloc`/`calloc` over them.

use crate::align;
use crate::block::{BlockPtr, DSIZE, MIN_BLOCK_SIZE, WSIZE};
use crate::checker;
use crate::coalesce;
use crate::error::{HeapError, HeapResult};
use crate::freelist::FreeLists;
use crate::header;
use crate::host::HeapHost;
use crate::klog::{kalloc_trace, kalloc_warn};
use crate::place;

/// Default extension granularity. Also the floor for any `extend`
/// triggered by an allocation request too large for a single chunk —
/// extension always grows by at least this much.
pub const CHUNKSIZE: usize = 4096;

/// A segregated explicit-free-list heap built on top of a [`HeapHost`].
///
/// `heap_origin` and the bucket array are the allocator's process-wide
/// state. A separately-maintained `{prev-alloc, prev-mini}` cache for the
/// block bordering the epilogue is not carried as a field here — the
/// outgoing epilogue word already holds valid prev-bits for whatever
/// block currently sits to its left, so `extend` reads them directly off
/// it instead of threading a second copy that could drift out of sync.
pub struct SegregatedHeap<H: HeapHost> {
    host: H,
    heap_origin: BlockPtr,
    free_lists: FreeLists,
}

// SAFETY: `SegregatedHeap` only exposes its raw `BlockPtr` fields through
// `&mut self` methods, so a single owning thread at a time ever touches
// them; this mirrors `fzkernel`'s `NullLock<T>`, which manually vouches for
// `Send`/`Sync` on a type whose fields are raw pointers with no inherent
// thread-safety of their own. Required for `LockedHeap<H>`'s
// `spin::Mutex<SegregatedHeap<H>>` to be `Sync`, which `#[global_allocator]`
// usage needs.
unsafe impl<H: HeapHost + Send> Send for SegregatedHeap<H> {}

impl<H: HeapHost> SegregatedHeap<H> {
    pub const fn new(host: H) -> Self {
        Self {
            host,
            heap_origin: BlockPtr::NULL,
            free_lists: FreeLists::new(),
        }
    }

    pub(crate) fn free_lists(&self) -> &FreeLists {
        &self.free_lists
    }

    pub(crate) fn heap_origin(&self) -> BlockPtr {
        self.heap_origin
    }

    pub(crate) fn heap_hi(&self) -> *mut u8 {
        self.host.heap_hi()
    }

    /// Lay down the prologue/epilogue sentinels and obtain the first free
    /// block. Must be called once before any other operation.
    pub fn init(&mut self) -> HeapResult {
        let base = self
            .host
            .heap_extend(2 * WSIZE)
            .ok_or(HeapError::HostOutOfMemory)?;

        let prologue = BlockPtr(base);
        unsafe { header::write_full(prologue, 0, true) };

        let epilogue = unsafe { prologue.byte_add(WSIZE) };
        unsafe { header::write_full(epilogue, 0, true) };
        // Prologue counts as "allocated"; it is not a mini block.
        unsafe { header::stamp_prev_bits(epilogue, true, false) };

        self.free_lists = FreeLists::new();
        self.heap_origin = epilogue;

        kalloc_trace!("heap initialized");
        unsafe { self.extend(CHUNKSIZE) }?;
        Ok(())
    }

    /// Grow the heap by at least `bytes` (rounded up to 16), reusing the
    /// outgoing epilogue's address as the new block's header.
    ///
    /// # Safety
    /// Must only be called with `self` already past `init`.
    unsafe fn extend(&mut self, bytes: usize) -> HeapResult<BlockPtr> {
        let bytes = align::align_up_usize(bytes, DSIZE).max(MIN_BLOCK_SIZE);

        let old_hi = self.host.heap_hi();
        let old_epilogue = BlockPtr(unsafe { old_hi.sub(WSIZE) });
        let prev_alloc = unsafe { header::get_prev_alloc(old_epilogue) };
        let prev_mini = unsafe { header::get_prev_mini(old_epilogue) };

        if self.host.heap_extend(bytes).is_none() {
            kalloc_warn!("heap extend of {bytes} bytes refused by host");
            return Err(HeapError::HostOutOfMemory);
        }

        let new_block = old_epilogue;
        unsafe {
            header::write_full(new_block, bytes, false);
            header::write_prev_alloc(new_block, prev_alloc);
            header::write_prev_mini(new_block, prev_mini);
        }

        let epilogue = unsafe { new_block.byte_add(bytes) };
        unsafe { header::write_full(epilogue, 0, true) };

        let merged = unsafe { coalesce::coalesce(&mut self.free_lists, new_block) };
        // The new block's right neighbor is always the epilogue, never a
        // free block, so every coalesce outcome here still borders it —
        // stamp its prev-bits from whatever block ended up there.
        let merged_size = unsafe { header::get_size(merged) };
        unsafe { header::stamp_prev_bits(epilogue, false, merged_size == MIN_BLOCK_SIZE) };

        kalloc_trace!("heap extended by {bytes} bytes");
        Ok(merged)
    }

    /// Allocate `size` bytes; `None` on `size == 0` or host exhaustion.
    pub fn alloc(&mut self, size: usize) -> Option<*mut u8> {
        if size == 0 {
            return None;
        }
        let asize = align::align_up_usize(size + WSIZE, DSIZE).max(MIN_BLOCK_SIZE);

        let mut fit = unsafe { place::find_fit(&self.free_lists, asize) };
        if fit.is_null() {
            let extend_size = asize.max(CHUNKSIZE);
            if let Err(err) = unsafe { self.extend(extend_size) } {
                kalloc_warn!("alloc({size}) failed: {err}");
                return None;
            }
            fit = unsafe { place::find_fit(&self.free_lists, asize) };
            if fit.is_null() {
                return None;
            }
        }

        unsafe {
            self.free_lists.unlink(fit);
            let original_size = header::get_size(fit);
            header::write_size_alloc(fit, original_size, true);
            place::split_block(&mut self.free_lists, fit, asize);
        }

        Some(unsafe { fit.data_ptr() })
    }

    /// Return a previously-allocated pointer. `None`/null is a no-op.
    pub fn free(&mut self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        let block = BlockPtr::from_data_ptr(ptr);
        let size = unsafe { header::get_size(block) };
        unsafe { header::write_size_alloc(block, size, false) };

        let next = unsafe { crate::block::next(block) };
        unsafe { header::stamp_prev_bits(next, false, size == MIN_BLOCK_SIZE) };

        unsafe { coalesce::coalesce(&mut self.free_lists, block) };
    }

    /// `size == 0` frees and returns `None`; a null `ptr` behaves as
    /// `alloc`; otherwise allocates fresh, copies `min(old, new)` payload
    /// bytes, frees the original, and returns the new pointer. No in-place
    /// growth is attempted.
    pub fn realloc(&mut self, ptr: *mut u8, size: usize) -> Option<*mut u8> {
        if size == 0 {
            self.free(ptr);
            return None;
        }
        if ptr.is_null() {
            return self.alloc(size);
        }

        let old_block = BlockPtr::from_data_ptr(ptr);
        let old_payload = unsafe { header::get_size(old_block) } - WSIZE;

        let new_ptr = self.alloc(size)?;
        let copy_len = old_payload.min(size);
        unsafe { core::ptr::copy_nonoverlapping(ptr, new_ptr, copy_len) };
        self.free(ptr);
        Some(new_ptr)
    }

    /// Overflow-checked `count * elem_size`; `None` on overflow or OOM,
    /// otherwise a zero-filled allocation.
    pub fn calloc(&mut self, count: usize, elem_size: usize) -> Option<*mut u8> {
        let total = count.checked_mul(elem_size)?;
        let ptr = self.alloc(total)?;
        unsafe { core::ptr::write_bytes(ptr, 0, total) };
        Some(ptr)
    }

    /// Debug-only invariant walk. `line_hint` is reported alongside any
    /// violation found, for callers that want to pinpoint which call site
    /// tripped the checker.
    pub fn check_heap(&self, line_hint: i32) -> bool {
        checker::check(self, line_hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VecHeapHost;

    fn fresh() -> SegregatedHeap<VecHeapHost> {
        let mut heap = SegregatedHeap::new(VecHeapHost::new());
        heap.init().expect("init should succeed against an unbounded fake host");
        heap
    }

    #[test]
    fn init_then_alloc_24() {
        let mut heap = fresh();
        let p = heap.alloc(24).expect("alloc(24) should succeed after init");
        assert_eq!(p as usize % 16, 0);
        assert!(heap.check_heap(line!() as i32));
    }

    #[test]
    fn split_to_mini() {
        // 4072 -> adjusted size 4080, leaving exactly 16 bytes of the
        // initial 4096-byte chunk: a mini remainder.
        let mut heap = fresh();
        let p = heap.alloc(4072).expect("alloc near the full chunk should succeed");
        assert_eq!(p as usize % 16, 0);
        assert!(heap.check_heap(line!() as i32));
    }

    #[test]
    fn mini_allocation_round_trips() {
        let mut heap = fresh();
        let p = heap.alloc(1).expect("alloc(1) should succeed");
        heap.free(p);
        assert!(heap.check_heap(line!() as i32));
    }

    #[test]
    fn coalesce_both_neighbors() {
        let mut heap = fresh();
        let a = heap.alloc(32).unwrap();
        let b = heap.alloc(32).unwrap();
        let c = heap.alloc(32).unwrap();
        heap.free(a);
        heap.free(c);
        heap.free(b);
        assert!(heap.check_heap(line!() as i32));
    }

    #[test]
    fn realloc_grow_then_shrink_preserves_bytes() {
        let mut heap = fresh();
        let p = heap.alloc(40).unwrap();
        unsafe { core::ptr::write_bytes(p, 0xAB, 40) };

        let q = heap.realloc(p, 200).expect("grow should succeed");
        let q_bytes = unsafe { core::slice::from_raw_parts(q, 40) };
        assert!(q_bytes.iter().all(|&b| b == 0xAB));

        let r = heap.realloc(q, 10).expect("shrink should succeed");
        let r_bytes = unsafe { core::slice::from_raw_parts(r, 10) };
        assert!(r_bytes.iter().all(|&b| b == 0xAB));
        assert!(heap.check_heap(line!() as i32));
    }

    #[test]
    fn realloc_zero_frees_and_returns_none() {
        let mut heap = fresh();
        let p = heap.alloc(16).unwrap();
        assert!(heap.realloc(p, 0).is_none());
        assert!(heap.check_heap(line!() as i32));
    }

    #[test]
    fn calloc_zeroes_payload() {
        let mut heap = fresh();
        let p = heap.calloc(8, 4).expect("calloc should succeed");
        let bytes = unsafe { core::slice::from_raw_parts(p, 32) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn calloc_overflow_returns_none() {
        let mut heap = fresh();
        assert!(heap.calloc(usize::MAX, 2).is_none());
    }

    #[test]
    fn oom_leaves_heap_checkable() {
        let mut heap = SegregatedHeap::new(VecHeapHost::with_limit(CHUNKSIZE * 4));
        heap.init().expect("init should succeed within the limit");
        loop {
            if heap.alloc(CHUNKSIZE).is_none() {
                break;
            }
        }
        assert!(heap.check_heap(line!() as i32));
    }
}
