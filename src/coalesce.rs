//! Coalescer: merge a newly-freed block with free neighbors.

use crate::block::{BlockPtr, MIN_BLOCK_SIZE, WSIZE};
use crate::freelist::FreeLists;
use crate::header;

/// Zero a free block's header and (if it has one) footer, once its size is
/// known, so no stale boundary tag survives inside a merged region.
unsafe fn erase(block: BlockPtr, size: usize) {
    unsafe { block.write_word(0, 0) };
    if size >= MIN_BLOCK_SIZE * 2 {
        unsafe { block.write_word(size - WSIZE, 0) };
    }
}

/// Merge `b` — just marked free, with `next(b)`'s `prev-alloc` bit already
/// cleared by the caller — with whichever free neighbors it has, and link
/// the resulting block into its bucket. Returns the (possibly merged)
/// block, which is always the leftmost surviving address.
///
/// # Safety
/// `b` must be a free block not currently linked into any bucket; its
/// physical neighbors (if free) must be properly linked blocks.
pub(crate) unsafe fn coalesce(free_lists: &mut FreeLists, b: BlockPtr) -> BlockPtr {
    let left_free = !unsafe { header::get_prev_alloc(b) };
    let next_b = unsafe { crate::block::next(b) };
    let right_free = !unsafe { header::get_alloc(next_b) } && !unsafe { header::is_epilogue(next_b) };

    if !left_free && !right_free {
        unsafe { free_lists.link(b) };
        return b;
    }

    if !left_free && right_free {
        let right = next_b;
        let b_size = unsafe { header::get_size(b) };
        let right_size = unsafe { header::get_size(right) };
        unsafe {
            free_lists.unlink(right);
            erase(right, right_size);
            header::write_size_alloc(b, b_size + right_size, false);
        }
        let after = unsafe { crate::block::next(b) };
        unsafe {
            header::stamp_prev_bits(after, false, false);
            free_lists.link(b);
        }
        return b;
    }

    if left_free && !right_free {
        let left = unsafe { crate::block::prev(b) };
        let left_size = unsafe { header::get_size(left) };
        let b_size = unsafe { header::get_size(b) };
        unsafe {
            free_lists.unlink(left);
            erase(b, b_size);
            header::write_size_alloc(left, left_size + b_size, false);
        }
        let after = unsafe { crate::block::next(left) };
        unsafe {
            header::stamp_prev_bits(after, false, false);
            free_lists.link(left);
        }
        return left;
    }

    // Both neighbors are free: absorb left, b, and right into one block.
    let left = unsafe { crate::block::prev(b) };
    let right = next_b;
    let left_size = unsafe { header::get_size(left) };
    let b_size = unsafe { header::get_size(b) };
    let right_size = unsafe { header::get_size(right) };
    unsafe {
        free_lists.unlink(left);
        free_lists.unlink(right);
        erase(b, b_size);
        erase(right, right_size);
        header::write_size_alloc(left, left_size + b_size + right_size, false);
    }
    let after = unsafe { crate::block::next(left) };
    unsafe {
        header::stamp_prev_bits(after, false, false);
        free_lists.link(left);
    }
    left
}
