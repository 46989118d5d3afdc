//! Placer: locating a fit and splitting off the surplus.

use crate::block::{BlockPtr, MIN_BLOCK_SIZE};
use crate::freelist::{FreeLists, NUM_BUCKETS, findindex};
use crate::header;

/// How many further candidates in a bucket to examine after the first fit,
/// looking for a smaller surplus. A tuned heuristic, not a correctness
/// requirement.
const BEST_FIT_LOOKAHEAD: usize = 10;

/// Locate a free block of size `>= asize`, or `BlockPtr::NULL` if none
/// exists in any bucket from `findindex(asize)` upward.
///
/// # Safety
/// Every block reachable from `free_lists` must be a valid free block.
pub(crate) unsafe fn find_fit(free_lists: &FreeLists, asize: usize) -> BlockPtr {
    let mut bucket = findindex(asize);

    while bucket < NUM_BUCKETS {
        let mut current = free_lists.head(bucket);

        while !current.is_null() {
            let size = unsafe { header::get_size(current) };
            if size >= asize && !unsafe { header::get_alloc(current) } {
                return unsafe { refine_fit(current, size - asize, asize) };
            }
            current = unsafe { current.fwd() };
        }

        bucket += 1;
    }

    BlockPtr::NULL
}

/// From `first_fit` (surplus `first_surplus`), look ahead up to
/// `BEST_FIT_LOOKAHEAD` further candidates in the same bucket for a smaller
/// surplus, stopping immediately on an exact fit.
unsafe fn refine_fit(first_fit: BlockPtr, first_surplus: usize, asize: usize) -> BlockPtr {
    if first_surplus == 0 {
        return first_fit;
    }

    let mut best = first_fit;
    let mut best_surplus = first_surplus;
    let mut candidate = unsafe { first_fit.fwd() };
    let mut scanned = 0;

    while scanned < BEST_FIT_LOOKAHEAD && !candidate.is_null() {
        scanned += 1;
        let size = unsafe { header::get_size(candidate) };
        if size >= asize {
            let surplus = size - asize;
            if surplus == 0 {
                return candidate;
            }
            if surplus < best_surplus {
                best = candidate;
                best_surplus = surplus;
            }
        }
        candidate = unsafe { candidate.fwd() };
    }

    best
}

/// Split surplus off a block already marked allocated at its *original*
/// size. Carves a mini remainder when exactly 16 bytes are left over, a
/// full normal remainder when `>= 32` bytes are left over, and leaves the
/// block untouched when there is no surplus.
///
/// # Safety
/// `b` must be allocated with its pre-split size still in its header, and
/// must not currently be linked into any bucket.
pub(crate) unsafe fn split_block(free_lists: &mut FreeLists, b: BlockPtr, asize: usize) {
    let block_size = unsafe { header::get_size(b) };
    let rem = block_size - asize;

    if rem == 0 {
        let next = unsafe { crate::block::next(b) };
        unsafe { header::stamp_prev_bits(next, true, asize == MIN_BLOCK_SIZE) };
        return;
    }

    unsafe { header::write_size_alloc(b, asize, true) };
    let remainder = unsafe { b.byte_add(asize) };
    unsafe { header::write_full(remainder, rem, false) };
    unsafe {
        header::write_prev_alloc(remainder, true);
        header::write_prev_mini(remainder, asize == MIN_BLOCK_SIZE);
    }

    let after_remainder = unsafe { crate::block::next(remainder) };
    unsafe { header::stamp_prev_bits(after_remainder, false, rem == MIN_BLOCK_SIZE) };

    unsafe { free_lists.link(remainder) };
}
