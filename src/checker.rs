//! Debug heap checker: walks the implicit block list and every
//! bucket, logging and returning `false` on the first invariant violated
//! rather than panicking — a debug aid, not a recovery mechanism.

use crate::block::{BlockPtr, MIN_BLOCK_SIZE, WSIZE};
use crate::error::Invariant;
use crate::freelist::{NUM_BUCKETS, findindex};
use crate::header;
use crate::heap::SegregatedHeap;
use crate::host::HeapHost;
use crate::klog::kalloc_warn;

fn fail(line_hint: i32, invariant: Invariant) -> bool {
    kalloc_warn!("heap check failed near line {line_hint}: {invariant}");
    false
}

pub(crate) fn check<H: HeapHost>(heap: &SegregatedHeap<H>, line_hint: i32) -> bool {
    check_prologue(heap, line_hint)
        && check_implicit_list(heap, line_hint)
        && check_buckets(heap, line_hint)
}

fn check_prologue<H: HeapHost>(heap: &SegregatedHeap<H>, line_hint: i32) -> bool {
    let prologue = unsafe { heap.heap_origin().byte_sub(WSIZE) };
    let size = unsafe { header::get_size(prologue) };
    let alloc = unsafe { header::get_alloc(prologue) };
    if size != 0 || !alloc {
        return fail(line_hint, Invariant::MissingPrologueFooter);
    }
    true
}

/// Walk origin..epilogue, checking each block's own shape and its
/// `prev-alloc`/`prev-mini` bits against the predecessor actually observed
/// during the walk. Also checks the epilogue's own prev-bits, since they
/// are held to the same standard as any other block's.
fn check_implicit_list<H: HeapHost>(heap: &SegregatedHeap<H>, line_hint: i32) -> bool {
    let mut block = heap.heap_origin();
    let mut prev_alloc = true;
    let mut prev_size: usize = 0;

    while !unsafe { header::is_epilogue(block) } {
        let size = unsafe { header::get_size(block) };
        if size < MIN_BLOCK_SIZE || size % MIN_BLOCK_SIZE != 0 {
            return fail(line_hint, Invariant::BlockSizeNotAligned);
        }

        let alloc = unsafe { header::get_alloc(block) };
        if !alloc && size >= MIN_BLOCK_SIZE * 2 {
            let header_word = unsafe { block.read_word(0) };
            let footer_word = unsafe { block.read_word(size - WSIZE) };
            if header_word != footer_word {
                return fail(line_hint, Invariant::FooterMismatch);
            }
        }

        if !alloc && !prev_alloc {
            return fail(line_hint, Invariant::AdjacentFreeBlocks);
        }

        if unsafe { header::get_prev_alloc(block) } != prev_alloc {
            return fail(line_hint, Invariant::PrevAllocMismatch);
        }
        if unsafe { header::get_prev_mini(block) } != (prev_size == MIN_BLOCK_SIZE) {
            return fail(line_hint, Invariant::PrevMiniMismatch);
        }

        prev_alloc = alloc;
        prev_size = size;
        block = unsafe { crate::block::next(block) };
    }

    if unsafe { header::get_prev_alloc(block) } != prev_alloc {
        return fail(line_hint, Invariant::PrevAllocMismatch);
    }
    if unsafe { header::get_prev_mini(block) } != (prev_size == MIN_BLOCK_SIZE) {
        return fail(line_hint, Invariant::PrevMiniMismatch);
    }

    // The epilogue word sits exactly at `heap_hi - 8`, so every byte of
    // the span is accounted for by either a block or a sentinel.
    if unsafe { block.byte_add(WSIZE) }.0 != heap.heap_hi() {
        return fail(line_hint, Invariant::BlockSizeNotAligned);
    }

    true
}

/// Walk all 14 buckets. An earlier version of this checker only scanned
/// the first four, almost certainly an oversight rather than a deliberate
/// limit, so every bucket is checked here.
fn check_buckets<H: HeapHost>(heap: &SegregatedHeap<H>, line_hint: i32) -> bool {
    let free_lists = heap.free_lists();

    for bucket in 0..NUM_BUCKETS {
        let mut current = free_lists.head(bucket);
        let mut back = BlockPtr::NULL;

        while !current.is_null() {
            if unsafe { header::get_alloc(current) } {
                return fail(line_hint, Invariant::BucketMismatch);
            }
            let size = unsafe { header::get_size(current) };
            if findindex(size) != bucket {
                return fail(line_hint, Invariant::BucketMismatch);
            }
            if bucket != 0 && unsafe { current.back() } != back {
                return fail(line_hint, Invariant::BrokenDoublyLink);
            }

            back = current;
            current = unsafe { current.fwd() };
        }
    }

    true
}
