//! Header word codec: packs `{size, prev-mini, prev-alloc, alloc}` into a
//! single 64-bit word, and keeps the optional footer mirrored to it for
//! free, non-mini blocks.

use crate::block::{BlockPtr, WSIZE};

const ALLOC_BIT: u64 = 0x1;
const PREV_ALLOC_BIT: u64 = 0x2;
const PREV_MINI_BIT: u64 = 0x4;
pub(crate) const SIZE_MASK: u64 = !0xF;
const STATUS_MASK: u64 = 0xF;

/// Combine `size` and the `alloc` bit into a packed header/footer word.
/// Other status bits are left clear — callers that need to preserve
/// `prev-alloc`/`prev-mini` use [`write_size_alloc`] instead.
#[inline]
pub(crate) fn pack(size: usize, alloc: bool) -> u64 {
    let mut word = size as u64;
    if alloc {
        word |= ALLOC_BIT;
    }
    word
}

#[inline]
pub(crate) unsafe fn get_size(block: BlockPtr) -> usize {
    if block.is_null() {
        return 0;
    }
    (unsafe { block.read_word(0) } & SIZE_MASK) as usize
}

#[inline]
pub(crate) unsafe fn get_alloc(block: BlockPtr) -> bool {
    if block.is_null() {
        return false;
    }
    unsafe { block.read_word(0) } & ALLOC_BIT != 0
}

#[inline]
pub(crate) unsafe fn get_prev_alloc(block: BlockPtr) -> bool {
    if block.is_null() {
        return false;
    }
    unsafe { block.read_word(0) } & PREV_ALLOC_BIT != 0
}

#[inline]
pub(crate) unsafe fn get_prev_mini(block: BlockPtr) -> bool {
    if block.is_null() {
        return false;
    }
    unsafe { block.read_word(0) } & PREV_MINI_BIT != 0
}

/// A block encoded as `{size: 0, alloc: true}` — the prologue footer and
/// epilogue header sentinel shape.
#[inline]
pub(crate) unsafe fn is_epilogue(block: BlockPtr) -> bool {
    unsafe { get_size(block) == 0 && get_alloc(block) }
}

#[inline]
fn footer_offset(size: usize) -> usize {
    size - WSIZE
}

/// Write a fresh header (and, for `size >= 32`, a matching footer),
/// discarding whatever `prev-alloc`/`prev-mini` bits were there before.
/// Used only when a block's identity is being established from scratch
/// (heap init, extension) — callers stamp the prev-bits separately
/// afterwards via [`write_prev_alloc`]/[`write_prev_mini`].
///
/// # Safety
/// `block` must reference a writable region at least `size` bytes long.
pub(crate) unsafe fn write_full(block: BlockPtr, size: usize, alloc: bool) {
    let word = pack(size, alloc);
    unsafe { block.write_word(0, word) };
    if size >= crate::block::MIN_BLOCK_SIZE * 2 {
        unsafe { block.write_word(footer_offset(size), word) };
    }
}

/// Update `size`/`alloc` while preserving `prev-alloc`/`prev-mini`. Mirrors
/// the footer when the block ends up free and `size >= 32`. No-op on the
/// epilogue.
///
/// # Safety
/// `block` must reference a writable region at least `size` bytes long.
pub(crate) unsafe fn write_size_alloc(block: BlockPtr, size: usize, alloc: bool) {
    if unsafe { is_epilogue(block) } {
        return;
    }
    let status = unsafe { block.read_word(0) } & STATUS_MASK;
    let mut word = (size as u64) | (status & !ALLOC_BIT);
    if alloc {
        word |= ALLOC_BIT;
    }
    unsafe { block.write_word(0, word) };
    if size >= crate::block::MIN_BLOCK_SIZE * 2 && !alloc {
        unsafe { block.write_word(footer_offset(size), word) };
    }
}

/// Set or clear `prev-alloc`, mirroring the footer rule above.
///
/// # Safety
/// `block` must reference a valid block header.
pub(crate) unsafe fn write_prev_alloc(block: BlockPtr, bit: bool) {
    if unsafe { is_epilogue(block) } {
        return;
    }
    let mut word = unsafe { block.read_word(0) };
    word = if bit {
        word | PREV_ALLOC_BIT
    } else {
        word & !PREV_ALLOC_BIT
    };
    unsafe { block.write_word(0, word) };
    let size = unsafe { get_size(block) };
    if size >= crate::block::MIN_BLOCK_SIZE * 2 && !unsafe { get_alloc(block) } {
        unsafe { block.write_word(footer_offset(size), word) };
    }
}

/// Set or clear `prev-mini`, mirroring the footer rule above.
///
/// # Safety
/// `block` must reference a valid block header.
pub(crate) unsafe fn write_prev_mini(block: BlockPtr, bit: bool) {
    if unsafe { is_epilogue(block) } {
        return;
    }
    let mut word = unsafe { block.read_word(0) };
    word = if bit {
        word | PREV_MINI_BIT
    } else {
        word & !PREV_MINI_BIT
    };
    unsafe { block.write_word(0, word) };
    let size = unsafe { get_size(block) };
    if size >= crate::block::MIN_BLOCK_SIZE * 2 && !unsafe { get_alloc(block) } {
        unsafe { block.write_word(footer_offset(size), word) };
    }
}

/// Update `prev-alloc`/`prev-mini` on `block`, including when `block` is
/// the epilogue itself. [`write_prev_alloc`]/[`write_prev_mini`] refuse to
/// touch the epilogue's `size`/`alloc` fields by design, but its prev-bits
/// still have to track whatever real block now sits to its left, so this
/// bypasses the no-op guard for that one case.
///
/// # Safety
/// `block` must reference a valid block header.
pub(crate) unsafe fn stamp_prev_bits(block: BlockPtr, prev_alloc: bool, prev_mini: bool) {
    if unsafe { is_epilogue(block) } {
        let mut word = unsafe { block.read_word(0) } & !(PREV_ALLOC_BIT | PREV_MINI_BIT);
        if prev_alloc {
            word |= PREV_ALLOC_BIT;
        }
        if prev_mini {
            word |= PREV_MINI_BIT;
        }
        unsafe { block.write_word(0, word) };
        return;
    }
    unsafe {
        write_prev_alloc(block, prev_alloc);
        write_prev_mini(block, prev_mini);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_roundtrips_size_and_alloc() {
        let word = pack(48, true);
        assert_eq!(word & SIZE_MASK, 48);
        assert_eq!(word & 0x1, 1);
    }

    #[test]
    fn nil_block_reads_as_zero() {
        unsafe {
            assert_eq!(get_size(BlockPtr::NULL), 0);
            assert!(!get_alloc(BlockPtr::NULL));
            assert!(!get_prev_alloc(BlockPtr::NULL));
            assert!(!get_prev_mini(BlockPtr::NULL));
        }
    }
}
