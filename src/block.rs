//! Block representation and the implicit-list navigator.

use crate::header;

/// Word size in bytes. The header, footer, and every link slot are one word.
pub(crate) const WSIZE: usize = core::mem::size_of::<u64>();
/// Double-word size; also the minimum block size and the allocator's
/// alignment granularity.
pub(crate) const DSIZE: usize = 2 * WSIZE;
/// A block below this size cannot exist; `DSIZE` itself is the mini-block
/// size (header + one payload word, no footer).
pub(crate) const MIN_BLOCK_SIZE: usize = DSIZE;

/// Offset of the forward link from the start of a free block's header.
pub(crate) const FWD_OFFSET: usize = WSIZE;
/// Offset of the back link from the start of a free, non-mini block's header.
pub(crate) const BACK_OFFSET: usize = 2 * WSIZE;

/// A pointer to a block's header word. `NULL` stands in for "no block";
/// every accessor here treats a null block as size 0 / not-allocated, so
/// callers at the ends of the block chain don't need a separate check.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct BlockPtr(pub *mut u8);

impl BlockPtr {
    pub(crate) const NULL: BlockPtr = BlockPtr(core::ptr::null_mut());

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self.0.is_null()
    }

    /// # Safety
    /// `self.0 + offset` must be valid for an 8-byte read.
    #[inline]
    pub(crate) unsafe fn read_word(self, offset: usize) -> u64 {
        unsafe { (self.0.add(offset) as *const u64).read() }
    }

    /// # Safety
    /// `self.0 + offset` must be valid for an 8-byte write.
    #[inline]
    pub(crate) unsafe fn write_word(self, offset: usize, value: u64) {
        unsafe { (self.0.add(offset) as *mut u64).write(value) }
    }

    #[inline]
    pub(crate) unsafe fn byte_add(self, bytes: usize) -> BlockPtr {
        BlockPtr(unsafe { self.0.add(bytes) })
    }

    #[inline]
    pub(crate) unsafe fn byte_sub(self, bytes: usize) -> BlockPtr {
        BlockPtr(unsafe { self.0.sub(bytes) })
    }

    /// Forward free-list link, valid only while the block is free.
    #[inline]
    pub(crate) unsafe fn fwd(self) -> BlockPtr {
        BlockPtr(unsafe { self.read_word(FWD_OFFSET) as *mut u8 })
    }

    #[inline]
    pub(crate) unsafe fn set_fwd(self, value: BlockPtr) {
        unsafe { self.write_word(FWD_OFFSET, value.0 as u64) }
    }

    /// Back free-list link; only meaningful for non-mini free blocks.
    #[inline]
    pub(crate) unsafe fn back(self) -> BlockPtr {
        BlockPtr(unsafe { self.read_word(BACK_OFFSET) as *mut u8 })
    }

    #[inline]
    pub(crate) unsafe fn set_back(self, value: BlockPtr) {
        unsafe { self.write_word(BACK_OFFSET, value.0 as u64) }
    }

    /// Payload pointer handed out to callers: one word past the header.
    #[inline]
    pub(crate) unsafe fn data_ptr(self) -> *mut u8 {
        unsafe { self.0.add(WSIZE) }
    }

    #[inline]
    pub(crate) fn from_data_ptr(ptr: *mut u8) -> BlockPtr {
        BlockPtr(unsafe { ptr.sub(WSIZE) })
    }
}

/// Next consecutive block on the heap. Undefined on the epilogue, whose
/// size is 0.
///
/// # Safety
/// `block` must not be the epilogue.
pub(crate) unsafe fn next(block: BlockPtr) -> BlockPtr {
    unsafe { block.byte_add(header::get_size(block)) }
}

/// Previous consecutive block, or `BlockPtr::NULL` if `block` is the first
/// real block on the heap (its left neighbor is the prologue).
///
/// Uses the dual scheme: a mini left neighbor is found via
/// the `prev-mini` bit (no footer to read); otherwise the word immediately
/// before `block` is read as a footer.
///
/// # Safety
/// `block` must be a valid block with a readable word preceding it.
pub(crate) unsafe fn prev(block: BlockPtr) -> BlockPtr {
    if unsafe { header::get_prev_mini(block) } {
        return unsafe { block.byte_sub(MIN_BLOCK_SIZE) };
    }
    let footer = unsafe { block.byte_sub(WSIZE) };
    let size = (unsafe { footer.read_word(0) } & header::SIZE_MASK) as usize;
    if size == 0 {
        return BlockPtr::NULL;
    }
    unsafe { block.byte_sub(size) }
}
