//! Internal failure reporting for the allocator core.
//!
//! Public entry points (`alloc`, `free`, `realloc`, `calloc`) keep the C-ABI
//! contract of a possibly-null pointer; they never surface [`HeapError`]
//! directly. This type exists for the paths that can diagnose
//! *why* something failed — host extension refusal, and the debug heap
//! checker — so the reason can be logged before collapsing to `nil`.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The host primitive refused to extend the heap.
    HostOutOfMemory,
    /// `calloc`'s `count * elem_size` overflowed `usize`.
    SizeOverflow,
    /// The debug heap checker found a violated invariant.
    CorruptHeap(Invariant),
}

/// Which heap invariant the checker found broken, for diagnostic logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    BlockSizeNotAligned,
    FooterMismatch,
    AdjacentFreeBlocks,
    PrevAllocMismatch,
    PrevMiniMismatch,
    BucketMismatch,
    MissingPrologueFooter,
    BrokenDoublyLink,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostOutOfMemory => write!(f, "host heap extension refused"),
            Self::SizeOverflow => write!(f, "calloc size computation overflowed"),
            Self::CorruptHeap(invariant) => write!(f, "heap invariant violated: {invariant}"),
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockSizeNotAligned => write!(f, "block size not a multiple of 16"),
            Self::FooterMismatch => write!(f, "free block footer does not match header"),
            Self::AdjacentFreeBlocks => write!(f, "two adjacent free blocks were not coalesced"),
            Self::PrevAllocMismatch => write!(f, "prev-alloc bit disagrees with left neighbor"),
            Self::PrevMiniMismatch => write!(f, "prev-mini bit disagrees with left neighbor size"),
            Self::BucketMismatch => write!(f, "free block is not in its expected bucket"),
            Self::MissingPrologueFooter => write!(f, "prologue footer missing or corrupt"),
            Self::BrokenDoublyLink => write!(f, "doubly-linked bucket has an inconsistent back-link"),
        }
    }
}

pub type HeapResult<T = ()> = Result<T, HeapError>;
