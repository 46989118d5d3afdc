//! A segregated explicit-free-list heap allocator over a flat,
//! monotonically-growing byte region obtained from a host `sbrk`-like
//! primitive (see [`HeapHost`]).
//!
//! The block manager — header codec, block navigator, free-list index,
//! coalescer, placer, and heap lifecycle — is the entire subject of this
//! crate; everything it needs from its environment (extending the region,
//! logging) is taken as an explicit collaborator rather than assumed.
#![cfg_attr(not(test), no_std)]

mod align;
mod block;
mod checker;
mod coalesce;
mod error;
mod freelist;
mod header;
mod heap;
mod host;
mod klog;
mod place;

#[cfg(feature = "locked")]
mod locked;

#[cfg(test)]
mod testing;

pub use error::{HeapError, HeapResult, Invariant};
pub use heap::{CHUNKSIZE, SegregatedHeap};
pub use host::HeapHost;
pub use klog::{Level, set_backend, set_level};

#[cfg(feature = "locked")]
pub use locked::LockedHeap;
