//! The environment this allocator runs inside, expressed as a trait.
//!
//! Heap extension and the current high-water mark are treated as an
//! external collaborator (`heap_extend`/`heap_hi`) rather than something
//! the block manager owns. `slopos-mm`'s page allocator draws the same
//! line: `page_alloc.rs` never calls firmware or bootloader APIs directly,
//! it takes physical memory through a narrow interface and leaves
//! acquiring it to the caller. `HeapHost` is that interface here, so the
//! block manager can be exercised against a `Vec`-backed fake in tests
//! without any real `sbrk`.

/// A monotonically-growing flat byte region the allocator can extend.
///
/// # Safety
///
/// Implementors must uphold:
/// - `heap_extend` returns a pointer to *newly* committed, zeroed-or-not but
///   writable memory immediately following the previous `heap_hi()`, or
///   `None` if the region cannot grow.
/// - Memory already handed out by a prior `heap_extend` call remains valid
///   and untouched by later calls (no relocation).
/// - `heap_hi` reflects the address one byte past the last byte returned by
///   the most recent successful `heap_extend`.
pub unsafe trait HeapHost {
    /// Request `bytes` additional bytes at the current high-water mark.
    ///
    /// `bytes` is already a multiple of 16 by the time the allocator calls
    /// this; implementations are free to round further (e.g. to a page) as
    /// long as `heap_hi` reflects whatever was actually committed.
    fn heap_extend(&mut self, bytes: usize) -> Option<*mut u8>;

    /// One-past-the-end address of the heap region committed so far.
    fn heap_hi(&self) -> *mut u8;
}
