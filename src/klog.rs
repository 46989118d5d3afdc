//! Minimal logging shim for the allocator core.
//!
//! All diagnostic output funnels through a single registered **backend**
//! function pointer, the same indirection `slopos_lib::klog` uses to let a
//! kernel swap its early-boot UART writer for a driver-backed one later in
//! boot. Here the default backend is a no-op: a library with no host to log
//! to must not assume one exists. Call [`set_backend`] to wire this crate's
//! output into whatever the embedding environment uses for diagnostics.

use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(Level::Warn as u8);

#[inline(always)]
fn is_enabled(level: Level) -> bool {
    level as u8 <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

/// Signature of a log backend: receives the pre-formatted line, no trailing
/// newline appended.
pub type Backend = fn(fmt::Arguments<'_>);

/// `null` means "no backend registered, drop the line".
static BACKEND: AtomicPtr<()> = AtomicPtr::new(core::ptr::null_mut());

/// Register a backend that replaces the default no-op sink.
pub fn set_backend(backend: Backend) {
    BACKEND.store(backend as *mut (), Ordering::Release);
}

pub fn set_level(level: Level) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

#[inline]
fn dispatch(args: fmt::Arguments<'_>) {
    let ptr = BACKEND.load(Ordering::Acquire);
    if ptr.is_null() {
        return;
    }
    // SAFETY: only `set_backend` ever stores into `BACKEND`, and it only
    // stores valid `Backend` fn pointers (same size as `*mut ()` everywhere
    // this crate targets).
    let backend: Backend = unsafe { core::mem::transmute(ptr) };
    backend(args);
}

pub fn log_args(level: Level, args: fmt::Arguments<'_>) {
    if is_enabled(level) {
        dispatch(args);
    }
}

macro_rules! kalloc_warn {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::Level::Warn, ::core::format_args!($($arg)*))
    };
}

macro_rules! kalloc_trace {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::Level::Trace, ::core::format_args!($($arg)*))
    };
}

pub(crate) use kalloc_trace;
pub(crate) use kalloc_warn;
