//! Handles and physical placements.
//!
//! `Handle` is the opaque identity callers hold. `MemoryPointer` is the
//! internal (tier, address, size) triple the allocator layer hands back to
//! the store; it is never exposed to callers.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque, non-zero, never-reused identifier for a stored entry.
///
/// Handles are minted by a single monotonic counter per `Store`; zero is
/// reserved as the "absent" sentinel and is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(NonZeroU64);

impl Handle {
    /// Wrap a raw, non-zero id. Returns `None` for zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Handle)
    }

    /// The underlying numeric id.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic handle generator. Never reissues a value (invariant I4).
#[derive(Debug)]
pub struct HandleAllocator {
    next: AtomicU64,
}

impl HandleAllocator {
    /// Create a generator whose first issued handle is `1`.
    pub fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }

    /// Mint the next handle.
    pub fn next(&self) -> Handle {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        // fetch_add started at 1, so raw is always >= 1: safe to unwrap.
        Handle::new(raw).expect("handle counter started at 1")
    }
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Which storage tier a [`MemoryPointer`] lives in, carrying its tier-local
/// address inline. Making the tag part of the pointer itself (rather than a
/// side map from pointer to tier) lets `write`/`read`/`free` dispatch by
/// matching, with no reparsing of an erased address field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Lives in the off-heap arena at this byte offset.
    InMemory(usize),
    /// Lives in the backing scratch file at this byte offset.
    OnFile(u64),
}

/// A physical placement: which tier, where in that tier, and exactly how
/// many bytes. `size` is an exact length, not a capacity — reads return
/// exactly `size` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryPointer {
    tier: Tier,
    size: u32,
}

impl MemoryPointer {
    /// Construct a pointer into the arena.
    pub fn in_memory(offset: usize, size: u32) -> Self {
        Self { tier: Tier::InMemory(offset), size }
    }

    /// Construct a pointer into the file tier.
    pub fn on_file(offset: u64, size: u32) -> Self {
        Self { tier: Tier::OnFile(offset), size }
    }

    /// Which tier this pointer addresses.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Exact byte length of the region this pointer describes.
    pub fn size(&self) -> u32 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_monotonic_and_nonzero() {
        let gen = HandleAllocator::new();
        let a = gen.next();
        let b = gen.next();
        assert!(a.get() >= 1);
        assert!(b.get() > a.get());
    }

    #[test]
    fn zero_is_rejected() {
        assert!(Handle::new(0).is_none());
    }

    #[test]
    fn pointer_equality_is_structural() {
        let a = MemoryPointer::in_memory(16, 32);
        let b = MemoryPointer::in_memory(16, 32);
        let c = MemoryPointer::in_memory(24, 32);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
