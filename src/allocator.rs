//! Allocator capability: allocate/read/write/free a contiguous byte region.
//!
//! Two backends implement this trait — [`arena::ArenaAllocator`] (a bounded
//! off-heap bump arena) and [`hybrid::HybridAllocator`] (arena plus a
//! file-backed overflow tier). [`AllocatorBackend`] is the tagged-variant
//! wrapper the `Store` actually holds, per the Design Notes' preference for
//! a closed enum over a trait object when the set of backends is fixed.

pub mod arena;
pub mod hybrid;

use crate::error::Result;
use crate::pointer::MemoryPointer;

pub use arena::ArenaAllocator;
pub use hybrid::HybridAllocator;

/// Capability to allocate, read, write, and free contiguous byte regions.
pub trait Allocator {
    /// Allocate a region of exactly `size` bytes. `size` must be > 0.
    fn allocate(&self, size: u32) -> Result<MemoryPointer>;

    /// Write `bytes` into the region described by `ptr`. `bytes.len()` must
    /// be `<= ptr.size()`.
    fn write(&self, ptr: MemoryPointer, bytes: &[u8]) -> Result<()>;

    /// Read back exactly `ptr.size()` bytes.
    fn read(&self, ptr: MemoryPointer) -> Result<Vec<u8>>;

    /// Release the region described by `ptr`. Double-free is a caller
    /// error and is not required to be detected.
    fn free(&self, ptr: MemoryPointer) -> Result<()>;

    /// Total admissible capacity, in bytes.
    fn capacity(&self) -> u64;

    /// Bytes currently live (sum of un-freed allocations' sizes).
    fn used(&self) -> u64;

    /// Release all backing regions. Subsequent operations have undefined
    /// effect.
    fn close(&self);
}

/// Tagged union over the two allocator backends a `Store` can be built
/// with.
pub enum AllocatorBackend {
    /// Bounded off-heap arena only.
    Arena(ArenaAllocator),
    /// Arena with file-backed overflow.
    Hybrid(HybridAllocator),
}

impl Allocator for AllocatorBackend {
    fn allocate(&self, size: u32) -> Result<MemoryPointer> {
        match self {
            Self::Arena(a) => a.allocate(size),
            Self::Hybrid(h) => h.allocate(size),
        }
    }

    fn write(&self, ptr: MemoryPointer, bytes: &[u8]) -> Result<()> {
        match self {
            Self::Arena(a) => a.write(ptr, bytes),
            Self::Hybrid(h) => h.write(ptr, bytes),
        }
    }

    fn read(&self, ptr: MemoryPointer) -> Result<Vec<u8>> {
        match self {
            Self::Arena(a) => a.read(ptr),
            Self::Hybrid(h) => h.read(ptr),
        }
    }

    fn free(&self, ptr: MemoryPointer) -> Result<()> {
        match self {
            Self::Arena(a) => a.free(ptr),
            Self::Hybrid(h) => h.free(ptr),
        }
    }

    fn capacity(&self) -> u64 {
        match self {
            Self::Arena(a) => a.capacity(),
            Self::Hybrid(h) => h.capacity(),
        }
    }

    fn used(&self) -> u64 {
        match self {
            Self::Arena(a) => a.used(),
            Self::Hybrid(h) => h.used(),
        }
    }

    fn close(&self) {
        match self {
            Self::Arena(a) => a.close(),
            Self::Hybrid(h) => h.close(),
        }
    }
}
