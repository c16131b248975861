//! Bounded off-heap bump arena.
//!
//! Allocations are laid down linearly and never reclaimed on `free` — only
//! the live-byte counter (`used`) goes back down. This mirrors the teacher
//! crate's `storage::heap::DeltaHeap`: a fixed backing buffer written
//! through raw pointers under an atomically-advanced cursor, with a mutex
//! reserved for the rare case (here: none — the buffer is sized once at
//! construction, so there is no "allocate a new chunk" step to lock around).
//! Real deployments that need hole reclamation can swap in a segregated
//! free-list behind the same `Allocator` trait without changing callers.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::error::{Error, Result};
use crate::pointer::{MemoryPointer, Tier};

use super::Allocator;

const ALIGN: usize = 8;

fn align_up(n: usize) -> usize {
    (n + ALIGN - 1) & !(ALIGN - 1)
}

/// A single confined off-heap region of fixed capacity, bump-allocated and
/// 8-byte aligned throughout.
pub struct ArenaAllocator {
    buffer: Box<[u8]>,
    capacity: usize,
    /// Monotonic high-water mark of physically claimed bytes. Never goes
    /// back down — this is the bump cursor, distinct from `used`.
    bump: CachePadded<AtomicUsize>,
    /// Live bytes: incremented on `allocate`, decremented on `free`.
    /// `used() == sum of ptr.size() for live pointers` (invariant I2).
    used: CachePadded<AtomicUsize>,
}

// Safety: all mutation goes through atomics or raw writes confined to the
// caller-owned byte range of a single pointer, never concurrently reused
// across handles (the Store hands out one pointer per live handle).
unsafe impl Send for ArenaAllocator {}
unsafe impl Sync for ArenaAllocator {}

impl ArenaAllocator {
    /// Create an arena with the given capacity, in bytes.
    pub fn new(capacity: u64) -> Self {
        let capacity = capacity as usize;
        Self {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            capacity,
            bump: CachePadded::new(AtomicUsize::new(0)),
            used: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    fn base_ptr(&self) -> *mut u8 {
        self.buffer.as_ptr() as *mut u8
    }
}

impl Allocator for ArenaAllocator {
    fn allocate(&self, size: u32) -> Result<MemoryPointer> {
        if size == 0 {
            return Err(Error::invalid_argument("allocation size must be > 0"));
        }
        let aligned = align_up(size as usize);

        loop {
            let old = self.bump.load(Ordering::Acquire);
            let new = old
                .checked_add(aligned)
                .ok_or_else(|| Error::out_of_capacity(size as u64, 0))?;
            if new > self.capacity {
                let available = self.capacity.saturating_sub(old) as u64;
                return Err(Error::out_of_capacity(size as u64, available));
            }
            if self
                .bump
                .compare_exchange(old, new, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.used.fetch_add(size as usize, Ordering::AcqRel);
                return Ok(MemoryPointer::in_memory(old, size));
            }
        }
    }

    fn write(&self, ptr: MemoryPointer, bytes: &[u8]) -> Result<()> {
        let offset = match ptr.tier() {
            Tier::InMemory(offset) => offset,
            Tier::OnFile(_) => return Err(Error::invalid_handle("pointer is not in-memory")),
        };
        if bytes.len() > ptr.size() as usize {
            return Err(Error::invalid_argument(
                "write exceeds the pointer's allocated size",
            ));
        }
        if offset + ptr.size() as usize > self.capacity {
            return Err(Error::invalid_handle("pointer out of bounds for this arena"));
        }
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.base_ptr().add(offset), bytes.len());
        }
        Ok(())
    }

    fn read(&self, ptr: MemoryPointer) -> Result<Vec<u8>> {
        let offset = match ptr.tier() {
            Tier::InMemory(offset) => offset,
            Tier::OnFile(_) => return Err(Error::invalid_handle("pointer is not in-memory")),
        };
        let size = ptr.size() as usize;
        if offset + size > self.capacity {
            return Err(Error::invalid_handle("pointer out of bounds for this arena"));
        }
        let mut out = vec![0u8; size];
        unsafe {
            std::ptr::copy_nonoverlapping(self.base_ptr().add(offset), out.as_mut_ptr(), size);
        }
        Ok(out)
    }

    fn free(&self, ptr: MemoryPointer) -> Result<()> {
        match ptr.tier() {
            Tier::InMemory(_) => {
                self.used.fetch_sub(ptr.size() as usize, Ordering::AcqRel);
                Ok(())
            }
            Tier::OnFile(_) => Err(Error::invalid_handle("pointer is not in-memory")),
        }
    }

    fn capacity(&self) -> u64 {
        self.capacity as u64
    }

    fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire) as u64
    }

    fn close(&self) {
        // The buffer is owned and dropped with the allocator; nothing to
        // release eagerly.
    }
}
