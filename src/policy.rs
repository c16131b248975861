//! Eviction policy capability: record accesses and removals, produce
//! eviction victims, and answer whether the store is under pressure.
//!
//! Unlike the allocator backends, the set of policies is open — callers may
//! supply their own — so `Store` holds a `Box<dyn EvictionPolicy>` here
//! rather than a tagged enum, per the Design Notes' guidance to prefer
//! dynamic dispatch for an open set.

pub mod lru;

pub use lru::LruPolicy;

use crate::pointer::Handle;

/// Capability to track access order and decide eviction victims.
///
/// Implementations must serialize internally: `record_access` and
/// `record_removal` are invoked from both user-facing operations and the
/// background cleanup tick, so they take a conceptual writer lock, while
/// `next_victim`, `should_evict`, and `threshold` may take a reader lock.
pub trait EvictionPolicy: Send + Sync {
    /// Upsert `id` as the most recently accessed entry, recording its size.
    fn record_access(&self, id: Handle, size: u32);

    /// Forget `id` entirely.
    fn record_removal(&self, id: Handle);

    /// Peek at (without removing) the next entry to evict. `None` means the
    /// policy has nothing left to offer (the spec's sentinel "no victim
    /// available" value, represented idiomatically as `Option::None`
    /// instead of a negative handle).
    fn next_victim(&self) -> Option<Handle>;

    /// Whether `used / total` has crossed this policy's pressure threshold.
    fn should_evict(&self, used: u64, total: u64) -> bool;

    /// The configured pressure ratio, in `(0, 1)`.
    fn threshold(&self) -> f64;
}
