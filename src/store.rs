//! The `Store` façade: owns an allocator and an eviction policy, maintains
//! the handle -> pointer registry, and orchestrates admission and eviction.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::allocator::{Allocator, AllocatorBackend, ArenaAllocator, HybridAllocator};
use crate::config::{AllocatorKind, PolicyKind, StoreConfig};
use crate::error::{Error, Result};
use crate::pointer::{Handle, HandleAllocator, MemoryPointer};
use crate::policy::{EvictionPolicy, LruPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum State {
    Open = 0,
    Closing = 1,
    Closed = 2,
}

/// The object cache façade. Cheap to clone via `Arc<Store>`; all methods
/// take `&self` and synchronize internally.
pub struct Store {
    allocator: AllocatorBackend,
    policy: Box<dyn EvictionPolicy>,
    registry: DashMap<Handle, MemoryPointer>,
    handles: HandleAllocator,
    /// Held across the whole admission sequence in `put` — eviction,
    /// allocation, write, and registry insertion must be linearizable to
    /// preserve I2 and I5 (§5).
    admission: Mutex<()>,
    state: AtomicU8,
    /// Cadence for the optional `CleanupScheduler`, in milliseconds. Zero
    /// disables it.
    cleanup_interval_ms: u64,
}

impl Store {
    /// Build a store from a [`StoreConfig`], selecting the allocator and
    /// policy backends it names. For a custom policy implementation, use
    /// [`Store::with_backend`] instead.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let allocator = match config.allocator {
            AllocatorKind::Arena => {
                AllocatorBackend::Arena(ArenaAllocator::new(config.memory_capacity))
            }
            AllocatorKind::Hybrid => AllocatorBackend::Hybrid(HybridAllocator::new(
                config.memory_capacity,
                config.memory_threshold,
            )?),
        };
        let policy: Box<dyn EvictionPolicy> = match config.policy {
            PolicyKind::Lru => Box::new(LruPolicy::new(config.eviction_threshold)?),
        };
        Ok(Self::with_backend(allocator, policy).with_cleanup_interval_ms(config.cleanup_interval_ms))
    }

    /// Build a store from an already-constructed allocator backend and a
    /// caller-supplied eviction policy (the escape hatch for custom
    /// policies `StoreConfig` cannot name). The cleanup interval defaults to
    /// disabled; chain [`Store::with_cleanup_interval_ms`] to enable it.
    pub fn with_backend(allocator: AllocatorBackend, policy: Box<dyn EvictionPolicy>) -> Self {
        Self {
            allocator,
            policy,
            registry: DashMap::new(),
            handles: HandleAllocator::new(),
            admission: Mutex::new(()),
            state: AtomicU8::new(State::Open as u8),
            cleanup_interval_ms: 0,
        }
    }

    /// Override the cleanup scheduler cadence. Zero disables it; see
    /// [`Store::cleanup_interval`].
    pub fn with_cleanup_interval_ms(mut self, ms: u64) -> Self {
        self.cleanup_interval_ms = ms;
        self
    }

    /// The configured cleanup cadence, or `None` if disabled (the `0`
    /// sentinel from `StoreConfig::cleanup_interval_ms`). Consulted by
    /// [`crate::system::CleanupScheduler::spawn`].
    pub fn cleanup_interval(&self) -> Option<Duration> {
        if self.cleanup_interval_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.cleanup_interval_ms))
        }
    }

    fn state(&self) -> State {
        match self.state.load(Ordering::Acquire) {
            0 => State::Open,
            1 => State::Closing,
            _ => State::Closed,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state() == State::Open {
            Ok(())
        } else {
            Err(Error::Closed)
        }
    }

    /// Store `bytes`, returning the handle that addresses them.
    ///
    /// See §4.4.1: preemptive eviction while over the pressure threshold,
    /// then allocate (retrying once after a forced eviction on
    /// `OutOfCapacity`), write, mint a handle, register it, and notify the
    /// policy.
    pub fn put(&self, bytes: &[u8]) -> Result<Handle> {
        self.ensure_open()?;

        let need = bytes.len() as u64;
        if need > u32::MAX as u64 {
            return Err(Error::out_of_capacity(need, self.allocator.capacity()));
        }
        let cap = self.allocator.capacity();
        if need > cap {
            tracing::debug!(need, cap, "put rejected: payload larger than capacity");
            return Err(Error::out_of_capacity(need, cap));
        }

        let _admission = self.admission.lock();

        // Preemptive eviction (§4.4.1 step 2).
        loop {
            let used = self.allocator.used();
            let ceiling = (cap as f64 * self.policy.threshold()) as u64;
            if used + need <= ceiling {
                break;
            }
            if !self.evict_one() {
                break;
            }
        }

        // Allocate, retrying once after a forced eviction — but only for
        // the one recoverable failure class (§7): capacity exhaustion.
        // Anything else (e.g. `InvalidArgument` for a zero-length payload)
        // must surface immediately, without evicting an unrelated entry.
        let ptr = match self.allocator.allocate(need as u32) {
            Ok(ptr) => ptr,
            Err(first_err @ Error::OutOfCapacity { .. }) => {
                if self.evict_one() {
                    self.allocator.allocate(need as u32).map_err(|_| first_err)?
                } else {
                    return Err(first_err);
                }
            }
            Err(other) => return Err(other),
        };

        // Strong exception safety: free the allocation if the write fails.
        if let Err(e) = self.allocator.write(ptr, bytes) {
            let _ = self.allocator.free(ptr);
            return Err(e);
        }

        let id = self.handles.next();
        self.registry.insert(id, ptr);
        self.policy.record_access(id, need as u32);
        tracing::trace!(handle = id.get(), size = need, "put admitted");
        Ok(id)
    }

    /// Look up `id`, returning its bytes on a hit and recording the access
    /// with the policy. Never fails — an unknown or evicted handle simply
    /// returns `None`.
    pub fn get(&self, id: Handle) -> Option<Vec<u8>> {
        let ptr = *self.registry.get(&id)?;
        let bytes = self.allocator.read(ptr).ok()?;
        self.policy.record_access(id, ptr.size());
        Some(bytes)
    }

    /// Remove `id` if present, freeing its allocation and forgetting it in
    /// the policy. Idempotent: removing an absent or already-removed
    /// handle is a no-op.
    pub fn remove(&self, id: Handle) {
        if let Some((_, ptr)) = self.registry.remove(&id) {
            let _ = self.allocator.free(ptr);
            self.policy.record_removal(id);
        }
    }

    /// Evict the current LRU victim, if any. Returns `false` when the
    /// policy has nothing left to offer.
    ///
    /// A victim the registry no longer holds (a "ghost", left over from a
    /// caller-driven `remove` racing the policy) is handled by purging the
    /// policy's dangling entry without attempting to free anything.
    fn evict_one(&self) -> bool {
        let victim = match self.policy.next_victim() {
            Some(v) => v,
            None => return false,
        };
        match self.registry.remove(&victim) {
            Some((_, ptr)) => {
                let _ = self.allocator.free(ptr);
                self.policy.record_removal(victim);
                tracing::debug!(handle = victim.get(), "evicted");
            }
            None => {
                self.policy.record_removal(victim);
                tracing::trace!(handle = victim.get(), "purged ghost victim");
            }
        }
        true
    }

    /// Drain evictions while the policy reports pressure (§4.4.5). Intended
    /// to be invoked periodically by an external scheduler — see
    /// [`crate::system::CleanupScheduler`] for a convenience driver, or call
    /// this directly on whatever cadence the embedder prefers.
    pub fn tick(&self) {
        let total = self.allocator.capacity();
        loop {
            let used = self.allocator.used();
            if !self.policy.should_evict(used, total) {
                break;
            }
            if !self.evict_one() {
                break;
            }
        }
    }

    /// Total admissible capacity, in bytes.
    pub fn capacity(&self) -> u64 {
        self.allocator.capacity()
    }

    /// Bytes currently live.
    pub fn used(&self) -> u64 {
        self.allocator.used()
    }

    /// Transition `Open -> Closing -> Closed`: refuse new `put`s, drain one
    /// final cleanup pass, then close the allocator. Idempotent.
    pub fn close(&self) {
        if self.state.swap(State::Closing as u8, Ordering::AcqRel) == State::Closed as u8 {
            // Already closed; restore and bail.
            self.state.store(State::Closed as u8, Ordering::Release);
            return;
        }
        self.tick();
        self.allocator.close();
        self.state.store(State::Closed as u8, Ordering::Release);
        tracing::info!("store closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn store(capacity: u64, eviction_threshold: f64) -> Store {
        Store::new(
            StoreConfig::default()
                .with_memory_capacity(capacity)
                .with_eviction_threshold(eviction_threshold),
        )
        .unwrap()
    }

    #[test]
    fn simple_round_trip() {
        let s = store(1000, 0.8);
        let h = s.put(&[0xAA; 100]).unwrap();
        assert_eq!(s.get(h), Some(vec![0xAA; 100]));
        assert_eq!(s.used(), 100);
    }

    #[test]
    fn non_capacity_failure_does_not_touch_the_policy() {
        // A zero-length `put` fails with `InvalidArgument`, not
        // `OutOfCapacity` — it must not trigger an eviction retry, and a
        // pre-existing unrelated entry must survive.
        let s = store(1000, 0.8);
        let survivor = s.put(b"still here").unwrap();
        assert!(matches!(s.put(&[]), Err(Error::InvalidArgument(_))));
        assert!(s.get(survivor).is_some());
    }

    #[test]
    fn cleanup_interval_reflects_config_and_zero_disables() {
        let enabled = Store::new(
            StoreConfig::default().with_memory_capacity(1000),
        )
        .unwrap();
        assert_eq!(enabled.cleanup_interval(), Some(Duration::from_millis(60_000)));

        let disabled = Store::with_backend(
            AllocatorBackend::Arena(ArenaAllocator::new(1000)),
            Box::new(LruPolicy::new(0.8).unwrap()),
        );
        assert_eq!(disabled.cleanup_interval(), None);

        let custom = disabled.with_cleanup_interval_ms(5_000);
        assert_eq!(custom.cleanup_interval(), Some(Duration::from_millis(5_000)));
    }

    #[test]
    fn remove_then_get_is_none() {
        let s = store(1000, 0.8);
        let h = s.put(b"payload").unwrap();
        s.remove(h);
        assert_eq!(s.get(h), None);
        assert_eq!(s.used(), 0);
    }

    #[test]
    fn double_remove_is_a_noop() {
        let s = store(1000, 0.8);
        let h = s.put(b"payload").unwrap();
        s.remove(h);
        s.remove(h); // must not panic or error
    }

    #[test]
    fn lru_order_scenario() {
        // §8 scenario 2: threshold 0.8, capacity 1000.
        let s = store(1000, 0.8);
        let h1 = s.put(&[1u8; 300]).unwrap();
        let h2 = s.put(&[2u8; 300]).unwrap();
        let _h3 = s.put(&[3u8; 300]).unwrap();
        // Touch h1 so it is no longer the oldest.
        let _ = s.get(h1);
        // Admitting 300 more bytes would bring used to 1200 > 800 (0.8 * 1000).
        let h4 = s.put(&[4u8; 300]).unwrap();

        assert_eq!(s.get(h2), None, "h2 should have been evicted first");
        assert!(s.get(h1).is_some());
        assert!(s.get(h4).is_some());
    }

    #[test]
    fn eviction_exhaustion_fails_once_nothing_is_left_to_evict() {
        // §8 scenario 4: a request that still fits under total capacity but
        // cannot be admitted even after the policy has evicted everything it
        // has.
        let s = store(1000, 0.8);
        let only = s.put(&[0u8; 100]).unwrap();
        let result = s.put(&[0u8; 950]);
        assert!(result.is_err());
        // The lone existing entry was sacrificed chasing the admission
        // ceiling before the request was ultimately refused.
        assert!(s.get(only).is_none());
        assert_eq!(s.used(), 0);
    }

    #[test]
    fn payload_exceeding_capacity_outright_leaves_existing_entries_untouched() {
        let s = store(1000, 0.8);
        let keep = s.put(&[0u8; 100]).unwrap();
        assert!(s.put(&[0u8; 2000]).is_err());
        assert!(s.get(keep).is_some());
    }

    #[test]
    fn payload_larger_than_capacity_fails_fast() {
        let s = store(100, 0.8);
        assert!(s.put(&[0u8; 101]).is_err());
    }

    #[test]
    fn handles_are_monotonic_across_puts() {
        let s = store(1000, 0.8);
        let h1 = s.put(b"a").unwrap();
        let h2 = s.put(b"b").unwrap();
        assert!(h2.get() > h1.get());
    }

    #[test]
    fn ghost_victim_is_purged_without_freeing_twice() {
        // A handle the policy tracks but the registry never held (or has
        // already forgotten) must be purged, not treated as a free error.
        let s = store(1000, 0.8);
        let ghost = Handle::new(999).unwrap();
        s.policy.record_access(ghost, 10);
        assert!(s.evict_one());
        assert_eq!(s.policy.next_victim(), None);
    }

    #[test]
    fn close_refuses_new_puts() {
        let s = store(1000, 0.8);
        s.close();
        assert!(matches!(s.put(b"late"), Err(Error::Closed)));
    }

    #[test]
    fn close_is_idempotent() {
        let s = store(1000, 0.8);
        s.close();
        s.close();
    }
}
