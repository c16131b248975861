//! Reference LRU eviction policy (§4.3.1).
//!
//! Access order is tracked with a monotonic sequence counter plus a
//! `BTreeMap<sequence, Handle>` (oldest entry first) and a reverse
//! `HashMap<Handle, sequence>` so a re-access can find and remove its prior
//! position before re-inserting at a fresh, larger sequence number. This is
//! the same "find old position, relink at the tail" shape as an
//! access-ordered linked hash map, built from the off-the-shelf concurrent
//! collections the teacher crate favors (`BTreeMap`/`HashMap` behind a
//! `parking_lot::RwLock`, the same guard it uses elsewhere for registries
//! that need coordinated multi-field updates) rather than hand-rolled
//! intrusive pointers.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::config::validate_threshold;
use crate::error::Result;
use crate::pointer::Handle;

use super::EvictionPolicy;

struct Inner {
    order: BTreeMap<u64, Handle>,
    entries: HashMap<Handle, (u64, u32)>,
}

/// Least-recently-used eviction policy.
pub struct LruPolicy {
    threshold: f64,
    seq: AtomicU64,
    inner: RwLock<Inner>,
}

impl LruPolicy {
    /// Build an LRU policy with the given pressure threshold. `threshold`
    /// must be in `(0, 1)`.
    pub fn new(threshold: f64) -> Result<Self> {
        validate_threshold(threshold, "eviction_threshold")?;
        Ok(Self {
            threshold,
            seq: AtomicU64::new(0),
            inner: RwLock::new(Inner {
                order: BTreeMap::new(),
                entries: HashMap::new(),
            }),
        })
    }

    /// Number of entries the policy currently tracks. Exposed for the
    /// cleanup tick's termination bound (§4.4.5).
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the policy currently tracks no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EvictionPolicy for LruPolicy {
    fn record_access(&self, id: Handle, size: u32) {
        let mut inner = self.inner.write();
        if let Some((old_seq, _)) = inner.entries.remove(&id) {
            inner.order.remove(&old_seq);
        }
        let new_seq = self.seq.fetch_add(1, Ordering::Relaxed);
        inner.order.insert(new_seq, id);
        inner.entries.insert(id, (new_seq, size));
    }

    fn record_removal(&self, id: Handle) {
        let mut inner = self.inner.write();
        if let Some((seq, _)) = inner.entries.remove(&id) {
            inner.order.remove(&seq);
        }
    }

    fn next_victim(&self) -> Option<Handle> {
        let inner = self.inner.read();
        inner.order.values().next().copied()
    }

    fn should_evict(&self, used: u64, total: u64) -> bool {
        total > 0 && (used as f64 / total as f64) >= self.threshold
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}
