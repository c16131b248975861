//! Configuration for the off-heap cache, mirroring the teacher crate's
//! `core::config` module: a struct-of-structs with `serde` derives and a
//! documented `Default` impl for every option enumerated in the external
//! interfaces.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One GiB, the default arena capacity.
pub const DEFAULT_MEMORY_CAPACITY: u64 = 1024 * 1024 * 1024;

/// Default fraction of the arena that must fill before the hybrid
/// allocator starts spilling new allocations to the file tier.
pub const DEFAULT_MEMORY_THRESHOLD: f64 = 0.5;

/// Default `used / capacity` ratio at which the eviction policy reports
/// pressure.
pub const DEFAULT_EVICTION_THRESHOLD: f64 = 0.75;

/// Default cleanup tick cadence in milliseconds. Zero disables the
/// convenience scheduler.
pub const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 60_000;

/// Which allocator backend a `Store` should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocatorKind {
    /// Bounded off-heap arena only.
    Arena,
    /// Arena with file-backed overflow past `memory_threshold`.
    Hybrid,
}

impl Default for AllocatorKind {
    fn default() -> Self {
        AllocatorKind::Arena
    }
}

/// Which eviction policy a `Store` should use. The LRU reference
/// implementation is the only built-in variant; callers needing a custom
/// policy construct a `Store` directly with their own `EvictionPolicy` impl
/// instead of going through `StoreConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Least-recently-used, as specified in §4.3.1.
    Lru,
}

impl Default for PolicyKind {
    fn default() -> Self {
        PolicyKind::Lru
    }
}

/// Top-level store configuration. Every field has the documented default;
/// construct with `StoreConfig::default()` and override individual fields,
/// or use the `with_*` builder methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Arena size in bytes.
    pub memory_capacity: u64,
    /// Hybrid-only: arena fill ratio above which new allocations spill to
    /// the file tier.
    pub memory_threshold: f64,
    /// `used / capacity` ratio at which the policy reports pressure.
    pub eviction_threshold: f64,
    /// Cadence, in milliseconds, for the convenience cleanup scheduler.
    /// Zero disables it; embedders driving `Store::tick()` themselves can
    /// ignore this field entirely.
    pub cleanup_interval_ms: u64,
    /// Allocator backend selection.
    pub allocator: AllocatorKind,
    /// Eviction policy selection.
    pub policy: PolicyKind,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            memory_threshold: DEFAULT_MEMORY_THRESHOLD,
            eviction_threshold: DEFAULT_EVICTION_THRESHOLD,
            cleanup_interval_ms: DEFAULT_CLEANUP_INTERVAL_MS,
            allocator: AllocatorKind::default(),
            policy: PolicyKind::default(),
        }
    }
}

impl StoreConfig {
    /// Validate the ratio fields. Constructors that accept a `StoreConfig`
    /// call this before building anything.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.memory_threshold, "memory_threshold")?;
        validate_threshold(self.eviction_threshold, "eviction_threshold")?;
        if self.memory_capacity == 0 {
            return Err(Error::invalid_argument("memory_capacity must be > 0"));
        }
        Ok(())
    }

    /// Override the arena capacity.
    pub fn with_memory_capacity(mut self, bytes: u64) -> Self {
        self.memory_capacity = bytes;
        self
    }

    /// Override the hybrid spill threshold.
    pub fn with_memory_threshold(mut self, ratio: f64) -> Self {
        self.memory_threshold = ratio;
        self
    }

    /// Override the eviction pressure threshold.
    pub fn with_eviction_threshold(mut self, ratio: f64) -> Self {
        self.eviction_threshold = ratio;
        self
    }

    /// Override the allocator backend.
    pub fn with_allocator(mut self, kind: AllocatorKind) -> Self {
        self.allocator = kind;
        self
    }

    /// Override the cleanup scheduler cadence. Zero disables
    /// [`crate::system::CleanupScheduler::spawn`] for a store built from
    /// this config.
    pub fn with_cleanup_interval_ms(mut self, ms: u64) -> Self {
        self.cleanup_interval_ms = ms;
        self
    }
}

/// Shared validation for any ratio that must fall in the open interval
/// `(0, 1)` — used by both `memory_threshold` and `eviction_threshold`, and
/// by `LruPolicy::new`.
pub fn validate_threshold(value: f64, field: &str) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "{field} must be in (0, 1), got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        StoreConfig::default().validate().unwrap();
    }

    #[test]
    fn boundary_thresholds_are_rejected() {
        for bad in [0.0, 1.0, -0.1, 1.1] {
            assert!(validate_threshold(bad, "x").is_err());
        }
    }

    #[test]
    fn interior_thresholds_are_accepted() {
        for good in [0.001, 0.5, 0.999] {
            assert!(validate_threshold(good, "x").is_ok());
        }
    }
}
