//! Optional convenience driver for [`Store::tick`](crate::store::Store::tick).
//!
//! The core store is synchronous and has no background threads of its own —
//! embedders are free to call `tick()` on whatever cadence suits them (a
//! request hook, a cron job, nothing at all). `CleanupScheduler` is a small
//! `tokio`-backed helper for the common case of "just call it periodically."

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::store::Store;

/// Drives `Store::tick()` on a fixed interval from a background `tokio`
/// task. Dropping the scheduler stops the task.
pub struct CleanupScheduler {
    handle: JoinHandle<()>,
}

impl CleanupScheduler {
    /// Spawn a task that calls `store.tick()` on `store`'s configured
    /// `cleanup_interval_ms` (see [`Store::cleanup_interval`]). Returns
    /// `None` without spawning anything if that interval is zero —
    /// `StoreConfig`'s documented "zero disables" sentinel. Requires a
    /// `tokio` runtime to already be running.
    pub fn spawn(store: Arc<Store>) -> Option<Self> {
        let period = store.cleanup_interval()?;
        Some(Self::spawn_with_period(store, period))
    }

    /// Spawn a task that calls `store.tick()` every `period`, ignoring
    /// whatever `cleanup_interval_ms` the store was configured with. Requires
    /// a `tokio` runtime to already be running.
    pub fn spawn_with_period(store: Arc<Store>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                store.tick();
            }
        });
        Self { handle }
    }

    /// Stop the background task.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for CleanupScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    #[tokio::test]
    async fn scheduler_evicts_under_pressure_over_time() {
        let store = Arc::new(
            Store::new(
                StoreConfig::default()
                    .with_memory_capacity(1000)
                    .with_eviction_threshold(0.5),
            )
            .unwrap(),
        );
        let a = store.put(&[0u8; 600]).unwrap();
        let scheduler = CleanupScheduler::spawn_with_period(store.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.stop();

        // Above the 0.5 threshold with nothing else to evict, `a` is the
        // only victim the policy can offer; the background tick must have
        // removed it.
        assert!(store.get(a).is_none());
    }

    #[tokio::test]
    async fn spawn_honors_zero_cleanup_interval() {
        let store = Arc::new(
            Store::new(
                StoreConfig::default()
                    .with_memory_capacity(1000)
                    .with_cleanup_interval_ms(0),
            )
            .unwrap(),
        );
        assert!(CleanupScheduler::spawn(store).is_none());
    }

    #[tokio::test]
    async fn spawn_uses_the_configured_interval() {
        let store = Arc::new(
            Store::new(
                StoreConfig::default()
                    .with_memory_capacity(1000)
                    .with_eviction_threshold(0.5)
                    .with_cleanup_interval_ms(10),
            )
            .unwrap(),
        );
        let a = store.put(&[0u8; 600]).unwrap();
        let scheduler = CleanupScheduler::spawn(store.clone()).expect("interval is non-zero");

        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.stop();

        assert!(store.get(a).is_none());
    }
}
