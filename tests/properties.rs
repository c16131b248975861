//! Property-based invariants that must hold for arbitrary sequences of
//! operations, not just the hand-picked scenarios in `integration.rs`.

use proptest::collection::vec as pvec;
use proptest::prelude::*;

use offheap_cache::{Store, StoreConfig};

proptest! {
    #[test]
    fn put_then_get_always_returns_what_was_written(payload in pvec(any::<u8>(), 0..4096)) {
        if payload.is_empty() {
            return Ok(());
        }
        let store = Store::new(StoreConfig::default().with_memory_capacity(1024 * 1024)).unwrap();
        let handle = store.put(&payload).unwrap();
        prop_assert_eq!(store.get(handle), Some(payload));
    }

    #[test]
    fn used_never_exceeds_capacity_under_random_traffic(
        sizes in pvec(1usize..500, 1..50),
        removal_mask in pvec(any::<bool>(), 1..50),
    ) {
        let store = Store::new(
            StoreConfig::default()
                .with_memory_capacity(2000)
                .with_eviction_threshold(0.8),
        )
        .unwrap();

        let mut handles = Vec::new();
        for (i, size) in sizes.iter().enumerate() {
            if let Ok(h) = store.put(&vec![0u8; *size]) {
                handles.push(h);
            }
            if removal_mask.get(i).copied().unwrap_or(false) {
                if let Some(h) = handles.pop() {
                    store.remove(h);
                }
            }
            prop_assert!(store.used() <= store.capacity());
        }
    }

    #[test]
    fn removed_handles_are_never_readable_again(payload in pvec(any::<u8>(), 1..256)) {
        let store = Store::new(StoreConfig::default()).unwrap();
        let handle = store.put(&payload).unwrap();
        store.remove(handle);
        prop_assert_eq!(store.get(handle), None);
    }
}
