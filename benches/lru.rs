//! Throughput of the LRU policy's access and eviction paths in isolation,
//! without the allocator in the loop.

use criterion::{criterion_group, criterion_main, Criterion};

use offheap_cache::pointer::Handle;
use offheap_cache::policy::{EvictionPolicy, LruPolicy};

fn bench_record_access(c: &mut Criterion) {
    c.bench_function("lru_record_access_repeated_key", |b| {
        let lru = LruPolicy::new(0.8).unwrap();
        let h = Handle::new(1).unwrap();
        b.iter(|| {
            lru.record_access(h, 64);
        });
    });
}

fn bench_victim_churn(c: &mut Criterion) {
    c.bench_function("lru_fill_and_evict_10k", |b| {
        b.iter(|| {
            let lru = LruPolicy::new(0.8).unwrap();
            for i in 1..=10_000u64 {
                lru.record_access(Handle::new(i).unwrap(), 64);
            }
            while let Some(victim) = lru.next_victim() {
                lru.record_removal(victim);
            }
        });
    });
}

criterion_group!(benches, bench_record_access, bench_victim_churn);
criterion_main!(benches);
