//! Put/evict throughput under sustained pressure.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use offheap_cache::{Store, StoreConfig};

fn bench_put_under_pressure(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_under_pressure");
    for payload_size in [64usize, 512, 4096] {
        group.throughput(Throughput::Bytes(payload_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(payload_size),
            &payload_size,
            |b, &payload_size| {
                let store = Store::new(
                    StoreConfig::default()
                        .with_memory_capacity(1024 * 1024)
                        .with_eviction_threshold(0.8),
                )
                .unwrap();
                let payload = vec![0xAB; payload_size];
                b.iter(|| {
                    store.put(&payload).unwrap();
                });
            },
        );
    }
    group.finish();
}

fn bench_put_get_mix(c: &mut Criterion) {
    c.bench_function("put_get_round_trip_1kb", |b| {
        let store = Store::new(StoreConfig::default().with_memory_capacity(4 * 1024 * 1024))
            .unwrap();
        let payload = vec![0x11; 1024];
        b.iter(|| {
            let handle = store.put(&payload).unwrap();
            store.get(handle).unwrap();
        });
    });
}

criterion_group!(benches, bench_put_under_pressure, bench_put_get_mix);
criterion_main!(benches);
