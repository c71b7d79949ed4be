use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use heaped_cache::HeapedCache;
use quick_cache::sync::Cache as QuickCache;

#[derive(Clone, Debug, PartialEq)]
struct BenchValue {
	data: Vec<u8>,
}

fn value() -> BenchValue {
	BenchValue {
		data: vec![0u8; 64],
	}
}

fn bench_push(c: &mut Criterion) {
	let mut group = c.benchmark_group("push");

	for size in [100u64, 1000, 10000] {
		group.throughput(Throughput::Elements(size));
		group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
			b.iter(|| {
				let cache = HeapedCache::new(20_000);
				for i in 0..size {
					cache.push(black_box(i), black_box(value()));
				}
			});
		});
	}

	group.finish();
}

fn bench_get_hit(c: &mut Criterion) {
	let cache = Arc::new(HeapedCache::new(1000));

	// Pre-populate cache
	for i in 0..1000u64 {
		cache.push(i, value());
	}

	c.bench_function("get_hit", |b| {
		b.iter(|| {
			for i in 0..1000u64 {
				black_box(cache.get(&black_box(i)));
			}
		});
	});
}

fn bench_get_vs_get_clone(c: &mut Criterion) {
	let cache = Arc::new(HeapedCache::new(100));

	for i in 0..100u64 {
		cache.push(i, value());
	}

	let mut group = c.benchmark_group("get_methods");

	group.bench_function("get", |b| {
		b.iter(|| {
			for i in 0..100u64 {
				black_box(cache.get(&black_box(i)));
			}
		});
	});

	group.bench_function("get_clone", |b| {
		b.iter(|| {
			for i in 0..100u64 {
				black_box(cache.get_clone(&black_box(i)));
			}
		});
	});

	group.bench_function("get_ref", |b| {
		b.iter(|| {
			for i in 0..100u64 {
				black_box(cache.get_ref(&black_box(i)).map(|guard| guard.data.len()));
			}
		});
	});

	group.finish();
}

fn bench_overflow_churn(c: &mut Criterion) {
	c.bench_function("overflow_churn", |b| {
		b.iter(|| {
			// Small cache: every push past the first 1000 evicts
			let cache = HeapedCache::new(1000);
			for i in 0..10_000u64 {
				cache.push(black_box(i), value());
			}
		});
	});
}

fn bench_update_existing(c: &mut Criterion) {
	let cache = HeapedCache::new(10_000);
	for i in 0..10_000u64 {
		cache.push(i, value());
	}

	c.bench_function("update_existing", |b| {
		let mut i = 0u64;
		b.iter(|| {
			cache.push(black_box(i % 10_000), value());
			i = i.wrapping_add(7919);
		});
	});
}

fn bench_remove_and_refill(c: &mut Criterion) {
	let cache = HeapedCache::new(10_000);
	for i in 0..10_000u64 {
		cache.push(i, value());
	}

	c.bench_function("remove_and_refill", |b| {
		let mut i = 0u64;
		b.iter(|| {
			let key = i % 10_000;
			cache.remove(&black_box(key));
			cache.push(key, value());
			i = i.wrapping_add(7919);
		});
	});
}

fn bench_mixed_workload(c: &mut Criterion) {
	let cache = Arc::new(HeapedCache::new(500));

	for i in 0..500u64 {
		cache.push(i, value());
	}

	c.bench_function("mixed_80_20", |b| {
		b.iter(|| {
			for i in 0..100u64 {
				if i % 5 == 0 {
					// 20% writes
					cache.push(black_box(i), value());
				} else {
					// 80% reads
					black_box(cache.get(&black_box(i % 500)));
				}
			}
		});
	});
}

fn bench_concurrent_reads(c: &mut Criterion) {
	use std::thread;

	let cache = Arc::new(HeapedCache::new(1000));

	for i in 0..1000u64 {
		cache.push(i, value());
	}

	c.bench_function("concurrent_reads_4_threads", |b| {
		b.iter(|| {
			let mut handles = vec![];

			for _ in 0..4 {
				let cache = cache.clone();
				handles.push(thread::spawn(move || {
					for i in 0..250u64 {
						black_box(cache.get(&black_box(i)));
					}
				}));
			}

			for handle in handles {
				handle.join().expect("thread should not panic");
			}
		});
	});
}

fn bench_get_or_push(c: &mut Criterion) {
	c.bench_function("get_or_push_half_miss", |b| {
		b.iter(|| {
			let cache = HeapedCache::new(1000);
			for i in 0..2000u64 {
				black_box(cache.get_or_push(i % 1500, |_| Some(value())));
			}
		});
	});
}

fn bench_comparison_insert(c: &mut Criterion) {
	let mut group = c.benchmark_group("comparison/insert");

	// Use same item capacity for fair comparison
	const CACHE_CAPACITY: usize = 20000;

	for size in [100u64, 1000, 10000] {
		group.throughput(Throughput::Elements(size));

		group.bench_with_input(BenchmarkId::new("heaped_cache", size), &size, |b, &size| {
			b.iter(|| {
				let cache = HeapedCache::new(CACHE_CAPACITY);
				for i in 0..size {
					cache.push(black_box(i), black_box(value()));
				}
			});
		});

		group.bench_with_input(BenchmarkId::new("quick_cache", size), &size, |b, &size| {
			b.iter(|| {
				let cache = QuickCache::new(CACHE_CAPACITY);
				for i in 0..size {
					cache.insert(black_box(i), black_box(value()));
				}
			});
		});
	}

	group.finish();
}

fn bench_comparison_get_hit(c: &mut Criterion) {
	let mut group = c.benchmark_group("comparison/get_hit");

	const CACHE_CAPACITY: usize = 2000;
	const NUM_ITEMS: u64 = 1000;

	let heaped = Arc::new(HeapedCache::new(CACHE_CAPACITY));
	for i in 0..NUM_ITEMS {
		heaped.push(i, value());
	}

	let quick_cache = Arc::new(QuickCache::new(CACHE_CAPACITY));
	for i in 0..NUM_ITEMS {
		quick_cache.insert(i, value());
	}

	group.throughput(Throughput::Elements(NUM_ITEMS));

	group.bench_function("heaped_cache", |b| {
		b.iter(|| {
			for i in 0..NUM_ITEMS {
				black_box(heaped.get(&black_box(i)));
			}
		});
	});

	group.bench_function("quick_cache", |b| {
		b.iter(|| {
			for i in 0..NUM_ITEMS {
				black_box(quick_cache.get(&black_box(i)));
			}
		});
	});

	group.finish();
}

fn bench_comparison_eviction_pressure(c: &mut Criterion) {
	let mut group = c.benchmark_group("comparison/eviction_pressure");

	const CACHE_CAPACITY: usize = 1000;

	group.bench_function("heaped_cache", |b| {
		b.iter(|| {
			let cache = HeapedCache::new(CACHE_CAPACITY);
			for i in 0..10_000u64 {
				cache.push(black_box(i), value());
			}
		});
	});

	group.bench_function("quick_cache", |b| {
		b.iter(|| {
			let cache = QuickCache::new(CACHE_CAPACITY);
			for i in 0..10_000u64 {
				cache.insert(black_box(i), value());
			}
		});
	});

	group.finish();
}

criterion_group!(
	benches,
	bench_push,
	bench_get_hit,
	bench_get_vs_get_clone,
	bench_overflow_churn,
	bench_update_existing,
	bench_remove_and_refill,
	bench_mixed_workload,
	bench_concurrent_reads,
	bench_get_or_push,
	// Comparison benchmarks
	bench_comparison_insert,
	bench_comparison_get_hit,
	bench_comparison_eviction_pressure
);

criterion_main!(benches);
