use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use solo::{CountingGuard, LazySlot, NaiveSlot, Singleton};
use std::sync::{Mutex, OnceLock};
use std::thread;

const READS: u64 = 10_000;
const THREADS: usize = 4;

fn bench_warm_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("warm_reads");
    group.throughput(Throughput::Elements(READS));

    let slot = LazySlot::new();
    slot.get_or_init(|| 42_u64);
    group.bench_function("lazy_slot", |b| {
        b.iter(|| {
            for _ in 0..READS {
                black_box(slot.get_or_init(|| 0));
            }
        })
    });

    static SINGLE: Singleton<u64> = Singleton::new(|| 42);
    SINGLE.get_instance();
    group.bench_function("singleton", |b| {
        b.iter(|| {
            for _ in 0..READS {
                black_box(SINGLE.get_instance());
            }
        })
    });

    let naive = NaiveSlot::new();
    naive.get_or_init(|| 42_u64);
    group.bench_function("naive_slot", |b| {
        b.iter(|| {
            for _ in 0..READS {
                black_box(naive.get_or_init(|| 0));
            }
        })
    });

    let once = OnceLock::new();
    once.get_or_init(|| 42_u64);
    group.bench_function("std_once_lock", |b| {
        b.iter(|| {
            for _ in 0..READS {
                black_box(once.get_or_init(|| 0));
            }
        })
    });

    // The lock-every-time baseline double-checked locking avoids.
    let locked = Mutex::new(Some(42_u64));
    group.bench_function("std_mutex_option", |b| {
        b.iter(|| {
            for _ in 0..READS {
                let mut guard = locked.lock().unwrap();
                black_box(*guard.get_or_insert(0));
            }
        })
    });

    group.finish();
}

fn bench_contended_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_reads");
    group.throughput(Throughput::Elements(READS * THREADS as u64));

    let guard = CountingGuard::new();
    let slot = LazySlot::with_guard(&guard);
    slot.get_or_init(|| 42_u64);
    group.bench_function("lazy_slot", |b| {
        b.iter(|| {
            thread::scope(|s| {
                for _ in 0..THREADS {
                    s.spawn(|| {
                        for _ in 0..READS {
                            black_box(slot.get_or_init(|| 0));
                        }
                    });
                }
            });
        })
    });
    // Warm reads never reach the guard.
    assert_eq!(guard.acquisitions(), 1);

    let locked = Mutex::new(Some(42_u64));
    group.bench_function("std_mutex_option", |b| {
        b.iter(|| {
            thread::scope(|s| {
                for _ in 0..THREADS {
                    s.spawn(|| {
                        for _ in 0..READS {
                            let mut guard = locked.lock().unwrap();
                            black_box(*guard.get_or_insert(0));
                        }
                    });
                }
            });
        })
    });

    group.finish();
}

fn bench_cold_init(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_init");

    group.bench_function("lazy_slot", |b| {
        b.iter(|| {
            let slot = LazySlot::new();
            black_box(*slot.get_or_init(|| black_box(7_u64)));
        })
    });

    group.bench_function("std_once_lock", |b| {
        b.iter(|| {
            let once = OnceLock::new();
            black_box(*once.get_or_init(|| black_box(7_u64)));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_warm_reads, bench_contended_reads, bench_cold_init);
criterion_main!(benches);
