//! Singleton Tour
//!
//! Walks from "no singleton at all" to a guarded, lazily built instance.
//!
//! Run with `cargo run --example singleton_tour`.

use anyhow::{ensure, Context, Result};
use solo::{singleton, CountingGuard, LazySlot, NaiveSlot, TrySingleton};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// A shared coordinator, e.g. a logger or a connection-pool registry.
struct Coordinator {
    id: usize,
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

impl Coordinator {
    fn new() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
        println!("  Coordinator constructor called (id {id})");
        Self { id }
    }
}

singleton! {
    fn coordinator() -> Coordinator = Coordinator::new();
}

fn main() -> Result<()> {
    println!("Singleton Tour");
    println!("==============");

    // 1. Without a singleton, each construction is a new object.
    println!("\n1. No singleton:");
    let a = Coordinator::new();
    let b = Coordinator::new();
    println!("  same object? {}", core::ptr::eq(&a, &b));

    // 2. Single-check lazy init: fine on one thread, races on many.
    println!("\n2. Naive singleton under a first-access race:");
    let naive = NaiveSlot::new();
    let naive_builds = AtomicUsize::new(0);
    let rendezvous = Barrier::new(2);
    thread::scope(|s| {
        for _ in 0..2 {
            s.spawn(|| {
                naive.get_or_init(|| {
                    naive_builds.fetch_add(1, Ordering::SeqCst);
                    rendezvous.wait();
                    Coordinator::new()
                });
            });
        }
    });
    println!("  constructor ran {} times", naive_builds.load(Ordering::SeqCst));

    // 3. Double-checked locking: one construction, no matter how many threads.
    println!("\n3. Double-checked singleton, 8 threads at once:");
    let barrier = Barrier::new(8);
    let ids: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    coordinator().id
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap_or_default()).collect()
    });
    ensure!(ids.iter().all(|&id| id == ids[0]), "threads saw different instances: {ids:?}");
    println!("  every thread got id {}", ids[0]);
    println!("  same object? {}", core::ptr::eq(coordinator(), coordinator()));

    // 4. Preferred style: the slot is handed to the code that needs it.
    println!("\n4. Injected slot with an instrumented guard:");
    let guard = Arc::new(CountingGuard::new());
    let shared = Arc::new(LazySlot::with_guard(Arc::clone(&guard)));
    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let c = shared.get_or_init(Coordinator::new);
                println!("  worker {worker} uses coordinator {}", c.id);
            })
        })
        .collect();
    for worker in workers {
        worker.join().map_err(|_| anyhow::anyhow!("worker panicked"))?;
    }
    let stats = serde_json::to_string(&guard.stats()).context("serializing guard stats")?;
    println!("  guard stats: {stats}");

    // 5. A constructor that fails is retried on the next call.
    println!("\n5. Failing constructor:");
    let attempts = AtomicUsize::new(0);
    let flaky: TrySingleton<Coordinator, String, _> = TrySingleton::new(|| {
        if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(10));
            Err("backend not ready".to_owned())
        } else {
            Ok(Coordinator::new())
        }
    });
    match flaky.get_instance() {
        Ok(_) => println!("  first call succeeded"),
        Err(reason) => println!("  first call failed: {reason}"),
    }
    let c = flaky
        .get_instance()
        .map_err(anyhow::Error::msg)
        .context("second attempt")?;
    println!("  second call built coordinator {}", c.id);

    Ok(())
}
