use solo::{singleton, CountingGuard, Singleton, TrySingleton};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

/// A coordinator whose constructor has a one-time side effect.
struct Coordinator {
    boot_count: usize,
}

static COORDINATOR_BOOTS: AtomicUsize = AtomicUsize::new(0);

fn boot_coordinator() -> Coordinator {
    Coordinator {
        boot_count: COORDINATOR_BOOTS.fetch_add(1, Ordering::SeqCst) + 1,
    }
}

static COORDINATOR: Singleton<Coordinator> = Singleton::new(boot_coordinator);

#[test]
fn test_two_threads_same_instant_share_one_instance() {
    let barrier = Barrier::new(2);

    let (a, b) = thread::scope(|s| {
        let first = s.spawn(|| {
            barrier.wait();
            let c = COORDINATOR.get_instance();
            (c as *const Coordinator as usize, c.boot_count)
        });
        let second = s.spawn(|| {
            barrier.wait();
            let c = COORDINATOR.get_instance();
            (c as *const Coordinator as usize, c.boot_count)
        });
        (first.join().unwrap(), second.join().unwrap())
    });

    assert_eq!(a.0, b.0);
    assert_eq!(a.1, 1);
    assert_eq!(b.1, 1);
    assert_eq!(COORDINATOR_BOOTS.load(Ordering::SeqCst), 1);
    assert_eq!(COORDINATOR.boot_count, 1);
}

#[derive(Debug)]
struct Settings {
    name: String,
}

static SETTINGS_BUILDS: AtomicUsize = AtomicUsize::new(0);

singleton! {
    /// Process-wide settings.
    fn settings() -> Settings = {
        SETTINGS_BUILDS.fetch_add(1, Ordering::SeqCst);
        Settings { name: "solo".to_owned() }
    };
}

#[test]
fn test_singleton_macro_is_process_wide() {
    let addresses: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|_| s.spawn(|| settings() as *const Settings as usize))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(addresses.iter().all(|&a| a == addresses[0]));
    assert_eq!(settings().name, "solo");
    assert_eq!(SETTINGS_BUILDS.load(Ordering::SeqCst), 1);
}

#[test]
fn test_try_singleton_concurrent_retry() {
    const THREADS: usize = 50;

    let attempts = AtomicUsize::new(0);
    let loader: TrySingleton<String, usize, _> = TrySingleton::new(|| {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        if attempt == 0 {
            Err(attempt)
        } else {
            Ok(format!("loaded on attempt {attempt}"))
        }
    });
    let barrier = Barrier::new(THREADS);

    let failures: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    usize::from(loader.get_instance().is_err())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(failures, 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(loader.get().map(String::as_str), Some("loaded on attempt 1"));
}

#[test]
fn test_singleton_with_injected_guard() {
    let guard = CountingGuard::new();
    let single: Singleton<Vec<u8>, _, _> = Singleton::with_guard(|| vec![0_u8; 4], &guard);

    assert!(single.get().is_none());
    for _ in 0..10 {
        assert_eq!(single.get_instance().len(), 4);
    }
    assert_eq!(guard.acquisitions(), 1);
    assert!(single.slot().is_occupied());
}

#[test]
fn test_debug_shows_slot_state() {
    let single: Singleton<u8> = Singleton::new(|| 1);
    assert_eq!(format!("{single:?}"), "Singleton { slot: LazySlot(<empty>), .. }");
    single.get_instance();
    assert_eq!(format!("{single:?}"), "Singleton { slot: LazySlot(1), .. }");
}
