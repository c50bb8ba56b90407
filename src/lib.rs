//! # `solo` - Lazy, Thread-Safe Singletons
//!
//! A shared instance that is built on first use, built at most once even when
//! many threads ask for it at the same moment, and handed out by reference
//! without locking once it exists.
//!
//! ## Guarantees
//!
//! - **Single construction**: concurrent first callers are serialized by a
//!   guard; exactly one constructor run succeeds per slot.
//! - **Lock-free steady state**: once occupied, reads are a single `Acquire`
//!   load. The guard is never touched again.
//! - **Safe publication**: the value is written before a `Release` store of the
//!   occupied state, so no reader can see a partially built value.
//! - **Retryable failure**: a constructor that returns `Err` or panics leaves
//!   the slot empty. Nothing is poisoned; the next caller tries again.
//! - **No reset**: an occupied slot stays occupied for as long as it lives.
//!
//! ## Architecture
//!
//! 1. **Slots** ([`LazySlot`]): the state byte, the value cell and an
//!    injectable [`InitGuard`]. Double-checked locking lives here.
//! 2. **Accessors** ([`Singleton`], [`TrySingleton`], [`singleton!`]): a slot
//!    bundled with its constructor, exposing the zero-argument
//!    `get_instance()`.
//! 3. **Guards** ([`FutexMutex`], [`CountingGuard`], `std::sync::Mutex<()>`):
//!    the slow-path lock. `FutexMutex` parks directly on its lock word.
//! 4. **Contrast** ([`NaiveSlot`]): single-check initialization whose
//!    constructor may run more than once under contention.
//!
//! ## Example
//!
//! ```rust
//! use solo::{LazySlot, Singleton};
//!
//! struct Pool {
//!     size: usize,
//! }
//!
//! static POOL: Singleton<Pool> = Singleton::new(|| Pool { size: 8 });
//!
//! std::thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| assert_eq!(POOL.get_instance().size, 8));
//!     }
//! });
//!
//! // Explicit injection: the slot is passed to whoever needs it.
//! fn warm(slot: &LazySlot<Vec<u32>>) -> usize {
//!     slot.get_or_init(|| (0..16).collect()).len()
//! }
//! let local = LazySlot::new();
//! assert_eq!(warm(&local), 16);
//! ```
//!
//! ## Features
//!
//! - `tracing`: slow-path events (construction start, publication, failure).
//!
//! Building with `--cfg loom` swaps the slot's atomics for `loom`'s; see
//! `tests/loom_slot.rs`.

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cell;
pub mod concurrency;
pub mod guard;
#[cfg(not(loom))]
pub mod singleton;

pub use cell::{LazySlot, NaiveSlot};
pub use concurrency::sync::{FutexMutex, FutexMutexGuard};
pub use guard::{CountingGuard, GuardStats, InitGuard};
#[cfg(not(loom))]
pub use singleton::{Singleton, TrySingleton};

// Compile-time layout checks.
#[cfg(not(loom))]
const _: () = {
    use core::mem;

    // The naive slot is one pointer.
    assert!(mem::size_of::<NaiveSlot<u64>>() == mem::size_of::<usize>());

    // The default guard is one lock word.
    assert!(mem::size_of::<FutexMutex>() == mem::size_of::<u32>());

    // State byte + value + guard, with padding; catch accidental growth.
    assert!(mem::size_of::<LazySlot<u64>>() <= mem::size_of::<u64>() * 3);

    // A fn-pointer singleton adds exactly the pointer.
    assert!(
        mem::size_of::<Singleton<u64>>() <= mem::size_of::<LazySlot<u64>>() + mem::size_of::<usize>()
    );
};
