//! `CountingGuard` — an instrumented guard.

use core::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;
use serde::{Deserialize, Serialize};

use super::InitGuard;
use crate::concurrency::sync::FutexMutex;

/// Wraps another guard and counts how often it is acquired.
///
/// Once a slot is occupied its fast path never reaches the guard, so the
/// count freezes. Tests and benchmarks use that to check the steady state.
#[derive(Debug, Default)]
pub struct CountingGuard<G = FutexMutex> {
    inner: G,
    acquisitions: CachePadded<AtomicUsize>,
}

/// Point-in-time snapshot of a [`CountingGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GuardStats {
    /// Number of completed `acquire` calls.
    pub acquisitions: usize,
}

impl CountingGuard<FutexMutex> {
    /// Creates a counting guard over a fresh [`FutexMutex`].
    pub const fn new() -> Self {
        Self::wrap(FutexMutex::new())
    }
}

impl<G> CountingGuard<G> {
    /// Wraps an existing guard.
    pub const fn wrap(inner: G) -> Self {
        Self {
            inner,
            acquisitions: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Number of completed acquisitions so far.
    #[inline]
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::Acquire)
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> GuardStats {
        GuardStats {
            acquisitions: self.acquisitions(),
        }
    }

    /// The wrapped guard.
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G: InitGuard> InitGuard for CountingGuard<G> {
    type Held<'a> = G::Held<'a>
    where
        Self: 'a;

    fn acquire(&self) -> Self::Held<'_> {
        let held = self.inner.acquire();
        self.acquisitions.fetch_add(1, Ordering::AcqRel);
        held
    }
}
