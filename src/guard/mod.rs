//! Construction guards.
//!
//! A guard serializes the construction decision of a [`LazySlot`]. It is only
//! ever touched on the slow path, while the slot may still be empty.
//!
//! [`LazySlot`]: crate::LazySlot

pub mod counting;

pub use counting::{CountingGuard, GuardStats};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::concurrency::sync::{FutexMutex, FutexMutexGuard};

/// A mutual-exclusion primitive that can guard a slot's construction.
///
/// `acquire` blocks until the calling thread holds the guard; dropping the
/// returned value releases it. Implementations must release on unwind too,
/// since a panicking constructor leaves the slot empty and retryable.
pub trait InitGuard {
    /// Proof of acquisition; releases the guard on drop.
    type Held<'a>
    where
        Self: 'a;

    /// Blocks until the current thread holds the guard.
    fn acquire(&self) -> Self::Held<'_>;
}

impl InitGuard for FutexMutex {
    type Held<'a> = FutexMutexGuard<'a>;

    #[inline]
    fn acquire(&self) -> Self::Held<'_> {
        self.lock()
    }
}

/// Poisoning is ignored: a panic under the guard leaves the slot empty and
/// consistent, so the next caller may simply retry.
impl InitGuard for Mutex<()> {
    type Held<'a> = MutexGuard<'a, ()>;

    #[inline]
    fn acquire(&self) -> Self::Held<'_> {
        self.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<G: InitGuard + ?Sized> InitGuard for &G {
    type Held<'a> = G::Held<'a>
    where
        Self: 'a;

    #[inline]
    fn acquire(&self) -> Self::Held<'_> {
        (**self).acquire()
    }
}

impl<G: InitGuard + ?Sized> InitGuard for Arc<G> {
    type Held<'a> = G::Held<'a>
    where
        Self: 'a;

    #[inline]
    fn acquire(&self) -> Self::Held<'_> {
        (**self).acquire()
    }
}
