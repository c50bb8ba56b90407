//! `FutexMutex` — the default construction guard.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use crossbeam_utils::Backoff;

use super::{wait_on_u32, wake_one_u32};

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
const CONTENDED: u32 = 2;

/// A data-less mutex that parks contended threads on the lock word itself.
///
/// It only serializes a critical section; it protects no value of its own.
/// That is all a [`LazySlot`](crate::LazySlot) needs from its guard, and it
/// keeps the type `const`-constructible so slots can live in `static`s.
///
/// The lock word has three states: unlocked, locked, and locked with
/// waiters. Unlocking only issues a wake syscall in the last state.
pub struct FutexMutex {
    state: AtomicU32,
}

impl FutexMutex {
    /// Creates a new, unlocked mutex.
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(UNLOCKED),
        }
    }

    /// Acquires the mutex, blocking the current thread until it is able to do so.
    pub fn lock(&self) -> FutexMutexGuard<'_> {
        if self
            .state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.lock_slow();
        }
        FutexMutexGuard { lock: self }
    }

    /// Attempts to acquire the mutex without blocking.
    pub fn try_lock(&self) -> Option<FutexMutexGuard<'_>> {
        self.state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| FutexMutexGuard { lock: self })
    }

    /// Returns `true` if some thread currently holds the mutex.
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) != UNLOCKED
    }

    #[cold]
    fn lock_slow(&self) {
        // Short spin first: construction is usually brief, and parking costs
        // two syscalls.
        let backoff = Backoff::new();
        while !backoff.is_completed() {
            if self.state.load(Ordering::Relaxed) == UNLOCKED
                && self
                    .state
                    .compare_exchange_weak(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
            {
                return;
            }
            backoff.snooze();
        }

        // Taking the lock as CONTENDED is conservative: we may issue one
        // unnecessary wake on unlock, but never miss one.
        while self.state.swap(CONTENDED, Ordering::Acquire) != UNLOCKED {
            wait_on_u32(&self.state, CONTENDED);
        }
    }

    /// # Safety
    ///
    /// Must only be called by the thread that currently holds the lock.
    unsafe fn unlock(&self) {
        if self.state.swap(UNLOCKED, Ordering::Release) == CONTENDED {
            wake_one_u32(&self.state);
        }
    }
}

impl Default for FutexMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FutexMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutexMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// RAII guard returned by [`FutexMutex::lock`]; unlocks on drop.
#[must_use = "if unused the mutex will immediately unlock"]
pub struct FutexMutexGuard<'a> {
    lock: &'a FutexMutex,
}

impl Drop for FutexMutexGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: a guard only exists while its thread holds the lock.
        unsafe {
            self.lock.unlock();
        }
    }
}

impl fmt::Debug for FutexMutexGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FutexMutexGuard { .. }")
    }
}
