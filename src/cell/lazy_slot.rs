//! `LazySlot` — a write-once slot behind double-checked locking.
//!
//! The state byte is the only thing the fast path reads. The value is written
//! while the guard is held, then published with a `Release` store of
//! `OCCUPIED`; readers pair it with an `Acquire` load, so a reader that sees
//! `OCCUPIED` also sees the fully constructed value.

use core::fmt;
use core::marker::PhantomData;
use core::mem::MaybeUninit;

use crate::concurrency::primitives::{AtomicU8, Ordering, UnsafeCell};
use crate::concurrency::sync::FutexMutex;
use crate::guard::InitGuard;

const EMPTY: u8 = 0;
const OCCUPIED: u8 = 1;

/// A lazily filled, thread-safe slot holding at most one value.
///
/// - [`get`](Self::get) never touches the guard.
/// - [`get_or_init`](Self::get_or_init) and
///   [`get_or_try_init`](Self::get_or_try_init) run the constructor at most
///   once successfully, no matter how many threads race on first access.
/// - A failed or panicking constructor leaves the slot empty; the next
///   caller retries.
/// - There is no way to empty an occupied slot through `&self`.
///
/// The guard type `G` is injectable: [`FutexMutex`] by default,
/// `std::sync::Mutex<()>`, a shared `&G`/`Arc<G>`, or an instrumented
/// [`CountingGuard`](crate::CountingGuard).
///
/// # Deadlocks
///
/// A constructor that calls back into the same slot blocks forever, exactly
/// like `std::sync::OnceLock`.
///
/// # Example
///
/// ```rust
/// use solo::LazySlot;
///
/// static PORT: LazySlot<u16> = LazySlot::new();
///
/// let port = PORT.get_or_init(|| 8080);
/// assert_eq!(*port, 8080);
/// assert!(core::ptr::eq(port, PORT.get().unwrap()));
/// ```
pub struct LazySlot<T, G = FutexMutex> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
    guard: G,
    _owns: PhantomData<T>,
}

// SAFETY: the value may be constructed on one thread and dropped on another
// (`T: Send`), and is shared by reference across threads (`T: Sync`). All
// writes are serialized by `guard` and published via `state`.
unsafe impl<T: Send + Sync, G: Sync> Sync for LazySlot<T, G> {}
// SAFETY: moving the slot moves the (possibly constructed) value.
unsafe impl<T: Send, G: Send> Send for LazySlot<T, G> {}

#[cfg(not(loom))]
impl<T> LazySlot<T, FutexMutex> {
    /// Creates an empty slot guarded by a [`FutexMutex`].
    pub const fn new() -> Self {
        Self::with_guard(FutexMutex::new())
    }
}

impl<T, G> LazySlot<T, G> {
    /// Creates an empty slot guarded by `guard`.
    #[cfg(not(loom))]
    pub const fn with_guard(guard: G) -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
            guard,
            _owns: PhantomData,
        }
    }

    /// Creates an empty slot guarded by `guard`.
    #[cfg(loom)]
    pub fn with_guard(guard: G) -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
            guard,
            _owns: PhantomData,
        }
    }

    /// Returns the value if the slot is occupied. Never blocks.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        if self.is_occupied() {
            // SAFETY: the Acquire load observed OCCUPIED.
            Some(unsafe { self.get_unchecked() })
        } else {
            None
        }
    }

    /// Returns `true` once a constructor has completed successfully.
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.state.load(Ordering::Acquire) == OCCUPIED
    }

    /// The guard serializing construction.
    pub fn guard(&self) -> &G {
        &self.guard
    }

    /// Mutable access to the value, if any. `&mut self` rules out readers.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.is_occupied() {
            // SAFETY: occupied, and `&mut self` is exclusive.
            Some(self.value.with_mut(|slot| unsafe { (*slot).assume_init_mut() }))
        } else {
            None
        }
    }

    /// Consumes the slot, returning the value if it was ever constructed.
    pub fn into_inner(mut self) -> Option<T> {
        self.take_for_teardown()
    }

    /// # Safety
    ///
    /// The state must have been observed as `OCCUPIED` with `Acquire` ordering
    /// (or under the guard).
    #[inline]
    unsafe fn get_unchecked(&self) -> &T {
        self.value.with(|slot| unsafe { (*slot).assume_init_ref() })
    }

    /// Moves the value out and marks the slot empty. Only reachable with
    /// exclusive ownership, so it cannot be observed as a reset.
    fn take_for_teardown(&mut self) -> Option<T> {
        if self.state.load(Ordering::Acquire) != OCCUPIED {
            return None;
        }
        self.state.store(EMPTY, Ordering::Relaxed);
        // SAFETY: was occupied; the state flip prevents a second read in `Drop`.
        Some(self.value.with(|slot| unsafe { (*slot).assume_init_read() }))
    }
}

impl<T, G: InitGuard> LazySlot<T, G> {
    /// Returns the value, constructing it with `init` if the slot is empty.
    ///
    /// If several threads race here on an empty slot, exactly one runs `init`;
    /// the others block on the guard and then return the published value.
    #[inline]
    pub fn get_or_init<F>(&self, init: F) -> &T
    where
        F: FnOnce() -> T,
    {
        match self.get_or_try_init(|| Ok::<T, core::convert::Infallible>(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Returns the value, constructing it with `init` if the slot is empty.
    ///
    /// An `Err` from `init` is returned to this caller only. The slot stays
    /// empty, and a later call (from any thread) runs its own constructor.
    #[inline]
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }
        self.init_slow(init)
    }

    #[cold]
    fn init_slow<F, E>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let _held = self.guard.acquire();

        // Another thread may have published while we waited for the guard.
        if self.state.load(Ordering::Acquire) == OCCUPIED {
            #[cfg(feature = "tracing")]
            tracing::trace!(payload = core::any::type_name::<T>(), "slot filled while waiting for guard");
            // SAFETY: observed OCCUPIED with Acquire.
            return Ok(unsafe { self.get_unchecked() });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(payload = core::any::type_name::<T>(), "constructing payload");

        let value = match init() {
            Ok(value) => value,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(payload = core::any::type_name::<T>(), "payload construction failed; slot stays empty");
                return Err(err);
            }
        };

        // SAFETY: the guard is held and the slot is EMPTY, so no other thread
        // reads or writes the value cell.
        self.value.with_mut(|slot| unsafe {
            (*slot).write(value);
        });
        self.state.store(OCCUPIED, Ordering::Release);

        #[cfg(feature = "tracing")]
        tracing::debug!(payload = core::any::type_name::<T>(), "payload published");

        // SAFETY: we just published it.
        Ok(unsafe { self.get_unchecked() })
    }
}

#[cfg(not(loom))]
impl<T> Default for LazySlot<T, FutexMutex> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, G> Drop for LazySlot<T, G> {
    fn drop(&mut self) {
        drop(self.take_for_teardown());
    }
}

impl<T: fmt::Debug, G> fmt::Debug for LazySlot<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_tuple("LazySlot");
        match self.get() {
            Some(value) => d.field(value),
            None => d.field(&format_args!("<empty>")),
        };
        d.finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_empty_until_initialized() {
        let slot: LazySlot<u32> = LazySlot::new();
        assert!(!slot.is_occupied());
        assert_eq!(slot.get(), None);

        assert_eq!(*slot.get_or_init(|| 7), 7);
        assert!(slot.is_occupied());
        assert_eq!(slot.get(), Some(&7));
    }

    #[test]
    fn test_second_initializer_is_ignored() {
        let slot = LazySlot::new();
        let calls = Cell::new(0);
        let first = slot.get_or_init(|| {
            calls.set(calls.get() + 1);
            "first"
        });
        let second = slot.get_or_init(|| {
            calls.set(calls.get() + 1);
            "second"
        });
        assert_eq!(*first, "first");
        assert!(core::ptr::eq(first, second));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_error_leaves_slot_empty() {
        let slot: LazySlot<String> = LazySlot::new();
        let err = slot.get_or_try_init(|| Err::<String, _>("boom")).unwrap_err();
        assert_eq!(err, "boom");
        assert!(!slot.is_occupied());
        assert!(!slot.guard().is_locked());

        let value = slot.get_or_try_init(|| Ok::<_, &str>("ok".to_owned())).unwrap();
        assert_eq!(value, "ok");
    }

    #[test]
    fn test_get_mut_and_into_inner() {
        let mut slot = LazySlot::new();
        assert!(slot.get_mut().is_none());
        slot.get_or_init(|| vec![1, 2]);
        slot.get_mut().unwrap().push(3);
        assert_eq!(slot.into_inner(), Some(vec![1, 2, 3]));

        let empty: LazySlot<Vec<u8>> = LazySlot::new();
        assert_eq!(empty.into_inner(), None);
    }

    #[test]
    fn test_drops_value_exactly_once() {
        let marker = Rc::new(());
        {
            // `Rc` is not `Sync`, but the slot is still usable single-threaded.
            let slot = LazySlot::new();
            slot.get_or_init(|| Rc::clone(&marker));
            assert_eq!(Rc::strong_count(&marker), 2);
        }
        assert_eq!(Rc::strong_count(&marker), 1);

        let slot = LazySlot::new();
        slot.get_or_init(|| Rc::clone(&marker));
        let taken = slot.into_inner();
        assert_eq!(Rc::strong_count(&marker), 2);
        drop(taken);
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn test_debug_format() {
        let slot = LazySlot::new();
        assert_eq!(format!("{slot:?}"), "LazySlot(<empty>)");
        slot.get_or_init(|| 3);
        assert_eq!(format!("{slot:?}"), "LazySlot(3)");
    }
}
