//! `NaiveSlot` — single-check lazy initialization, kept as a contrast case.
//!
//! The slot reads its pointer once, and if it is null constructs a value and
//! tries to publish it. Nothing stops two threads from both seeing null and
//! both running the constructor. Publication still goes through a
//! compare-and-swap, so every caller gets the winner's value and the losers'
//! surplus values are dropped: the race costs extra constructions, never
//! memory safety.

use core::fmt;
use core::marker::PhantomData;
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

/// A lazily filled slot with no construction guard.
///
/// Use it where a duplicated constructor run is harmless. Where it is not,
/// use [`LazySlot`](crate::LazySlot).
pub struct NaiveSlot<T> {
    ptr: AtomicPtr<T>,
    _owns: PhantomData<Box<T>>,
}

// SAFETY: same reasoning as `LazySlot`: values move between threads on
// construction/drop and are shared by reference.
unsafe impl<T: Send + Sync> Sync for NaiveSlot<T> {}
unsafe impl<T: Send> Send for NaiveSlot<T> {}

impl<T> NaiveSlot<T> {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
            _owns: PhantomData,
        }
    }

    /// Returns the published value, if any.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: a non-null pointer came from `Box::into_raw` and is only
        // freed by `Drop`/`into_inner`, which need exclusive access.
        unsafe { self.ptr.load(Ordering::Acquire).as_ref() }
    }

    /// Returns the value, constructing it if the single check finds the slot
    /// empty. `init` may run on several threads at once.
    pub fn get_or_init<F>(&self, init: F) -> &T
    where
        F: FnOnce() -> T,
    {
        match self.get_or_try_init(|| Ok::<T, core::convert::Infallible>(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`get_or_init`](Self::get_or_init).
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let fresh = Box::into_raw(Box::new(init()?));
        match self
            .ptr
            .compare_exchange(ptr::null_mut(), fresh, Ordering::AcqRel, Ordering::Acquire)
        {
            // SAFETY: `fresh` is now owned by the slot.
            Ok(_) => Ok(unsafe { &*fresh }),
            Err(winner) => {
                // SAFETY: `fresh` was never shared; `winner` is published.
                drop(unsafe { Box::from_raw(fresh) });
                Ok(unsafe { &*winner })
            }
        }
    }

    /// Consumes the slot, returning the value if one was published.
    pub fn into_inner(mut self) -> Option<T> {
        let raw = core::mem::replace(self.ptr.get_mut(), ptr::null_mut());
        // SAFETY: non-null pointers come from `Box::into_raw`.
        (!raw.is_null()).then(|| *unsafe { Box::from_raw(raw) })
    }
}

impl<T> Default for NaiveSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for NaiveSlot<T> {
    fn drop(&mut self) {
        let raw = *self.ptr.get_mut();
        if !raw.is_null() {
            // SAFETY: exclusive access; the pointer came from `Box::into_raw`.
            drop(unsafe { Box::from_raw(raw) });
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for NaiveSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_tuple("NaiveSlot");
        match self.get() {
            Some(value) => d.field(value),
            None => d.field(&format_args!("<empty>")),
        };
        d.finish()
    }
}
