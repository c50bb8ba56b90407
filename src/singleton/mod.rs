//! Zero-argument accessors over a [`LazySlot`].
//!
//! A `Singleton` is a slot bundled with the constructor for its payload, so
//! callers only ever ask for the instance. `TrySingleton` is the same for
//! constructors that can fail.

mod macros;

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;

use crate::cell::LazySlot;
use crate::concurrency::sync::FutexMutex;
use crate::guard::InitGuard;

/// A lazily constructed shared instance.
///
/// ```rust
/// use solo::Singleton;
///
/// struct Registry {
///     names: Vec<&'static str>,
/// }
///
/// static REGISTRY: Singleton<Registry> = Singleton::new(|| Registry { names: vec!["a", "b"] });
///
/// let a = REGISTRY.get_instance();
/// let b = REGISTRY.get_instance();
/// assert!(core::ptr::eq(a, b));
/// assert_eq!(REGISTRY.names.len(), 2);
/// ```
pub struct Singleton<T, F = fn() -> T, G = FutexMutex> {
    slot: LazySlot<T, G>,
    init: F,
}

impl<T, F> Singleton<T, F, FutexMutex> {
    /// Creates a singleton that will build its instance with `init`.
    pub const fn new(init: F) -> Self {
        Self::with_guard(init, FutexMutex::new())
    }
}

impl<T, F, G> Singleton<T, F, G> {
    /// Creates a singleton whose construction is serialized by `guard`.
    pub const fn with_guard(init: F, guard: G) -> Self {
        Self {
            slot: LazySlot::with_guard(guard),
            init,
        }
    }

    /// Returns the instance if it has been constructed. Never blocks.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.slot.get()
    }

    /// Returns `true` once the instance exists.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.slot.is_occupied()
    }

    /// The underlying slot.
    pub fn slot(&self) -> &LazySlot<T, G> {
        &self.slot
    }
}

impl<T, F, G> Singleton<T, F, G>
where
    F: Fn() -> T,
    G: InitGuard,
{
    /// Returns the one shared instance, constructing it on first call.
    #[inline]
    pub fn get_instance(&self) -> &T {
        self.slot.get_or_init(&self.init)
    }
}

impl<T, F, G> Deref for Singleton<T, F, G>
where
    F: Fn() -> T,
    G: InitGuard,
{
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.get_instance()
    }
}

impl<T: fmt::Debug, F, G> fmt::Debug for Singleton<T, F, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton").field("slot", &self.slot).finish_non_exhaustive()
    }
}

/// A lazily constructed shared instance whose constructor can fail.
///
/// Failures go back to the caller that ran the constructor; the instance stays
/// absent and the next call tries again.
///
/// ```rust
/// use solo::TrySingleton;
///
/// static PORT: TrySingleton<u16, std::num::ParseIntError> =
///     TrySingleton::new(|| "8080".parse());
///
/// assert_eq!(PORT.get_instance(), Ok(&8080));
/// ```
pub struct TrySingleton<T, E, F = fn() -> Result<T, E>, G = FutexMutex> {
    slot: LazySlot<T, G>,
    init: F,
    _error: PhantomData<fn() -> E>,
}

impl<T, E, F> TrySingleton<T, E, F, FutexMutex> {
    /// Creates a singleton that will try to build its instance with `init`.
    pub const fn new(init: F) -> Self {
        Self::with_guard(init, FutexMutex::new())
    }
}

impl<T, E, F, G> TrySingleton<T, E, F, G> {
    /// Creates a singleton whose construction is serialized by `guard`.
    pub const fn with_guard(init: F, guard: G) -> Self {
        Self {
            slot: LazySlot::with_guard(guard),
            init,
            _error: PhantomData,
        }
    }

    /// Returns the instance if it has been constructed. Never blocks.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.slot.get()
    }

    /// Returns `true` once the instance exists.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.slot.is_occupied()
    }

    /// The underlying slot.
    pub fn slot(&self) -> &LazySlot<T, G> {
        &self.slot
    }
}

impl<T, E, F, G> TrySingleton<T, E, F, G>
where
    F: Fn() -> Result<T, E>,
    G: InitGuard,
{
    /// Returns the one shared instance, constructing it if needed.
    ///
    /// # Errors
    ///
    /// Returns the constructor's error if this call ran the constructor and it
    /// failed.
    #[inline]
    pub fn get_instance(&self) -> Result<&T, E> {
        self.slot.get_or_try_init(&self.init)
    }
}

impl<T: fmt::Debug, E, F, G> fmt::Debug for TrySingleton<T, E, F, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrySingleton").field("slot", &self.slot).finish_non_exhaustive()
    }
}
