//! Synchronization building blocks for the slot's slow path.

pub(crate) mod primitives;
pub mod sync;

pub use sync::{FutexMutex, FutexMutexGuard};
