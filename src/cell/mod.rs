//! Lazily filled slots.
//!
//! - [`LazySlot`] guards construction with double-checked locking.
//! - [`NaiveSlot`] checks once and races; it is the contrast case.

pub mod lazy_slot;
pub mod naive_slot;

pub use lazy_slot::LazySlot;
pub use naive_slot::NaiveSlot;
