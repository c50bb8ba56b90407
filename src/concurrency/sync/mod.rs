//! Blocking primitives for the slow path.
//!
//! Waiting is done directly on the address of an `AtomicU32`: `futex(2)` on
//! Linux, `WaitOnAddress` on Windows, and a yielding spin everywhere else.

pub mod futex_mutex;

pub use futex_mutex::{FutexMutex, FutexMutexGuard};

use core::sync::atomic::AtomicU32;
#[cfg(not(any(windows, target_os = "linux")))]
use core::sync::atomic::Ordering;

#[cfg(windows)]
use windows_sys::Win32::System::Threading::{WaitOnAddress, WakeByAddressAll, WakeByAddressSingle};

#[cfg(target_os = "linux")]
use libc::{SYS_futex, FUTEX_PRIVATE_FLAG, FUTEX_WAIT, FUTEX_WAKE};

#[cfg(target_os = "linux")]
#[inline]
fn futex_wait(addr: &AtomicU32, expected: u32) {
    // SAFETY: `addr` is a live, aligned `u32`; a spurious return is fine since
    // every caller re-checks the value in a loop.
    unsafe {
        libc::syscall(
            SYS_futex,
            addr.as_ptr(),
            FUTEX_WAIT | FUTEX_PRIVATE_FLAG,
            expected,
            core::ptr::null::<libc::timespec>(),
        );
    }
}

#[cfg(target_os = "linux")]
#[inline]
fn futex_wake(addr: &AtomicU32, count: i32) {
    // SAFETY: waking never touches memory beyond the futex word.
    unsafe {
        libc::syscall(SYS_futex, addr.as_ptr(), FUTEX_WAKE | FUTEX_PRIVATE_FLAG, count);
    }
}

/// Wakes all threads waiting on the given address.
#[inline]
pub fn wake_all_u32(addr: &AtomicU32) {
    #[cfg(windows)]
    unsafe {
        WakeByAddressAll(addr.as_ptr().cast::<core::ffi::c_void>());
    }
    #[cfg(target_os = "linux")]
    futex_wake(addr, i32::MAX);
    #[cfg(not(any(windows, target_os = "linux")))]
    let _ = addr;
}

/// Wakes one thread waiting on the given address.
#[inline]
pub fn wake_one_u32(addr: &AtomicU32) {
    #[cfg(windows)]
    unsafe {
        WakeByAddressSingle(addr.as_ptr().cast::<core::ffi::c_void>());
    }
    #[cfg(target_os = "linux")]
    futex_wake(addr, 1);
    #[cfg(not(any(windows, target_os = "linux")))]
    let _ = addr;
}

/// Blocks while the value at `addr` equals `expected`.
///
/// May return spuriously; callers must re-check.
#[inline]
pub fn wait_on_u32(addr: &AtomicU32, expected: u32) {
    #[cfg(windows)]
    unsafe {
        let expected_ptr = core::ptr::addr_of!(expected).cast::<core::ffi::c_void>();
        let size = core::mem::size_of::<u32>();
        WaitOnAddress(addr.as_ptr().cast::<core::ffi::c_void>(), expected_ptr, size, u32::MAX);
    }
    #[cfg(target_os = "linux")]
    futex_wait(addr, expected);
    #[cfg(not(any(windows, target_os = "linux")))]
    while addr.load(Ordering::Acquire) == expected {
        std::thread::yield_now();
    }
}
