//! Caller-supplied mutual exclusion
//!
//! The buffer never blocks and never retries: it makes exactly one
//! [`RawLock::try_acquire`] attempt per operation and, on success, exactly
//! one matching [`RawLock::release`].

use core::mem;

/// A non-blocking lock the buffer can try once per operation
///
/// # Safety
/// While a successful `try_acquire` has not been matched by `release`, every
/// other `try_acquire` on the same lock must return `false`. The buffer hands
/// out `&mut` access to its state on the strength of this guarantee.
pub unsafe trait RawLock {
    /// Attempts to take the lock without waiting indefinitely
    fn try_acquire(&self) -> bool;

    /// Releases a lock previously taken by `try_acquire`
    fn release(&self);
}

/// Lock built from a pair of plain functions
///
/// Suits firmware where the critical section is a global facility, e.g.
/// masking an interrupt line or taking a hardware semaphore.
///
/// ```
/// use core::sync::atomic::{AtomicBool, Ordering};
/// use lockring::{FnLock, RingBuffer};
///
/// static TAKEN: AtomicBool = AtomicBool::new(false);
///
/// fn acquire() -> bool {
///     TAKEN
///         .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
///         .is_ok()
/// }
///
/// fn release() {
///     TAKEN.store(false, Ordering::Release);
/// }
///
/// // Safety: acquire/release implement a test-and-set flag.
/// static QUEUE: RingBuffer<u16, FnLock, 32> =
///     RingBuffer::new(unsafe { FnLock::new(acquire, release) });
///
/// QUEUE.put(0x1234).unwrap();
/// assert_eq!(QUEUE.get(), Ok(0x1234));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnLock {
    acquire: fn() -> bool,
    release: fn(),
}

impl FnLock {
    /// # Safety
    /// `acquire` and `release` must uphold the [`RawLock`] contract.
    pub const unsafe fn new(acquire: fn() -> bool, release: fn()) -> Self {
        Self { acquire, release }
    }
}

unsafe impl RawLock for FnLock {
    #[inline]
    fn try_acquire(&self) -> bool {
        (self.acquire)()
    }

    #[inline]
    fn release(&self) {
        (self.release)()
    }
}

/// Spinlock-backed lock for hosts with threads
///
/// `try_acquire` never spins; contention surfaces as
/// [`RingBufferError::Timeout`](crate::RingBufferError::Timeout).
#[derive(Debug, Default)]
pub struct SpinLock {
    inner: spin::Mutex<()>,
}

impl SpinLock {
    /// Creates an unlocked lock, usable in `static` items
    pub const fn new() -> Self {
        Self {
            inner: spin::Mutex::new(()),
        }
    }

    /// Racy hint, like [`spin::Mutex::is_locked`]
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

unsafe impl RawLock for SpinLock {
    #[inline]
    fn try_acquire(&self) -> bool {
        // The guard is forgotten; `release` unlocks explicitly.
        self.inner.try_lock().map(mem::forget).is_some()
    }

    #[inline]
    fn release(&self) {
        // SAFETY: only called by a `CriticalSection` that holds the lock.
        unsafe { self.inner.force_unlock() }
    }
}

/// One acquisition of a [`RawLock`], released on drop
pub(crate) struct CriticalSection<'a, L: RawLock> {
    lock: &'a L,
}

impl<'a, L: RawLock> CriticalSection<'a, L> {
    /// Single attempt; `None` means the lock is busy
    #[inline]
    pub(crate) fn enter(lock: &'a L) -> Option<Self> {
        if lock.try_acquire() {
            Some(Self { lock })
        } else {
            None
        }
    }
}

impl<L: RawLock> Drop for CriticalSection<'_, L> {
    #[inline]
    fn drop(&mut self) {
        self.lock.release();
    }
}
