#![cfg_attr(not(any(test, feature = "std")), no_std)]
//! Fixed-capacity circular buffer guarded by a caller-supplied lock
//!
//! ## Key Features
//! - 🧱 `no_std`, no allocation: storage is an inline array sized by a const generic
//! - 🔒 Bring your own lock: any [`RawLock`] (interrupt masking, hardware
//!   semaphore, [`SpinLock`], ...) guards every operation
//! - ⏱️ Never blocks: one lock attempt per call, contention is reported as
//!   [`RingBufferError::Timeout`]
//! - ⚡ Bulk transfers copy in at most two contiguous segments
//! - ♻️ Reject or overwrite-oldest policy chosen at compile time
//! - 🔄 Seamless integration with [`heapless::Vec`](https://docs.rs/heapless)
//!
//! ## Use Cases
//! - Passing samples from an interrupt handler to the main loop
//! - UART/DMA byte queues in firmware
//! - Bounded hand-off between threads without heap usage
//!
//! ## Example
//! ```rust
//! use lockring::{PutStatus, RingBuffer, SpinLock};
//!
//! let buf = RingBuffer::<i32, SpinLock, 16>::new(SpinLock::new());
//!
//! assert_eq!(buf.put(7), Ok(PutStatus::Ok));
//! let sent = buf.put_slice(&[1, 2, 3]).unwrap();
//! assert_eq!(sent.count, 3);
//!
//! let mut output = [0; 4];
//! let read = buf.get_slice(&mut output).unwrap();
//! assert_eq!(&output[..read], &[7, 1, 2, 3]);
//! ```
//!
//! The capacity must be a power of two; anything else fails to compile:
//! ```compile_fail
//! use lockring::{RingBuffer, SpinLock};
//!
//! let buf = RingBuffer::<u8, SpinLock, 12>::new(SpinLock::new());
//! ```

mod error;
mod lock;
mod state;

use core::{
    cell::UnsafeCell,
    fmt,
    mem::MaybeUninit,
    sync::atomic::{AtomicBool, Ordering},
};

pub use error::{Outcome, PutStatus, RingBufferError, Transfer};
pub use lock::{FnLock, RawLock, SpinLock};

use lock::CriticalSection;
use state::State;

/// Circular FIFO of `N` elements of `T`, guarded by the lock `L`
///
/// # Generic Parameters
/// - `T`: element type, moved by plain bitwise copies
/// - `L`: the lock every operation (except [`is_full`](Self::is_full)) tries once
/// - `N`: capacity in elements, must be a power of two
/// - `OVERWRITE`: when `true`, writes to a full buffer discard the oldest
///   unread elements instead of failing
///
/// # Implementation Details
/// - Cursor arithmetic uses masking, never modulo
/// - Each call is a single critical section: one acquire, one release
/// - The full flag is mirrored into an atomic for lock-free queries
pub struct RingBuffer<T, L, const N: usize, const OVERWRITE: bool = false> {
    /// Storage and cursors, only reachable while `lock` is held
    state: UnsafeCell<State<T, N>>,
    /// Copy of the full flag, refreshed at the end of each critical section
    full: AtomicBool,
    lock: L,
}

/// Ring buffer that evicts the oldest unread data when written while full
pub type OverwritingRingBuffer<T, L, const N: usize> = RingBuffer<T, L, N, true>;

// SAFETY: `state` is only dereferenced inside a `CriticalSection`, and the
// `RawLock` contract makes those mutually exclusive.
unsafe impl<T: Send, L: RawLock + Sync, const N: usize, const OVERWRITE: bool> Sync
    for RingBuffer<T, L, N, OVERWRITE>
{
}

impl<T: Copy, L: RawLock, const N: usize, const OVERWRITE: bool> RingBuffer<T, L, N, OVERWRITE> {
    /// Creates an empty buffer guarded by `lock`
    ///
    /// Usable in `static` items. Storage is left uninitialised; only slots
    /// that have been written are ever read back.
    ///
    /// # Examples
    /// ```
    /// use lockring::{RingBuffer, SpinLock};
    ///
    /// static SAMPLES: RingBuffer<u16, SpinLock, 64> = RingBuffer::new(SpinLock::new());
    ///
    /// assert_eq!(SAMPLES.is_empty(), Ok(true));
    /// assert_eq!(SAMPLES.capacity(), 64);
    /// ```
    pub const fn new(lock: L) -> Self {
        const { assert!(N.is_power_of_two(), "capacity must be a power of two") };

        Self {
            state: UnsafeCell::new(State::new()),
            full: AtomicBool::new(false),
            lock,
        }
    }

    /// Number of elements the buffer holds when full, always `N`
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The lock guarding this buffer
    pub fn raw_lock(&self) -> &L {
        &self.lock
    }

    /// Runs `f` on the state inside one critical section
    fn critical<R>(&self, f: impl FnOnce(&mut State<T, N>) -> R) -> Result<R, RingBufferError> {
        let _section = CriticalSection::enter(&self.lock).ok_or(RingBufferError::Timeout)?;
        // SAFETY: the lock is held, so this is the only live reference.
        let state = unsafe { &mut *self.state.get() };
        let result = f(&mut *state);
        self.full.store(state.is_full(), Ordering::Release);
        Ok(result)
    }

    /// Appends one element
    ///
    /// # Errors
    /// - [`RingBufferError::Illegal`] if the buffer is full and does not overwrite
    /// - [`RingBufferError::Timeout`] if the lock is busy
    ///
    /// A full overwriting buffer drops its oldest element and reports
    /// [`PutStatus::Overwrite`].
    pub fn put(&self, item: T) -> Result<PutStatus, RingBufferError> {
        self.critical(|state| {
            let status = if !state.is_full() {
                PutStatus::Ok
            } else if OVERWRITE {
                state.evict(1);
                PutStatus::Overwrite
            } else {
                return Err(RingBufferError::Illegal);
            };
            state.put_one(item);
            Ok(status)
        })?
    }

    /// Appends as many of `items` as fit
    ///
    /// Never fails for lack of space: once the buffer fills up the rest of
    /// `items` is dropped and [`Transfer::count`] says how many were stored.
    /// A full buffer that does not overwrite stores nothing and still
    /// reports [`PutStatus::Ok`].
    ///
    /// A full overwriting buffer first discards its `min(items.len(), N)`
    /// oldest elements and reports [`PutStatus::Overwrite`], even when
    /// `items` is empty and nothing is discarded.
    ///
    /// # Errors
    /// [`RingBufferError::Timeout`] if the lock is busy
    ///
    /// # Performance
    /// - Worst-case: 2 copy operations
    /// - One lock acquisition
    ///
    /// # Example
    /// ```
    /// use lockring::{OverwritingRingBuffer, PutStatus, SpinLock};
    ///
    /// let buf = OverwritingRingBuffer::<u8, SpinLock, 4>::new(SpinLock::new());
    /// buf.put_slice(&[1, 2, 3, 4]).unwrap();
    ///
    /// let sent = buf.put_slice(&[5, 6]).unwrap();
    /// assert_eq!((sent.count, sent.status), (2, PutStatus::Overwrite));
    ///
    /// let mut output = [0; 4];
    /// buf.get_slice(&mut output).unwrap();
    /// assert_eq!(output, [3, 4, 5, 6]);
    /// ```
    pub fn put_slice(&self, items: &[T]) -> Result<Transfer, RingBufferError> {
        self.critical(|state| {
            let mut status = PutStatus::Ok;
            if state.is_full() {
                if !OVERWRITE {
                    return Transfer { count: 0, status };
                }
                state.evict(items.len());
                status = PutStatus::Overwrite;
            }
            Transfer {
                count: state.put_many(items),
                status,
            }
        })
    }

    /// Removes the oldest element
    ///
    /// # Errors
    /// - [`RingBufferError::Illegal`] if the buffer is empty
    /// - [`RingBufferError::Timeout`] if the lock is busy
    pub fn get(&self) -> Result<T, RingBufferError> {
        self.critical(State::get_one)?.ok_or(RingBufferError::Illegal)
    }

    /// Moves up to `output.len()` of the oldest elements into `output`
    ///
    /// Returns the number of elements read; slots of `output` past that are
    /// left as they were. Reading from an empty buffer is not an error and
    /// returns `Ok(0)`.
    ///
    /// # Errors
    /// [`RingBufferError::Timeout`] if the lock is busy
    ///
    /// # Performance
    /// - Worst-case: 2 copy operations
    /// - One lock acquisition
    pub fn get_slice(&self, output: &mut [T]) -> Result<usize, RingBufferError> {
        // SAFETY: same layout, and only initialised elements are written
        // through this view.
        let output = unsafe { &mut *(output as *mut [T] as *mut [MaybeUninit<T>]) };
        self.critical(|state| state.get_many(output))
    }

    /// Discards everything unread
    ///
    /// Stored bytes are not cleared.
    pub fn reset(&self) -> Result<(), RingBufferError> {
        self.critical(State::reset)
    }

    /// Whether there is nothing to read
    pub fn is_empty(&self) -> Result<bool, RingBufferError> {
        self.critical(|state| state.is_empty())
    }

    /// Whether the buffer was full at the end of the last operation (lock-free)
    ///
    /// Only a hint while other contexts may be writing or reading.
    pub fn is_full(&self) -> bool {
        self.full.load(Ordering::Acquire)
    }

    /// Number of unread elements
    pub fn level(&self) -> Result<usize, RingBufferError> {
        self.critical(|state| state.level())
    }

    /// Free slots, always `capacity() - level()`
    pub fn available(&self) -> Result<usize, RingBufferError> {
        self.critical(|state| state.available())
    }
}

impl<T: Copy, L: RawLock + Default, const N: usize, const OVERWRITE: bool> Default
    for RingBuffer<T, L, N, OVERWRITE>
{
    fn default() -> Self {
        Self::new(L::default())
    }
}

/// heapless::Vec integration (enabled via "heapless" feature)
#[cfg(feature = "heapless")]
impl<T: Copy, L: RawLock, const N: usize, const OVERWRITE: bool> RingBuffer<T, L, N, OVERWRITE> {
    /// Appends the contents of a [`heapless::Vec`], same rules as
    /// [`put_slice`](Self::put_slice)
    ///
    /// # Example
    /// ```
    /// # use lockring::{RingBuffer, SpinLock};
    /// # use heapless::Vec;
    /// let buf = RingBuffer::<u8, SpinLock, 256>::new(SpinLock::new());
    /// let mut vec = Vec::<u8, 32>::new();
    /// vec.extend_from_slice(b"data").unwrap();
    /// assert_eq!(buf.put_vec(&vec).unwrap().count, 4);
    /// ```
    pub fn put_vec<const V: usize>(
        &self,
        items: &heapless::Vec<T, V>,
    ) -> Result<Transfer, RingBufferError> {
        self.put_slice(items.as_slice())
    }

    /// Pops up to `count` elements into a new [`heapless::Vec`]
    ///
    /// The vector holds `min(count, V, level)` elements.
    pub fn get_vec<const V: usize>(
        &self,
        count: usize,
    ) -> Result<heapless::Vec<T, V>, RingBufferError> {
        let mut temp = [MaybeUninit::<T>::uninit(); N];
        let to_read = count.min(V).min(N);
        let read = self.critical(|state| state.get_many(&mut temp[..to_read]))?;

        // SAFETY: `get_many` initialised the first `read` slots.
        let items = unsafe { &*(&temp[..read] as *const [MaybeUninit<T>] as *const [T]) };
        let mut vec = heapless::Vec::new();
        let stored = vec.extend_from_slice(items);
        debug_assert!(stored.is_ok(), "read at most V elements");
        Ok(vec)
    }
}

// Debug implementation shows buffer utilization
impl<T: Copy, L: RawLock, const N: usize, const OVERWRITE: bool> fmt::Debug
    for RingBuffer<T, L, N, OVERWRITE>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policy = if OVERWRITE { "overwrite" } else { "reject" };
        match self.level() {
            Ok(level) => write!(
                f,
                "RingBuffer<{}, {}>[{} used, {} free]",
                N,
                policy,
                level,
                N - level
            ),
            Err(_) => write!(f, "RingBuffer<{}, {}>[locked]", N, policy),
        }
    }
}
