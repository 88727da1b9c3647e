//! Outcome types shared by every buffer operation

use core::fmt;

/// Error types for buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingBufferError {
    /// The operation makes no sense in the current state: reading a single
    /// element from an empty buffer, or writing a single element to a full
    /// buffer that rejects overwrites
    ///
    /// # Example
    /// ```
    /// use lockring::{RingBuffer, RingBufferError, SpinLock};
    ///
    /// let buf = RingBuffer::<u8, SpinLock, 4>::new(SpinLock::new());
    /// assert_eq!(buf.get(), Err(RingBufferError::Illegal));
    /// ```
    Illegal,
    /// The lock could not be acquired; nothing was changed
    Timeout,
}

impl fmt::Display for RingBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Illegal => write!(f, "illegal operation for the current buffer state"),
            Self::Timeout => write!(f, "timed out before the lock could be acquired"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RingBufferError {}

/// How a successful write went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PutStatus {
    /// Everything written went into free slots
    Ok,
    /// The buffer was full and the oldest unread data was discarded
    Overwrite,
}

/// Result of a bulk write
///
/// `count` can be lower than the number of items offered: once the buffer
/// saturates the rest of the request is dropped. That is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transfer {
    /// Number of items actually stored
    pub count: usize,
    /// Whether unread data was discarded first
    pub status: PutStatus,
}

/// Flat status code covering every outcome
///
/// Handy where a single byte has to be stored or reported, e.g. from an
/// interrupt handler into a status register.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Completed as requested
    Ok = 0,
    /// See [`RingBufferError::Illegal`]
    Illegal = 1,
    /// See [`RingBufferError::Timeout`]
    Timeout = 2,
    /// Completed after discarding the oldest unread data
    Overwrite = 3,
}

impl Outcome {
    /// Collapses any operation result into its status code
    ///
    /// ```
    /// use lockring::{Outcome, RingBuffer, SpinLock};
    ///
    /// let buf = RingBuffer::<u32, SpinLock, 8>::new(SpinLock::new());
    /// assert_eq!(Outcome::of(&buf.get().map(drop)), Outcome::Illegal);
    /// assert_eq!(Outcome::of(&buf.put(7)), Outcome::Ok);
    /// assert_eq!(Outcome::of(&buf.level()), Outcome::Ok);
    /// ```
    pub fn of<V: Into<Outcome> + Copy, E: Into<Outcome> + Copy>(result: &Result<V, E>) -> Self {
        match result {
            Ok(value) => (*value).into(),
            Err(err) => (*err).into(),
        }
    }

    /// The numeric status code
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<RingBufferError> for Outcome {
    fn from(err: RingBufferError) -> Self {
        match err {
            RingBufferError::Illegal => Self::Illegal,
            RingBufferError::Timeout => Self::Timeout,
        }
    }
}

impl From<PutStatus> for Outcome {
    fn from(status: PutStatus) -> Self {
        match status {
            PutStatus::Ok => Self::Ok,
            PutStatus::Overwrite => Self::Overwrite,
        }
    }
}

impl From<Transfer> for Outcome {
    fn from(transfer: Transfer) -> Self {
        transfer.status.into()
    }
}

macro_rules! plain_success {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Outcome {
                fn from(_: $ty) -> Self {
                    Self::Ok
                }
            }
        )*
    };
}

// Values returned next to an Ok outcome: counts, flags, unit.
plain_success!((), bool, usize);
