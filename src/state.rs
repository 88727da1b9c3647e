//! Storage, cursors and the transfer arithmetic, with no locking

use core::{mem::MaybeUninit, ops::Range};

/// Moves a cursor forward, wrapping with a mask instead of a modulo
///
/// `N` must be a power of two and `step` at most `N`.
#[inline]
pub(crate) const fn advance<const N: usize>(index: usize, step: usize) -> usize {
    (index + step) & (N - 1)
}

/// Up to two contiguous runs of storage slots, in FIFO order
///
/// `second` is empty unless the transfer wraps, in which case it starts at
/// slot 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Chunks {
    pub first: Range<usize>,
    pub second: Range<usize>,
}

impl Chunks {
    const fn single(first: Range<usize>) -> Self {
        Self {
            first,
            second: 0..0,
        }
    }

    const fn wrapped(first: Range<usize>, second: usize) -> Self {
        Self {
            first,
            second: 0..second,
        }
    }

    pub fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }
}

/// A resolved bulk transfer: where to copy, and whether the buffer ends up
/// full (writes) or empty (reads) afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Plan {
    pub chunks: Chunks,
    pub saturates: bool,
}

/// Buffer state, only ever touched inside a critical section
pub(crate) struct State<T, const N: usize> {
    storage: [MaybeUninit<T>; N],
    write: usize,
    read: usize,
    full: bool,
}

impl<T: Copy, const N: usize> State<T, N> {
    pub const fn new() -> Self {
        Self {
            storage: [const { MaybeUninit::uninit() }; N],
            write: 0,
            read: 0,
            full: false,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.write == self.read && !self.full
    }

    pub fn level(&self) -> usize {
        if self.full {
            N
        } else if self.write >= self.read {
            self.write - self.read
        } else {
            N + self.write - self.read
        }
    }

    #[inline]
    pub fn available(&self) -> usize {
        N - self.level()
    }

    fn mark_full(&mut self) {
        self.write = self.read;
        self.full = true;
    }

    fn mark_empty(&mut self) {
        self.read = self.write;
        self.full = false;
    }

    /// Empties the buffer without touching the stored bytes
    pub fn reset(&mut self) {
        self.mark_empty();
    }

    /// Discards the `count` oldest elements of a full buffer
    pub fn evict(&mut self, count: usize) {
        debug_assert!(self.full);
        self.read = advance::<N>(self.read, count.min(N));
    }

    /// Stores one element; the caller has already made room
    pub fn put_one(&mut self, item: T) {
        self.storage[self.write] = MaybeUninit::new(item);
        self.write = advance::<N>(self.write, 1);
        self.full = self.write == self.read;
    }

    pub fn get_one(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: slots in the unread region have all been written by a put.
        let item = unsafe { self.storage[self.read].assume_init() };
        self.read = advance::<N>(self.read, 1);
        self.full = false;
        Some(item)
    }

    /// Resolves a write of `n` items into at most two chunks of free slots
    ///
    /// A full buffer whose read cursor was just moved by [`State::evict`]
    /// plans like any other: the free region is read-bounded.
    pub fn plan_write(&self, n: usize) -> Plan {
        let (write, read) = (self.write, self.read);
        if write >= read {
            let tail = N - write;
            if n < tail {
                return Plan {
                    chunks: Chunks::single(write..write + n),
                    saturates: false,
                };
            }
            let remaining = n - tail;
            if remaining < read {
                Plan {
                    chunks: Chunks::wrapped(write..N, remaining),
                    saturates: false,
                }
            } else {
                Plan {
                    chunks: Chunks::wrapped(write..N, read),
                    saturates: true,
                }
            }
        } else {
            let gap = read - write;
            if n < gap {
                Plan {
                    chunks: Chunks::single(write..write + n),
                    saturates: false,
                }
            } else {
                Plan {
                    chunks: Chunks::single(write..read),
                    saturates: true,
                }
            }
        }
    }

    /// Resolves a read of up to `n` items into at most two chunks of
    /// unread slots
    pub fn plan_read(&self, n: usize) -> Plan {
        let (write, read) = (self.write, self.read);
        if self.is_empty() {
            return Plan {
                chunks: Chunks::single(read..read),
                saturates: false,
            };
        }
        if write > read {
            let unread = write - read;
            if n < unread {
                Plan {
                    chunks: Chunks::single(read..read + n),
                    saturates: false,
                }
            } else {
                Plan {
                    chunks: Chunks::single(read..write),
                    saturates: true,
                }
            }
        } else {
            let tail = N - read;
            if n < tail {
                return Plan {
                    chunks: Chunks::single(read..read + n),
                    saturates: false,
                };
            }
            let remaining = n - tail;
            if remaining < write {
                Plan {
                    chunks: Chunks::wrapped(read..N, remaining),
                    saturates: false,
                }
            } else {
                Plan {
                    chunks: Chunks::wrapped(read..N, write),
                    saturates: true,
                }
            }
        }
    }

    /// Copies as many of `items` as fit, returning how many were stored
    pub fn put_many(&mut self, items: &[T]) -> usize {
        let Plan { chunks, saturates } = self.plan_write(items.len());
        let count = chunks.len();
        let (first, second) = as_uninit(items)[..count].split_at(chunks.first.len());

        self.storage[chunks.first].copy_from_slice(first);
        self.storage[chunks.second].copy_from_slice(second);

        if saturates {
            self.mark_full();
        } else {
            self.write = advance::<N>(self.write, count);
        }
        count
    }

    /// Copies up to `output.len()` unread elements out, returning how many
    /// were read
    ///
    /// Only the first `count` slots of `output` are written.
    pub fn get_many(&mut self, output: &mut [MaybeUninit<T>]) -> usize {
        let Plan { chunks, saturates } = self.plan_read(output.len());
        let count = chunks.len();
        let (first, second) = output[..count].split_at_mut(chunks.first.len());

        first.copy_from_slice(&self.storage[chunks.first]);
        second.copy_from_slice(&self.storage[chunks.second]);

        if saturates {
            self.mark_empty();
        } else if count > 0 {
            self.read = advance::<N>(self.read, count);
            self.full = false;
        }
        count
    }

    #[cfg(test)]
    pub fn cursors(&self) -> (usize, usize) {
        (self.write, self.read)
    }
}

#[inline]
fn as_uninit<T>(items: &[T]) -> &[MaybeUninit<T>] {
    // SAFETY: `MaybeUninit<T>` has the same layout as `T`, and the slice is
    // only read from.
    unsafe { &*(items as *const [T] as *const [MaybeUninit<T>]) }
}
