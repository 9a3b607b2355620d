//! Lockable clocks that can be compared against each other from many threads.
//!
//! Comparing two clocks that other threads may be mutating needs both locks
//! held at once. Locks are always taken in ascending identity order, and
//! identities come from a process-wide counter, so they are unique and any
//! two threads agree on the order for any pair. Comparing `(a, b)` on one
//! thread while another compares `(b, a)` therefore cannot deadlock.
//!
//! A handler keeps its own timestamp behind one mutex and never needs this;
//! it is for callers that share clocks across threads outside a handler.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use crate::time::{Clock, LogicalClock, VectorClock};

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

fn next_identity() -> u64 {
    NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed)
}

/// A clock behind its own mutex, tagged with a unique identity.
///
/// Cloning copies the current value into a new, independent instance with a
/// fresh identity.
pub struct SharedClock<C> {
    identity: u64,
    inner: Mutex<C>,
}

impl<C> SharedClock<C> {
    pub fn new(clock: C) -> Self {
        Self {
            identity: next_identity(),
            inner: Mutex::new(clock),
        }
    }

    /// The identity used to order lock acquisition. Never shared by two live instances.
    pub fn identity(&self) -> u64 {
        self.identity
    }

    /// Runs `f` with exclusive access to the clock.
    pub fn update<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.lock())
    }

    /// Runs `f` against a consistent view of the clock.
    pub fn read<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.lock())
    }

    pub fn into_inner(self) -> C {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // Clocks are plain data; a panic inside a caller's closure cannot leave
    // one half-updated in a way later readers could not handle.
    fn lock(&self) -> MutexGuard<'_, C> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock> SharedClock<C> {
    pub fn snapshot(&self) -> C {
        self.read(C::clone)
    }

    /// `true` when this clock is strictly less than `other`, with both held
    /// still for the duration of the comparison. A clock is never less than itself.
    pub fn less_than(&self, other: &SharedClock<C>) -> bool {
        lock_both(self, other, |mine, theirs| mine.is_less_than(theirs)).unwrap_or(false)
    }
}

impl SharedClock<LogicalClock> {
    pub fn tick(&self) {
        self.update(LogicalClock::tick);
    }
}

impl SharedClock<VectorClock> {
    pub fn tick(&self, name: &str) {
        self.update(|clock| clock.tick(name));
    }

    /// Merges `other` into this clock. Merging a clock with itself changes nothing.
    pub fn merge(&self, other: &SharedClock<VectorClock>) {
        lock_both(self, other, |mine, theirs| mine.merge(theirs));
    }
}

impl<C: Clock> Clone for SharedClock<C> {
    fn clone(&self) -> Self {
        Self::new(self.snapshot())
    }
}

impl<C: Default> Default for SharedClock<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: fmt::Debug> fmt::Debug for SharedClock<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("SharedClock");
        out.field("identity", &self.identity);
        match self.inner.try_lock() {
            Ok(clock) => out.field("clock", &*clock),
            Err(TryLockError::Poisoned(poisoned)) => out.field("clock", &*poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => out.field("clock", &"<locked>"),
        };
        out.finish()
    }
}

/// Locks `left` and `right` in identity order and runs `f` on both.
///
/// Returns `None` without locking anything when both arguments are the same
/// instance. Guards are released in reverse acquisition order.
pub fn lock_both<A, B, R>(
    left: &SharedClock<A>,
    right: &SharedClock<B>,
    f: impl FnOnce(&mut A, &mut B) -> R,
) -> Option<R> {
    if left.identity == right.identity {
        return None;
    }

    if left.identity < right.identity {
        let mut first = left.lock();
        let mut second = right.lock();
        let result = f(&mut first, &mut second);
        drop(second);
        drop(first);
        Some(result)
    } else {
        let mut first = right.lock();
        let mut second = left.lock();
        let result = f(&mut second, &mut first);
        drop(second);
        drop(first);
        Some(result)
    }
}
