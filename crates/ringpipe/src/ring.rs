use crate::error::{ConfigError, Disconnected};
use crate::invariants::{
    debug_assert_bounded_count, debug_assert_index_in_range, debug_assert_indices_match_count,
};
use crate::metrics::BufferMetrics;
use crate::sync::{Condvar, Mutex, MutexGuard};
use std::fmt;
use std::sync::PoisonError;
use tracing::trace;

// =============================================================================
// SYNCHRONIZATION STRATEGY
// =============================================================================
//
// All buffer state (storage, head, tail, count, closed, disconnected, metrics)
// lives behind ONE mutex. Two condition variables hang off that mutex:
//
// - `not_full`:  the producer waits here while `count == capacity`
// - `not_empty`: the consumer waits here while `count == 0 && !closed`
//
// ## Completion Detection
//
// End-of-stream is the `closed` flag inside the locked state, not a separate
// atomic. The consumer therefore evaluates "closed AND empty" in one critical
// section, and `close()` broadcasts on `not_empty` under the same lock, so a
// consumer can never check `closed`, get preempted, and miss the wakeup.
//
// ## Wait Loops
//
// Every wait re-checks its predicate after waking (spurious wakeups, and
// state changes by `close()`/`disconnect()` which use `notify_all`).
//
// ## Shutdown Directions
//
// - Producer → Consumer: `close()`. The consumer drains what is left, then
//   `get()` returns `None` forever.
// - Consumer → Producer: `disconnect()`. A producer blocked on a full buffer
//   wakes and `put()` returns `Disconnected` instead of waiting forever.
//
// ## Poisoning
//
// The only panic raised while the lock is held is the put-after-close
// contract check, which fires before any mutation. The state is still
// consistent, so poisoned guards are recovered with `into_inner`.
//
// =============================================================================

/// Lifecycle of a [`RingBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Accepting puts and gets.
    Open,
    /// Closed, but buffered bytes remain to be drained.
    Draining,
    /// Closed and empty. Terminal: every get returns `None`.
    ClosedEmpty,
}

/// Fixed-capacity blocking byte ring shared by one producer and one consumer.
///
/// Peak memory is `capacity` bytes no matter how long the stream is: a fast
/// producer blocks in [`put`](Self::put) until the consumer frees a slot.
pub struct RingBuffer {
    capacity: usize,
    state: Mutex<State>,
    not_full: Condvar,
    not_empty: Condvar,
}

struct State {
    /// Backing storage, `capacity` bytes, never reallocated.
    storage: Box<[u8]>,
    /// Next write position.
    head: usize,
    /// Next read position.
    tail: usize,
    /// Occupied slots.
    count: usize,
    /// Producer finished. Never reverts.
    closed: bool,
    /// Consumer gave up. Never reverts.
    disconnected: bool,
    metrics: BufferMetrics,
}

impl State {
    #[inline]
    fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Copies as many bytes as fit, wrapping around the end of storage.
    fn push_slice(&mut self, bytes: &[u8]) -> usize {
        let capacity = self.capacity();
        let n = bytes.len().min(capacity - self.count);
        let first = n.min(capacity - self.head);

        self.storage[self.head..self.head + first].copy_from_slice(&bytes[..first]);
        self.storage[..n - first].copy_from_slice(&bytes[first..n]);

        self.head = (self.head + n) % capacity;
        self.count += n;
        self.metrics.record_in(n, self.count);

        debug_assert_bounded_count!(self.count, capacity);
        debug_assert_index_in_range!("head", self.head, capacity);
        debug_assert_indices_match_count!(self.head, self.tail, self.count, capacity);

        n
    }

    fn pop(&mut self) -> Option<u8> {
        if self.count == 0 {
            return None;
        }
        let capacity = self.capacity();
        let byte = self.storage[self.tail];
        self.tail = (self.tail + 1) % capacity;
        self.count -= 1;
        self.metrics.record_out(1);

        debug_assert_index_in_range!("tail", self.tail, capacity);
        debug_assert_indices_match_count!(self.head, self.tail, self.count, capacity);

        Some(byte)
    }
}

impl RingBuffer {
    /// Creates an empty, open buffer holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        Ok(Self {
            capacity,
            state: Mutex::new(State {
                storage: vec![0; capacity].into_boxed_slice(),
                head: 0,
                tail: 0,
                count: 0,
                closed: false,
                disconnected: false,
                metrics: BufferMetrics::default(),
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---------------------------------------------------------------------
    // STATUS (advisory snapshots: stale as soon as they return)
    // ---------------------------------------------------------------------

    /// Returns the buffer capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current number of buffered bytes.
    pub fn len(&self) -> usize {
        self.lock().count
    }

    /// Returns true if no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Returns true once [`disconnect`](Self::disconnect) has been called.
    pub fn is_disconnected(&self) -> bool {
        self.lock().disconnected
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> BufferState {
        let state = self.lock();
        match (state.closed, state.count) {
            (false, _) => BufferState::Open,
            (true, 0) => BufferState::ClosedEmpty,
            (true, _) => BufferState::Draining,
        }
    }

    /// Returns a snapshot of the buffer counters.
    pub fn metrics(&self) -> BufferMetrics {
        self.lock().metrics
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Appends one byte, blocking while the buffer is full.
    ///
    /// Returns `Err(Disconnected)` if the consumer has abandoned the buffer.
    ///
    /// # Panics
    ///
    /// Panics if called after [`close`](Self::close). Writing after closing is
    /// a bug in the producer, not a runtime condition.
    #[inline]
    pub fn put(&self, byte: u8) -> Result<(), Disconnected> {
        self.put_slice(std::slice::from_ref(&byte))
    }

    /// Appends all of `bytes` in order, blocking whenever the buffer is full.
    ///
    /// Equivalent to calling [`put`](Self::put) for every byte, but copies as
    /// much as currently fits under a single lock acquisition and wakes the
    /// consumer after each copy.
    ///
    /// # Panics
    ///
    /// Panics if called after [`close`](Self::close).
    pub fn put_slice(&self, mut bytes: &[u8]) -> Result<(), Disconnected> {
        let mut state = self.lock();
        loop {
            assert!(
                !state.closed,
                "put on a closed RingBuffer: the producer must not write after close()"
            );
            if state.disconnected {
                return Err(Disconnected);
            }
            if bytes.is_empty() {
                return Ok(());
            }
            if state.is_full() {
                state.metrics.producer_waits += 1;
                state = self
                    .not_full
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            }

            let n = state.push_slice(bytes);
            bytes = &bytes[n..];
            self.not_empty.notify_one();
        }
    }

    /// Marks end-of-stream and wakes every waiter. Idempotent, never blocks.
    ///
    /// Buffered bytes stay readable; once they are drained the buffer is
    /// [`BufferState::ClosedEmpty`] for good.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        trace!(remaining = state.count, "ring buffer closed");

        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Removes the oldest byte, blocking while the buffer is empty and open.
    ///
    /// Returns `None` only when the buffer is closed and empty; from then on
    /// every call returns `None`.
    pub fn get(&self) -> Option<u8> {
        let mut state = self.lock();
        while state.count == 0 && !state.closed {
            state.metrics.consumer_waits += 1;
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let byte = state.pop()?;
        self.not_full.notify_one();
        Some(byte)
    }

    /// Removes the oldest byte without blocking. `None` if empty, closed or not.
    pub fn try_get(&self) -> Option<u8> {
        let mut state = self.lock();
        let byte = state.pop()?;
        self.not_full.notify_one();
        Some(byte)
    }

    /// Abandons the buffer from the consumer side and wakes every waiter.
    ///
    /// Any blocked or later `put` returns [`Disconnected`]. Idempotent.
    pub fn disconnect(&self) {
        let mut state = self.lock();
        if state.disconnected {
            return;
        }
        state.disconnected = true;
        trace!(discarded = state.count, "ring buffer disconnected");

        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("len", &state.count)
            .field("closed", &state.closed)
            .field("disconnected", &state.disconnected)
            .finish_non_exhaustive()
    }
}
