//! A multi-producer, multi-consumer blocking queue over a ring buffer.
//!
//! All queue state sits behind a single lock. Producers wait on a
//! "not full" condition and consumers on a "not empty" one, re-checking the
//! condition after every wakeup. Wakeups are broadcast, so no ordering among
//! waiters is guaranteed.
//!
//! A queue built with a [`GrowthPolicy`] enlarges its storage before an
//! insertion whenever utilization has reached the policy's threshold, so its
//! producers never wait for space.

use std::{
    fmt,
    time::{Duration, Instant},
};

use log::{debug, info, trace};
use parking_lot::{Condvar, Mutex, MutexGuard};

use self::waiters::Waiters;
use crate::sync::{
    ring::Ring, ConfigError, DequeueTimeoutError, EnqueueTimeoutError, GrowthPolicy,
    NullItemError, QueueConfig, TryDequeueError, TryEnqueueError,
};

mod future;
mod waiters;

struct State<T> {
    ring: Ring<T>,
    /// Tasks waiting for a free slot.
    senders: Waiters,
    /// Tasks waiting for a value.
    receivers: Waiters,
}

/// A FIFO queue whose operations block while the queue is full or empty.
///
/// The queue is shared between threads by reference, usually through an
/// [`Arc`](std::sync::Arc).
///
/// # Examples
///
/// ```
/// use std::{sync::Arc, thread};
///
/// use conveyor::sync::BlockingQueue;
///
/// let queue = Arc::new(BlockingQueue::bounded(2).unwrap());
/// let producer = {
///     let queue = queue.clone();
///     thread::spawn(move || {
///         for i in 0..10 {
///             queue.enqueue(i);
///         }
///     })
/// };
/// for i in 0..10 {
///     assert_eq!(i, queue.dequeue());
/// }
/// producer.join().unwrap();
/// ```
pub struct BlockingQueue<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    growth: Option<GrowthPolicy>,
}

impl<T> BlockingQueue<T> {
    /// Creates a queue holding at most `capacity` values.
    pub fn bounded(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(QueueConfig::default().with_capacity(capacity))
    }

    /// Creates a queue that starts with `capacity` slots and grows according
    /// to `policy`.
    ///
    /// # Examples
    ///
    /// ```
    /// use conveyor::sync::{BlockingQueue, GrowthPolicy};
    ///
    /// let policy = GrowthPolicy::new(0.5, 2.0).unwrap();
    /// let queue = BlockingQueue::growable(2, policy).unwrap();
    /// queue.enqueue("a");
    /// assert_eq!(2, queue.capacity());
    /// queue.enqueue("b");
    /// assert_eq!(4, queue.capacity());
    /// ```
    pub fn growable(capacity: usize, policy: GrowthPolicy) -> Result<Self, ConfigError> {
        Self::with_config(
            QueueConfig::default()
                .with_capacity(capacity)
                .with_growth(policy),
        )
    }

    /// Creates a queue from a full configuration.
    pub fn with_config(config: QueueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: QueueConfig) -> Self {
        Self {
            state: Mutex::new(State {
                ring: Ring::with_capacity(config.capacity),
                senders: Waiters::default(),
                receivers: Waiters::default(),
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            growth: config.growth,
        }
    }

    /// Pushes a value onto the queue, waiting while the queue is full.
    pub fn enqueue(&self, val: T) {
        let mut state = self.state.lock();
        self.wait_for_space(&mut state, None);
        self.push(state, val);
    }

    /// Pushes a value that may be absent. An absent value is rejected
    /// without touching the queue; otherwise this behaves like
    /// [`enqueue`](Self::enqueue).
    pub fn enqueue_nullable(&self, val: Option<T>) -> Result<(), NullItemError> {
        let val = val.ok_or(NullItemError)?;
        self.enqueue(val);
        Ok(())
    }

    /// Attempt to push a value onto the queue. Returns an error if the queue
    /// is full.
    pub fn try_enqueue(&self, val: T) -> Result<(), TryEnqueueError<T>> {
        let mut state = self.state.lock();
        self.grow_if_needed(&mut state);
        if state.ring.is_full() {
            return Err(TryEnqueueError::Full(val));
        }
        self.push(state, val);
        Ok(())
    }

    /// Pushes a value onto the queue, waiting at most `timeout` for space.
    /// On timeout the value is handed back and the queue is left as it was.
    /// A timeout too large to represent as a deadline waits indefinitely.
    pub fn enqueue_timeout(
        &self,
        val: T,
        timeout: Duration,
    ) -> Result<(), EnqueueTimeoutError<T>> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        if !self.wait_for_space(&mut state, deadline) {
            return Err(EnqueueTimeoutError::Timeout(val));
        }
        self.push(state, val);
        Ok(())
    }

    /// Removes the value at the front of the queue, waiting while the queue
    /// is empty.
    pub fn dequeue(&self) -> T {
        let mut state = self.state.lock();
        loop {
            if let Some(val) = self.pop(&mut state) {
                Self::wake_senders(state);
                return val;
            }
            debug!("dequeue waiting, queue empty");
            self.not_empty.wait(&mut state);
        }
    }

    /// Attempt to remove a value from the queue. Returns an error if the
    /// queue is empty.
    pub fn try_dequeue(&self) -> Result<T, TryDequeueError> {
        let mut state = self.state.lock();
        let val = self.pop(&mut state).ok_or(TryDequeueError::Empty)?;
        Self::wake_senders(state);
        Ok(val)
    }

    /// Removes the value at the front of the queue, waiting at most
    /// `timeout` for one to arrive.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Result<T, DequeueTimeoutError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        loop {
            if let Some(val) = self.pop(&mut state) {
                Self::wake_senders(state);
                return Ok(val);
            }
            debug!("dequeue waiting, queue empty");
            match deadline {
                Some(deadline) => {
                    if self.not_empty.wait_until(&mut state, deadline).timed_out() {
                        let val = self.pop(&mut state).ok_or(DequeueTimeoutError::Timeout)?;
                        Self::wake_senders(state);
                        return Ok(val);
                    }
                }
                None => self.not_empty.wait(&mut state),
            }
        }
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().ring.is_empty()
    }

    /// Returns true if the queue is full.
    ///
    /// A growable queue never reports being full, since its next insertion
    /// grows the storage first.
    pub fn is_full(&self) -> bool {
        self.growth.is_none() && self.state.lock().ring.is_full()
    }

    /// Returns the number of values in the queue.
    pub fn len(&self) -> usize {
        self.state.lock().ring.len()
    }

    /// Returns the capacity of the queue.
    pub fn capacity(&self) -> usize {
        self.state.lock().ring.capacity()
    }

    /// Returns the fraction of slots currently occupied.
    pub fn utilization(&self) -> f64 {
        let state = self.state.lock();
        state.ring.len() as f64 / state.ring.capacity() as f64
    }

    /// Returns the growth policy, if the queue is growable.
    pub fn growth_policy(&self) -> Option<GrowthPolicy> {
        self.growth
    }

    /// Waits until the ring has a free slot, growing it first if the policy
    /// asks for it. Returns false if `deadline` passed while still full;
    /// without a deadline it waits indefinitely.
    fn wait_for_space(
        &self,
        state: &mut MutexGuard<'_, State<T>>,
        deadline: Option<Instant>,
    ) -> bool {
        loop {
            self.grow_if_needed(state);
            if !state.ring.is_full() {
                return true;
            }
            debug!(
                "enqueue waiting, queue full (capacity {})",
                state.ring.capacity()
            );
            match deadline {
                Some(deadline) => {
                    if self.not_full.wait_until(state, deadline).timed_out() {
                        self.grow_if_needed(state);
                        return !state.ring.is_full();
                    }
                }
                None => self.not_full.wait(state),
            }
        }
    }

    fn grow_if_needed(&self, state: &mut State<T>) {
        let Some(policy) = self.growth else {
            return;
        };
        let (len, capacity) = (state.ring.len(), state.ring.capacity());
        if !policy.should_grow(len, capacity) {
            return;
        }
        let new_capacity = policy.next_capacity(capacity);
        if new_capacity == capacity {
            // Saturated; fall back to waiting for space.
            return;
        }
        state.ring.resize(new_capacity);
        info!(
            "resized queue from {} to {} slots (utilization {:.2} reached threshold {})",
            capacity,
            new_capacity,
            len as f64 / capacity as f64,
            policy.threshold()
        );
        self.not_full.notify_all();
    }

    /// Pushes onto a ring known to have space, then wakes every consumer.
    fn push(&self, mut state: MutexGuard<'_, State<T>>, val: T) {
        state.ring.push(val);
        trace!("enqueued, {} values queued", state.ring.len());
        self.not_empty.notify_all();
        let receivers = state.receivers.take();
        drop(state);
        receivers.wake_all();
    }

    /// Pops the front value, if any, and wakes every producer thread.
    /// Producer tasks are left to [`wake_senders`](Self::wake_senders).
    fn pop(&self, state: &mut State<T>) -> Option<T> {
        let val = state.ring.pop()?;
        trace!("dequeued, {} values queued", state.ring.len());
        self.not_full.notify_all();
        Some(val)
    }

    fn wake_senders(mut state: MutexGuard<'_, State<T>>) {
        let senders = state.senders.take();
        drop(state);
        senders.wake_all();
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::build(QueueConfig::default())
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BlockingQueue")
            .field("len", &state.ring.len())
            .field("capacity", &state.ring.capacity())
            .field("growth", &self.growth)
            .finish()
    }
}
