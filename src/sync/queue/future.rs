//! Asynchronous access to a [`BlockingQueue`].
//!
//! A pending future never holds the queue's lock, so dropping it cancels the
//! operation without leaving any trace in the queue's contents. The task's
//! waker stays registered, though: a dropped dequeue's waker until the next
//! enqueue and a dropped enqueue's waker until the next dequeue, which then
//! wake it spuriously.

use std::task::{Context, Poll};

use futures_util::{future::poll_fn, stream, Stream};

use super::BlockingQueue;

impl<T> BlockingQueue<T> {
    /// Pushes a value onto the queue, waiting if the queue is full.
    ///
    /// Dropping the returned future before it completes drops the value
    /// instead of enqueuing it.
    pub async fn enqueue_async(&self, val: T) {
        let mut val = Some(val);
        poll_fn(|cx| self.poll_enqueue(cx, &mut val)).await
    }

    /// Removes the value at the front of the queue, waiting if the queue is
    /// empty.
    pub async fn dequeue_async(&self) -> T {
        poll_fn(|cx| self.poll_dequeue(cx)).await
    }

    /// Attempt to remove a value from the queue. Returns `Poll::Ready` with
    /// the value if there is one, otherwise registers the task to be woken
    /// by the next enqueue and returns `Poll::Pending`.
    pub fn poll_dequeue(&self, cx: &mut Context<'_>) -> Poll<T> {
        let mut state = self.state.lock();
        match self.pop(&mut state) {
            Some(val) => {
                Self::wake_senders(state);
                Poll::Ready(val)
            }
            None => {
                state.receivers.register(cx.waker());
                Poll::Pending
            }
        }
    }

    /// Returns an endless stream of dequeued values.
    pub fn stream(&self) -> impl Stream<Item = T> + '_ {
        stream::poll_fn(move |cx| self.poll_dequeue(cx).map(Some))
    }

    fn poll_enqueue(&self, cx: &mut Context<'_>, val: &mut Option<T>) -> Poll<()> {
        let mut state = self.state.lock();
        self.grow_if_needed(&mut state);
        if state.ring.is_full() {
            state.senders.register(cx.waker());
            return Poll::Pending;
        }
        if let Some(val) = val.take() {
            self.push(state, val);
        }
        Poll::Ready(())
    }
}
