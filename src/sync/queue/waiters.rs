use std::{mem, task::Waker};

/// Tasks parked on one of the queue's conditions.
///
/// Lives inside the queue's lock. Wakeups are broadcast: every registered
/// task is woken and re-checks its own condition, just like the threads
/// waiting on the matching condition variable.
#[derive(Debug, Default)]
pub(crate) struct Waiters {
    wakers: Vec<Waker>,
}

impl Waiters {
    /// Registers `waker`, unless an equivalent one is already parked.
    pub(crate) fn register(&mut self, waker: &Waker) {
        if !self.wakers.iter().any(|w| w.will_wake(waker)) {
            self.wakers.push(waker.clone());
        }
    }

    /// Removes every parked task, so they can be woken once the lock is
    /// released.
    pub(crate) fn take(&mut self) -> Waiters {
        Waiters {
            wakers: mem::take(&mut self.wakers),
        }
    }

    pub(crate) fn wake_all(self) {
        for waker in self.wakers {
            waker.wake();
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.wakers.len()
    }
}
