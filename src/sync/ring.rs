//! The circular storage behind the blocking queues.

/// A fixed-size ring of slots.
///
/// `Ring` holds the queued values in a boxed slice and tracks the front,
/// rear and length cursors. It performs no synchronization; the owning
/// queue serializes every access behind its lock.
#[derive(Debug)]
pub(crate) struct Ring<T> {
    slots: Box<[Option<T>]>,
    front: usize,
    rear: usize,
    len: usize,
}

impl<T> Ring<T> {
    /// Creates an empty ring with `capacity` slots. `capacity` must be
    /// positive.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring capacity must be positive");
        Self {
            slots: empty_slots(capacity),
            front: 0,
            rear: capacity - 1,
            len: 0,
        }
    }

    /// Writes a value after the current rear. The ring must not be full.
    pub(crate) fn push(&mut self, val: T) {
        debug_assert!(!self.is_full(), "push on a full ring");
        self.rear = (self.rear + 1) % self.capacity();
        debug_assert!(self.slots[self.rear].is_none());
        self.slots[self.rear] = Some(val);
        self.len += 1;
    }

    /// Removes the value at the front, leaving its slot empty.
    pub(crate) fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let val = self.slots[self.front].take();
        debug_assert!(val.is_some(), "occupied slot was empty");
        self.front = (self.front + 1) % self.capacity();
        self.len -= 1;
        val
    }

    /// Moves the queued values into `capacity` fresh slots, unwrapping them
    /// so the front lands at index 0.
    pub(crate) fn resize(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.len && capacity > 0);
        let old_capacity = self.capacity();
        let front = self.front;
        let mut slots: Vec<Option<T>> = Vec::with_capacity(capacity);
        slots.extend((0..self.len).map(|i| self.slots[(front + i) % old_capacity].take()));
        slots.resize_with(capacity, || None);
        self.slots = slots.into_boxed_slice();
        self.front = 0;
        self.rear = self.len.checked_sub(1).unwrap_or(capacity - 1);
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len == self.capacity()
    }
}

fn empty_slots<T>(capacity: usize) -> Box<[Option<T>]> {
    (0..capacity).map(|_| None).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn pops_in_insertion_order() {
        let mut ring = Ring::with_capacity(3);
        ring.push(1);
        ring.push(2);
        ring.push(3);
        assert!(ring.is_full());
        assert_eq!(Some(1), ring.pop());
        assert_eq!(Some(2), ring.pop());
        assert_eq!(Some(3), ring.pop());
        assert_eq!(None, ring.pop());
        assert!(ring.is_empty());
    }

    #[test]
    fn wraps_around() {
        let mut ring = Ring::with_capacity(3);
        for i in 0..10 {
            ring.push(i);
            ring.push(i + 100);
            assert_eq!(Some(i), ring.pop());
            assert_eq!(Some(i + 100), ring.pop());
        }
        assert_eq!(0, ring.len());
    }

    #[test]
    fn resize_unwraps_in_order() {
        let mut ring = Ring::with_capacity(4);
        for i in 0..4 {
            ring.push(i);
        }
        assert_eq!(Some(0), ring.pop());
        assert_eq!(Some(1), ring.pop());
        ring.push(4);
        ring.push(5);
        // Front is at slot 2 and the rear has wrapped to slot 1.
        ring.resize(8);
        assert_eq!(8, ring.capacity());
        assert_eq!(4, ring.len());
        ring.push(6);
        let drained: Vec<_> = std::iter::from_fn(|| ring.pop()).collect();
        assert_eq!(vec![2, 3, 4, 5, 6], drained);
    }

    #[test]
    fn resize_of_empty_ring_accepts_pushes() {
        let mut ring = Ring::with_capacity(2);
        ring.push(1);
        assert_eq!(Some(1), ring.pop());
        ring.resize(5);
        ring.push(2);
        assert_eq!(Some(2), ring.pop());
    }

    #[test]
    fn popped_slots_release_their_values() {
        let item = Arc::new(10);
        let mut ring = Ring::with_capacity(2);
        ring.push(item.clone());
        drop(ring.pop());
        assert_eq!(1, Arc::strong_count(&item));
    }

    #[test]
    fn lost_items_are_dropped() {
        let item = Arc::new(10);
        {
            let mut ring = Ring::with_capacity(2);
            ring.push(item.clone());
            ring.resize(4);
            assert_eq!(2, Arc::strong_count(&item));
        }
        assert_eq!(1, Arc::strong_count(&item));
    }
}
