//! Synchronization utilities.

use std::fmt;

use thiserror::Error;

mod config;
pub mod queue;
mod ring;

pub use self::{
    config::{GrowthPolicy, QueueConfig},
    queue::BlockingQueue,
};

/// An error raised when a queue is built from an invalid configuration.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The initial capacity was zero.
    #[error("queue capacity must be positive")]
    ZeroCapacity,
    /// The growth threshold was not strictly between 0 and 1.
    #[error("growth threshold must be between 0.0 and 1.0 (exclusive), got {0}")]
    ThresholdOutOfRange(f64),
    /// The growth factor would not increase the capacity.
    #[error("growth factor must be greater than 1.0, got {0}")]
    FactorTooSmall(f64),
}

/// An error emitted when an absent item is offered to a queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("cannot enqueue an absent item")]
pub struct NullItemError;

/// An error that may be emitted when attempting to enqueue a value without
/// blocking.
#[derive(Copy, Clone, PartialEq, Eq, Error)]
pub enum TryEnqueueError<T> {
    /// The queue was full when the enqueue was attempted.
    #[error("enqueuing on a full queue")]
    Full(T),
}

impl<T> TryEnqueueError<T> {
    /// Consume the error and return the value that wasn't enqueued.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) => value,
        }
    }
}

impl<T> fmt::Debug for TryEnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TryEnqueueError::Full(..) => f.write_str("Full(..)"),
        }
    }
}

/// An error that may be emitted when an enqueue gives up waiting for space.
#[derive(Copy, Clone, PartialEq, Eq, Error)]
pub enum EnqueueTimeoutError<T> {
    /// The queue stayed full for the whole timeout.
    #[error("timed out enqueuing on a full queue")]
    Timeout(T),
}

impl<T> EnqueueTimeoutError<T> {
    /// Consume the error and return the value that wasn't enqueued.
    pub fn into_inner(self) -> T {
        match self {
            Self::Timeout(value) => value,
        }
    }
}

impl<T> fmt::Debug for EnqueueTimeoutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EnqueueTimeoutError::Timeout(..) => f.write_str("Timeout(..)"),
        }
    }
}

/// An error that may be emitted when attempting to dequeue a value without
/// blocking.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum TryDequeueError {
    /// The queue was empty when the dequeue was attempted.
    #[error("dequeuing from an empty queue")]
    Empty,
}

/// An error that may be emitted when a dequeue gives up waiting for a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum DequeueTimeoutError {
    /// The queue stayed empty for the whole timeout.
    #[error("timed out dequeuing from an empty queue")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_values_are_handed_back() {
        assert_eq!(7, TryEnqueueError::Full(7).into_inner());
        assert_eq!("x", EnqueueTimeoutError::Timeout("x").into_inner());
    }

    #[test]
    fn debug_does_not_require_debug_values() {
        struct Opaque;
        assert_eq!("Full(..)", format!("{:?}", TryEnqueueError::Full(Opaque)));
        assert_eq!(
            "Timeout(..)",
            format!("{:?}", EnqueueTimeoutError::Timeout(Opaque))
        );
    }

    #[test]
    fn config_errors_name_the_offending_value() {
        assert_eq!(
            "growth factor must be greater than 1.0, got 0.5",
            ConfigError::FactorTooSmall(0.5).to_string()
        );
        assert_eq!(
            "queue capacity must be positive",
            ConfigError::ZeroCapacity.to_string()
        );
    }
}
