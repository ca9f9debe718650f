//! Error types for the `eventq-queue` crate.
//!
//! Only resource exhaustion is a runtime failure. Popping an empty queue is
//! reported as `None`, and an uninitialized or torn-down queue cannot be
//! named at all.

use std::collections::TryReserveError;

/// Errors returned by [`EventQueue`](crate::EventQueue) operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Node storage could not be allocated.
    #[error("event queue allocation failed: {source}")]
    ResourceExhausted {
        /// The underlying allocation error.
        #[from]
        source: TryReserveError,
    },

    /// The queue was configured with a bound and already holds that many
    /// entries.
    #[error("event queue is at capacity ({capacity})")]
    Full {
        /// The configured maximum length.
        capacity: usize,
    },
}

impl QueueError {
    /// Whether a later retry of the same push may succeed.
    ///
    /// A full queue drains as consumers pop; an allocation failure does not
    /// resolve on its own.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Full { .. })
    }
}
