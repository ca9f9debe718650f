//! Error types for the load generator binary.
//!
//! [`LoadgenError`] wraps every failure mode so `main` can propagate with
//! `?`.

use eventq_queue::{ConfigError, QueueError};

/// Top-level error for the load generator.
#[derive(Debug, thiserror::Error)]
pub enum LoadgenError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The configuration parsed but describes an unrunnable workload.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),

    /// The queue refused a push with a non-transient error.
    #[error("queue error: {source}")]
    Queue {
        /// The underlying queue error.
        #[from]
        source: QueueError,
    },

    /// A producer or consumer thread panicked.
    #[error("{role} thread panicked")]
    WorkerPanicked {
        /// Which kind of worker failed ("producer" or "consumer").
        role: &'static str,
    },

    /// Pushed and popped counts disagree after the run.
    #[error("event imbalance: {pushed} pushed, {popped} popped, {remaining} left in queue")]
    Imbalance {
        /// Events successfully pushed.
        pushed: u64,
        /// Events popped by consumers.
        popped: u64,
        /// Entries still queued at teardown.
        remaining: usize,
    },
}
