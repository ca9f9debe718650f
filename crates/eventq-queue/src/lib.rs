//! Thread-safe priority queue of events.
//!
//! Producers on any number of threads push [`Event`]s; consumers pop them in
//! strict priority order. The queue is the only synchronization point
//! between them: one mutex guards the whole ordered chain.
//!
//! # Ordering
//!
//! - Higher [`Priority`] values are popped first.
//! - Equal priorities are popped first-in, first-out. Under contention
//!   "first in" means first to acquire the queue's lock, not first to call
//!   [`EventQueue::push`].
//!
//! # Lifecycle
//!
//! A queue is ready as soon as it is constructed ([`EventQueue::new`] or
//! [`EventQueue::with_config`]) and stays ready until
//! [`EventQueue::teardown`] consumes it. There is no uninitialized or
//! destroyed queue to misuse.
//!
//! # Polling
//!
//! [`EventQueue::pop`] never blocks waiting for data. An empty queue yields
//! `None`; retry and back-off policy belong to the caller.
//!
//! # Usage
//!
//! ```
//! use eventq_queue::EventQueue;
//! use eventq_types::{Event, EventStatus, Priority};
//!
//! struct Pump;
//! struct Tank;
//!
//! let pump = Pump;
//! let tank = Tank;
//! let queue = EventQueue::new();
//!
//! queue.push(Event::new(&pump, &tank, EventStatus::OK, Priority::LOW, 5)).ok();
//! queue.push(Event::new(&pump, &tank, EventStatus::EMPTY, Priority::HIGH, 0)).ok();
//!
//! let first = queue.pop().map(|e| e.status());
//! assert_eq!(first, Some(EventStatus::EMPTY));
//! assert_eq!(queue.len(), 1);
//! assert_eq!(queue.teardown(), 1);
//! ```

pub mod config;
pub mod error;
pub mod queue;

// Re-export primary types at crate root.
pub use config::{ConfigError, QueueConfig};
pub use error::QueueError;
pub use queue::{EventQueue, QueueStats};

pub use eventq_types::{Event, EventStatus, Priority};
