//! The [`Event`] value type.
//!
//! An event borrows its emitter and resource for `'a`. The borrow checker
//! therefore guarantees that both objects outlive every copy of the event,
//! including copies sitting inside a queue. Nothing in this crate ever
//! mutates or frees them.

use crate::enums::{EventStatus, Priority};

/// One occurrence produced by an emitter and concerning a resource.
///
/// `Event` is `Copy` for any `S` and `R` because it only holds references.
/// Its fields are private and there are no setters, so a value is immutable
/// once constructed.
#[derive(Debug)]
pub struct Event<'a, S, R> {
    emitter: &'a S,
    resource: &'a R,
    status: EventStatus,
    priority: Priority,
    amount: i32,
}

impl<'a, S, R> Event<'a, S, R> {
    /// Construct an event.
    ///
    /// No range checks are performed; `status`, `priority` and `amount` are
    /// trusted as given.
    pub const fn new(
        emitter: &'a S,
        resource: &'a R,
        status: EventStatus,
        priority: Priority,
        amount: i32,
    ) -> Self {
        Self {
            emitter,
            resource,
            status,
            priority,
            amount,
        }
    }

    /// The entity that produced this event.
    pub const fn emitter(&self) -> &'a S {
        self.emitter
    }

    /// The resource this event refers to.
    pub const fn resource(&self) -> &'a R {
        self.resource
    }

    /// The status classification.
    pub const fn status(&self) -> EventStatus {
        self.status
    }

    /// The ordering key. Higher is dequeued first.
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// The quantity carried by the event.
    pub const fn amount(&self) -> i32 {
        self.amount
    }
}

// Manual impls: a derive would require `S: Clone` and `R: Clone`.
impl<S, R> Clone for Event<'_, S, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, R> Copy for Event<'_, S, R> {}
