//! Shared type definitions for the eventq priority queue.
//!
//! An [`Event`] is a small, immutable record of one occurrence: who emitted
//! it, which resource it concerns, what kind of occurrence it is, how urgent
//! it is, and a quantity. The emitter and resource objects themselves belong
//! to the surrounding system; an event only borrows them.
//!
//! # Modules
//!
//! - [`event`] -- The [`Event`] value type.
//! - [`enums`] -- [`EventStatus`] and [`Priority`] classification newtypes.
//! - [`ids`] -- Typed UUID identifiers for emitters and resources.

pub mod enums;
pub mod event;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{EventStatus, Priority};
pub use event::Event;
pub use ids::{EmitterId, ResourceId};
