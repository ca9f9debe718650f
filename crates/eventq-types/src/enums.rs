//! Classification newtypes carried by every [`Event`](crate::Event).
//!
//! Both types are thin wrappers around `i32`. The queue never validates
//! them: any value a caller supplies is stored and compared as-is. The
//! associated constants name the codes the surrounding resource system
//! conventionally uses.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event status
// ---------------------------------------------------------------------------

/// The kind of occurrence an event describes.
///
/// Status codes are caller-trusted. Values outside the named constants are
/// carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventStatus(pub i32);

impl EventStatus {
    /// The resource is completely depleted.
    pub const EMPTY: Self = Self(0);
    /// The resource holds less than a consumer asked for.
    pub const INSUFFICIENT: Self = Self(1);
    /// The resource is running low.
    pub const LOW: Self = Self(2);
    /// Normal operation.
    pub const OK: Self = Self(3);
    /// The resource is at its maximum capacity.
    pub const CAPACITY: Self = Self(4);

    /// Return the raw status code.
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Return the conventional name of this status, if it has one.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("EMPTY"),
            1 => Some("INSUFFICIENT"),
            2 => Some("LOW"),
            3 => Some("OK"),
            4 => Some("CAPACITY"),
            _ => None,
        }
    }
}

impl From<i32> for EventStatus {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl core::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(name) = self.name() {
            return write!(f, "{name}");
        }
        write!(f, "STATUS({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Ordering key of an event. Larger values are dequeued first.
///
/// `Ord` on this type is plain integer ordering, so `Priority::HIGH >
/// Priority::LOW` and negative priorities sort below all the named levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    /// Background work that can wait.
    pub const LOW: Self = Self(1);
    /// Routine events.
    pub const STANDARD: Self = Self(2);
    /// Events that must be handled before anything else.
    pub const HIGH: Self = Self(3);

    /// Return the raw priority value.
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for Priority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
