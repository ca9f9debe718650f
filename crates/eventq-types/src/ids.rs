//! Typed identities for the objects events borrow.
//!
//! The queue never looks at these; they exist for collaborators that want
//! to name emitters and resources in logs or reports without mixing the two
//! up. Each id renders as `<kind>:<uuid>`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID v7 newtype with a kind prefix used by `Display`.
macro_rules! typed_id {
    (
        $(#[$meta:meta])*
        $name:ident => $kind:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Prefix used when the id is displayed.
            pub const KIND: &'static str = $kind;

            /// Generate a fresh, time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Borrow the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}:{}", Self::KIND, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

typed_id! {
    /// Identity of an entity that emits events.
    EmitterId => "emitter"
}

typed_id! {
    /// Identity of a resource that events refer to.
    ResourceId => "resource"
}
