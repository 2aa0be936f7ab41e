//! Type-safe identifier newtypes
//!
//! Wrapping `Uuid` per entity keeps parent/child/generation identifiers from
//! being mixed up at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The wrapped uuid
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id! {
    /// Account-holding parent; quota is tracked against this identity
    ParentId
}

define_id! {
    /// Child profile a story is generated for
    ChildId
}

define_id! {
    /// Family grouping parents and children
    FamilyId
}

define_id! {
    /// A single generation attempt
    GenerationId
}

define_id! {
    /// A persisted story artifact
    ArtifactId
}

define_id! {
    /// An uploaded image referenced by analysis requests
    ImageId
}
