//! Opaque identifier tokens
//!
//! Ids are plain strings so documents written by other tools (which used
//! timestamps) still load. New ids are UUID v4.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh unique id
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identity of one annotation; creation order, not the id, defines paint order
    AnnotationId
);
opaque_id!(StepId);
opaque_id!(GuideId);
opaque_id!(ProjectId);
opaque_id!(
    /// Logged-in user, used to scope persisted guides
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(StepId::new(), StepId::new());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = AnnotationId::from("1712345678");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1712345678\"");
    }
}
