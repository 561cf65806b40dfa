//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::CoreError;

/// Declares a ULID-backed record identifier.
///
/// Every relational record (project, image, category, annotation) gets its own
/// identifier type so ids of different tables cannot be mixed up.
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Generate a new identifier
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Create the identifier from a ULID
            pub fn from_ulid(ulid: Ulid) -> Self {
                Self(ulid)
            }

            /// Get the underlying ULID
            pub fn as_ulid(&self) -> &Ulid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ulid::from_string(s)
                    .map(Self)
                    .map_err(|e| CoreError::InvalidId(format!("{} '{}': {}", $label, s, e)))
            }
        }
    };
}

record_id!(
    /// Project identifier
    ProjectId,
    "project"
);

record_id!(
    /// Image identifier
    ImageId,
    "image"
);

record_id!(
    /// Category identifier
    CategoryId,
    "category"
);

record_id!(
    /// Annotation identifier
    AnnotationId,
    "annotation"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        let id1 = ImageId::new();
        let id2 = ImageId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_string_conversion() {
        let id = ProjectId::new();
        let parsed: ProjectId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_invalid_id() {
        let err = "not-a-ulid".parse::<CategoryId>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidId(_)));
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = AnnotationId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
