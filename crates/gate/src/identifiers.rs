//! Newtype domain identifiers.
//!
//! Every concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for
//! example, a [`Topic`] with a [`Keyword`] even though both are strings
//! under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or whitespace only. Surrounding whitespace is trimmed.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single workflow instance (one article from brief to
/// publication or review hand-off).
///
/// Generated fresh for every run; recorded on the run's tracing span so all
/// collaborator calls and attempts of one article can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowRunId(Uuid);

impl WorkflowRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for WorkflowRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// The subject an article is written about (e.g. `"Ρήξη μηνίσκου"`).
    Topic
}

string_id! {
    /// A search keyword attached to a brief: main, secondary, or negative.
    Keyword
}

string_id! {
    /// Identifies a document created by the publishing collaborator.
    DocumentId
}

string_id! {
    /// Names an external collaborator in logs and errors
    /// (e.g. `"vector-search"`, `"generation"`, `"publisher"`).
    CollaboratorName
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_id_rejects_blank() {
        assert!(Topic::new("").is_none());
        assert!(Keyword::new("   ").is_none());
    }

    #[test]
    fn test_string_id_trims() {
        let kw = Keyword::new("  ρήξη μηνίσκου ").unwrap();
        assert_eq!(kw.as_str(), "ρήξη μηνίσκου");
        assert_eq!(kw.to_string(), "ρήξη μηνίσκου");
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(WorkflowRunId::new_random(), WorkflowRunId::new_random());
    }
}
