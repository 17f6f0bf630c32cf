//! Entries: an opaque id paired with a vector.

use serde::{Deserialize, Serialize};

use crate::vector::Vector;

/// Opaque, store-unique identifier for an entry.
pub type EntryId = String;

/// A single `(id, vector)` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub vector: Vector,
}

impl Entry {
    pub fn new(id: impl Into<EntryId>, vector: Vector) -> Self {
        Self {
            id: id.into(),
            vector,
        }
    }
}

/// Provenance metadata for the fragment library a store was built against.
///
/// Treated opaquely by this crate: `label` is whatever string a consumer
/// uses to identify the library (e.g. a name and version), and `dimension`
/// is the one property the core actually depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryRef {
    pub label: String,
    pub dimension: usize,
}

impl LibraryRef {
    pub fn new(label: impl Into<String>, dimension: usize) -> Self {
        Self {
            label: label.into(),
            dimension,
        }
    }

    /// A short description used in [`crate::error::Error::LibraryMismatch`].
    pub fn describe(&self) -> String {
        format!("{} (dim={})", self.label, self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector;

    #[test]
    fn test_entry_construction() {
        let e = Entry::new("a1", Vector::new(vec![1, 0]));
        assert_eq!(e.id, "a1");
        assert_eq!(e.vector.dimension(), 2);
    }

    #[test]
    fn test_library_describe() {
        let lib = LibraryRef::new("fraglib-v3", 400);
        assert_eq!(lib.describe(), "fraglib-v3 (dim=400)");
    }
}
