use crate::entry::Entry;

/// A built metric index: a small anchor set, a snapshot of the indexed
/// elements, and each element's anchor-distance permutation.
#[derive(Debug, Clone)]
pub struct MIndex {
    pub anchors: Vec<Entry>,
    pub elements: Vec<Entry>,
    /// `hashes[i]` is a permutation of `0..anchors.len()`: anchor indices
    /// sorted by ascending distance to `elements[i]`.
    pub hashes: Vec<Vec<u32>>,
}

impl MIndex {
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn hash_for(&self, element_index: usize) -> &[u32] {
        &self.hashes[element_index]
    }

    /// The vector dimension of this index's anchors/elements, or `None` if
    /// it's empty.
    pub fn dimension(&self) -> Option<usize> {
        self.anchors
            .first()
            .or_else(|| self.elements.first())
            .map(|e| e.vector.dimension())
    }
}
