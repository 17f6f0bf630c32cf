use crate::entry::Entry;

/// The output of the clustering builder: centers, their members, and
/// per-cluster statistics.
#[derive(Debug, Clone)]
pub struct ClusterModel {
    /// Chosen centers, in selection order.
    pub centers: Vec<Entry>,
    /// `clusters[c]` holds every source entry assigned to `centers[c]`, in
    /// source order.
    pub clusters: Vec<Vec<Entry>>,
    /// `radii[c]` is the maximum distance from `centers[c]` to any of its
    /// members.
    pub radii: Vec<f64>,
    /// `counts[c] == clusters[c].len()`.
    pub counts: Vec<usize>,
}

impl ClusterModel {
    pub fn center_count(&self) -> usize {
        self.centers.len()
    }

    pub fn total_members(&self) -> usize {
        self.counts.iter().sum()
    }

    /// The vector dimension of this model's centers, or `None` if it has no
    /// centers to infer one from.
    pub fn dimension(&self) -> Option<usize> {
        self.centers.first().map(|e| e.vector.dimension())
    }
}
