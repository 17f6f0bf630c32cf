//! Metric index: a small anchor set plus per-element permutation hashes,
//! used to coarsely rank cluster centers before exact distance filtering.

mod builder;
mod kendall_tau;
mod model;

pub use builder::{build, permutation_hash, MIndexConfig};
pub use kendall_tau::kendall_tau;
pub use model::MIndex;
