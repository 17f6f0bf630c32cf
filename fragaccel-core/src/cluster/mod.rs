//! Offline clustering builder: partitions a source store into balls around
//! chosen centers.

mod builder;
mod model;

pub use builder::{build, ClusterConfig, Policy};
pub use model::ClusterModel;
