pub mod benchmark;
pub mod create_clusters;
pub mod create_mindex;
pub mod search;
pub mod serialize_clusters;

use std::path::Path;

use anyhow::Context;
use fragaccel_core::store::EntryStoreReader;
use fragaccel_core::{Entry, Metric};

pub fn load_store(path: &Path) -> anyhow::Result<Vec<Entry>> {
    let reader = EntryStoreReader::open(path)
        .with_context(|| format!("opening entry store at {}", path.display()))?;
    Ok(reader.read_all())
}

/// Loads a store, failing with a `LibraryMismatch` diagnostic if its
/// dimension disagrees with `dimension`.
pub fn load_store_expecting(path: &Path, dimension: usize) -> anyhow::Result<Vec<Entry>> {
    let reader = EntryStoreReader::open_expecting(path, dimension)
        .with_context(|| format!("opening entry store at {}", path.display()))?;
    Ok(reader.read_all())
}

pub fn parse_metric(s: &str) -> anyhow::Result<Metric> {
    Metric::parse(s).with_context(|| format!("parsing --metric {s}"))
}
