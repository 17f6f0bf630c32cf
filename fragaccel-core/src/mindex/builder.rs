use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::distance::Metric;
use crate::entry::Entry;
use crate::error::Result;

use super::model::MIndex;

/// Configuration for building an [`MIndex`].
#[derive(Debug, Clone)]
pub struct MIndexConfig {
    pub metric: Metric,
    pub seed: Option<u64>,
    /// Anchor count override. When absent, defaults to
    /// `min(16, floor(log2(n)) / 2)`, clamped to at least 1.
    pub anchor_count: Option<usize>,
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn default_anchor_count(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let log2n = (n as f64).log2().floor().max(0.0) as usize;
    (log2n / 2).clamp(1, 16)
}

/// Builds an [`MIndex`] over `source`. An empty source yields an empty
/// index rather than an error.
pub fn build(source: &[Entry], config: &MIndexConfig) -> Result<MIndex> {
    if source.is_empty() {
        return Ok(MIndex {
            anchors: Vec::new(),
            elements: Vec::new(),
            hashes: Vec::new(),
        });
    }

    let mut rng = make_rng(config.seed);
    let a = config
        .anchor_count
        .unwrap_or_else(|| default_anchor_count(source.len()))
        .clamp(1, source.len());

    let anchor_positions = rand::seq::index::sample(&mut rng, source.len(), a).into_vec();
    let anchors: Vec<Entry> = anchor_positions.iter().map(|&i| source[i].clone()).collect();

    let hashes: Vec<Vec<u32>> = source
        .par_iter()
        .map(|entry| permutation_hash(entry, &anchors, config.metric))
        .collect::<Result<Vec<_>>>()?;

    Ok(MIndex {
        anchors,
        elements: source.to_vec(),
        hashes,
    })
}

/// The anchor indices sorted by ascending distance to `entry`. Ties break
/// by ascending anchor index because `sort_by` is stable and the input is
/// seeded in anchor order.
pub fn permutation_hash(entry: &Entry, anchors: &[Entry], metric: Metric) -> Result<Vec<u32>> {
    let mut dists = Vec::with_capacity(anchors.len());
    for anchor in anchors {
        dists.push(metric.distance(&entry.vector, &anchor.vector)?);
    }
    let mut perm: Vec<u32> = (0..anchors.len() as u32).collect();
    perm.sort_by(|&i, &j| {
        dists[i as usize]
            .partial_cmp(&dists[j as usize])
            .expect("distances are always finite")
    });
    Ok(perm)
}
