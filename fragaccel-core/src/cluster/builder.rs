use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::distance::Metric;
use crate::entry::Entry;
use crate::error::{Error, Result};

use super::model::ClusterModel;

/// Center-selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Uniform random k-subset without replacement.
    Random,
    /// Greedy metric k-center (farthest-point traversal).
    GreedyMetric,
    /// First half by `Random`, remaining half extending greedily from it.
    HalfHalf,
    /// Add a center whenever an entry exceeds `r_max` from the current set.
    MaxRadius,
}

impl Policy {
    /// Parses the `--kCenterAlg` flag value.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(Policy::Random),
            "metricApprox" => Ok(Policy::GreedyMetric),
            "halfhalf" => Ok(Policy::HalfHalf),
            other => Err(Error::UnknownPolicy(other.to_string())),
        }
    }
}

/// Configuration for one clustering run.
///
/// `k` is consulted by every policy except [`Policy::MaxRadius`], which
/// instead consults `r_max`; the CLI is responsible for deciding which
/// policy to use when both `--numCenters` and `--maxRadius` are given
/// (`--maxRadius` wins, per the command surface).
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub policy: Policy,
    pub k: usize,
    pub r_max: Option<f64>,
    pub metric: Metric,
    pub seed: Option<u64>,
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn check_k(k: usize, n: usize) -> Result<()> {
    if k == 0 || k > n {
        Err(Error::KTooLarge { k, n })
    } else {
        Ok(())
    }
}

/// Builds a [`ClusterModel`] from `source` under `config`.
pub fn build(source: &[Entry], config: &ClusterConfig) -> Result<ClusterModel> {
    if source.is_empty() {
        return Err(Error::EmptySource);
    }

    let mut rng = make_rng(config.seed);

    let center_indices = match config.policy {
        Policy::MaxRadius => {
            let r_max = config.r_max.unwrap_or(0.0);
            if r_max <= 0.0 {
                return Err(Error::BadRadius(r_max));
            }
            max_radius(&mut rng, source, r_max, config.metric)?
        }
        Policy::Random => {
            check_k(config.k, source.len())?;
            random_indices(&mut rng, source.len(), config.k)
        }
        Policy::GreedyMetric => {
            check_k(config.k, source.len())?;
            greedy_metric(&mut rng, source, config.k, config.metric)?
        }
        Policy::HalfHalf => {
            check_k(config.k, source.len())?;
            half_half(&mut rng, source, config.k, config.metric)?
        }
    };

    assemble(source, &center_indices, config.metric)
}

fn random_indices(rng: &mut StdRng, n: usize, k: usize) -> Vec<usize> {
    rand::seq::index::sample(rng, n, k).into_vec()
}

fn greedy_metric(rng: &mut StdRng, source: &[Entry], k: usize, metric: Metric) -> Result<Vec<usize>> {
    let candidates: Vec<usize> = (0..source.len())
        .filter(|&i| !source[i].vector.is_zero())
        .collect();
    if k > candidates.len() {
        return Err(Error::KTooLarge {
            k,
            n: candidates.len(),
        });
    }
    let first = candidates[rng.gen_range(0..candidates.len())];
    greedy_extend(source, &[first], k, metric)
}

fn half_half(rng: &mut StdRng, source: &[Entry], k: usize, metric: Metric) -> Result<Vec<usize>> {
    let k_half = k / 2;
    let half = random_indices(rng, source.len(), k_half);
    greedy_extend(source, &half, k, metric)
}

/// Extends `prefix` by repeated farthest-point selection until it has
/// `k_total` members.
fn greedy_extend(
    source: &[Entry],
    prefix: &[usize],
    k_total: usize,
    metric: Metric,
) -> Result<Vec<usize>> {
    let mut chosen = prefix.to_vec();
    while chosen.len() < k_total {
        let next = farthest_from(source, &chosen, metric)?;
        chosen.push(next);
    }
    Ok(chosen)
}

/// Index of the entry maximizing distance to `chosen` (distance to a set is
/// distance to its nearest member). Zero vectors and already-chosen indices
/// are excluded. Ties broken by lowest index.
fn farthest_from(source: &[Entry], chosen: &[usize], metric: Metric) -> Result<usize> {
    let mut best_idx: Option<usize> = None;
    let mut best_dist = -1.0f64;

    for i in 0..source.len() {
        if source[i].vector.is_zero() || chosen.contains(&i) {
            continue;
        }
        let d = dist_to_set(&source[i], chosen, source, metric)?;
        if d > best_dist {
            best_dist = d;
            best_idx = Some(i);
        }
    }

    best_idx.ok_or(Error::KTooLarge {
        k: chosen.len() + 1,
        n: chosen.len(),
    })
}

fn dist_to_set(entry: &Entry, set_indices: &[usize], source: &[Entry], metric: Metric) -> Result<f64> {
    let mut best = f64::INFINITY;
    for &i in set_indices {
        let d = metric.distance(&entry.vector, &source[i].vector)?;
        if d < best {
            best = d;
        }
    }
    Ok(best)
}

/// Iterate entries in a random permutation, adding an entry as a new center
/// iff its distance to the current center set exceeds `r_max`.
fn max_radius(rng: &mut StdRng, source: &[Entry], r_max: f64, metric: Metric) -> Result<Vec<usize>> {
    let mut order: Vec<usize> = (0..source.len()).collect();
    use rand::seq::SliceRandom;
    order.shuffle(rng);

    let mut chosen: Vec<usize> = Vec::new();
    for i in order {
        let d = if chosen.is_empty() {
            f64::INFINITY
        } else {
            dist_to_set(&source[i], &chosen, source, metric)?
        };
        if d > r_max {
            chosen.push(i);
        }
    }
    Ok(chosen)
}

/// Assigns every source entry to its nearest center and computes
/// per-cluster statistics. Assignment is data-parallel: each entry's
/// nearest center is independent of every other entry's.
fn assemble(source: &[Entry], center_indices: &[usize], metric: Metric) -> Result<ClusterModel> {
    let centers: Vec<Entry> = center_indices.iter().map(|&i| source[i].clone()).collect();

    let assignments: Vec<(usize, f64)> = source
        .par_iter()
        .map(|entry| nearest_center(entry, &centers, metric))
        .collect::<Result<Vec<_>>>()?;

    let mut clusters: Vec<Vec<Entry>> = vec![Vec::new(); centers.len()];
    let mut radii = vec![0.0f64; centers.len()];

    for (entry, (code, dist)) in source.iter().zip(assignments) {
        clusters[code].push(entry.clone());
        if dist > radii[code] {
            radii[code] = dist;
        }
    }

    let counts = clusters.iter().map(Vec::len).collect();

    tracing::debug!(
        centers = centers.len(),
        total = source.len(),
        "assigned entries to nearest centers"
    );

    Ok(ClusterModel {
        centers,
        clusters,
        radii,
        counts,
    })
}

fn nearest_center(entry: &Entry, centers: &[Entry], metric: Metric) -> Result<(usize, f64)> {
    let mut best_idx = 0usize;
    let mut best_dist = f64::INFINITY;
    for (i, center) in centers.iter().enumerate() {
        let d = metric.distance(&entry.vector, &center.vector)?;
        if d < best_dist {
            best_dist = d;
            best_idx = i;
        }
    }
    Ok((best_idx, best_dist))
}
