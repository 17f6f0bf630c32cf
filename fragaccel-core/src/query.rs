//! The online range-query pipeline: coarse center selection via the
//! M-index, cluster expansion, and exact fine filtering. Also exposes a
//! brute-force baseline used as the correctness oracle.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::cluster::ClusterModel;
use crate::distance::{cosine_distance, euclidean_distance, Metric};
use crate::entry::{Entry, EntryId};
use crate::error::Result;
use crate::mindex::{kendall_tau, permutation_hash, MIndex};

/// The coarse/fine stopping heuristic: a level contributes fewer than
/// `1/25` of the coarse results accumulated so far.
const STOP_DIVISOR: f64 = 25.0;

/// One query result, carrying both distance metrics regardless of which
/// was active for filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub id: EntryId,
    pub active_distance: f64,
    pub cosine_distance: f64,
    pub euclidean_distance: f64,
}

fn make_result(entry: &Entry, active_distance: f64, query_vector: &crate::vector::Vector) -> QueryResult {
    QueryResult {
        id: entry.id.clone(),
        active_distance,
        cosine_distance: cosine_distance(query_vector, &entry.vector),
        euclidean_distance: euclidean_distance(query_vector, &entry.vector),
    }
}

fn sort_results(results: &mut [QueryResult]) {
    results.sort_by(|a, b| {
        a.active_distance
            .partial_cmp(&b.active_distance)
            .unwrap()
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Stage 1's internal automaton: rank centers by Kendall-Tau to the query's
/// anchor permutation, then expand level by level until the stop rule
/// fires.
enum Stage1State {
    Ranking,
    Expanding(usize),
    Done,
}

struct Level {
    kendall_tau: u64,
    center_indices: Vec<usize>,
}

fn group_levels(mut ranked: Vec<(usize, u64)>) -> Vec<Level> {
    ranked.sort_by_key(|&(_, kt)| kt);
    let mut levels: Vec<Level> = Vec::new();
    for (center_idx, kt) in ranked {
        match levels.last_mut() {
            Some(level) if level.kendall_tau == kt => level.center_indices.push(center_idx),
            _ => levels.push(Level {
                kendall_tau: kt,
                center_indices: vec![center_idx],
            }),
        }
    }
    levels
}

/// Stage 1: returns the indices into `model.centers` retained as viable
/// cluster centers for this query.
fn coarse_select(
    query: &Entry,
    r: f64,
    metric: Metric,
    model: &ClusterModel,
    index: &MIndex,
    cluster_radius: f64,
) -> Result<Vec<usize>> {
    if index.elements.is_empty() || model.centers.is_empty() {
        return Ok(Vec::new());
    }

    let h_q = permutation_hash(query, &index.anchors, metric)?;

    let element_by_id: HashMap<&str, usize> = index
        .elements
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id.as_str(), i))
        .collect();

    let mut ranked: Vec<(usize, u64)> = Vec::with_capacity(model.centers.len());
    for (center_idx, center) in model.centers.iter().enumerate() {
        if let Some(&elem_idx) = element_by_id.get(center.id.as_str()) {
            let kt = kendall_tau(&h_q, index.hash_for(elem_idx));
            ranked.push((center_idx, kt));
        }
    }

    let levels = group_levels(ranked);

    let mut state = Stage1State::Ranking;
    let mut coarse_results: Vec<usize> = Vec::new();
    let mut level_cursor = 0usize;

    loop {
        state = match state {
            Stage1State::Ranking => Stage1State::Expanding(0),
            Stage1State::Expanding(level_idx) => {
                if level_idx >= levels.len() {
                    Stage1State::Done
                } else {
                    let level = &levels[level_idx];
                    let mut retained_this_level = Vec::new();
                    for &center_idx in &level.center_indices {
                        let center = &model.centers[center_idx];
                        let d = metric.distance(&query.vector, &center.vector)?;
                        if d <= cluster_radius + r {
                            retained_this_level.push(center_idx);
                        }
                    }
                    let retained_count = retained_this_level.len();
                    coarse_results.extend(retained_this_level);
                    level_cursor = level_idx + 1;

                    let should_stop = !coarse_results.is_empty()
                        && (retained_count as f64) < (coarse_results.len() as f64) / STOP_DIVISOR;

                    if should_stop {
                        Stage1State::Done
                    } else {
                        Stage1State::Expanding(level_cursor)
                    }
                }
            }
            Stage1State::Done => break,
        };
    }

    Ok(coarse_results)
}

/// Counts gathered alongside a [`query`] run, useful for the `benchmark`
/// command's reporting but irrelevant to correctness.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryStats {
    /// Centers retained by Stage 1.
    pub coarse_centers: usize,
    /// Cluster members considered by Stage 3, after id de-dup.
    pub fine_candidates: usize,
}

/// Runs the full accelerated pipeline: coarse M-index ranking, cluster
/// expansion, exact fine filtering, id-based de-dup, and ordering.
pub fn query(
    query_entry: &Entry,
    r: f64,
    metric: Metric,
    model: &ClusterModel,
    index: &MIndex,
    cluster_radius: f64,
) -> Result<Vec<QueryResult>> {
    Ok(query_with_stats(query_entry, r, metric, model, index, cluster_radius)?.0)
}

/// Like [`query`] but also returns [`QueryStats`] for reporting.
pub fn query_with_stats(
    query_entry: &Entry,
    r: f64,
    metric: Metric,
    model: &ClusterModel,
    index: &MIndex,
    cluster_radius: f64,
) -> Result<(Vec<QueryResult>, QueryStats)> {
    let coarse_results = coarse_select(query_entry, r, metric, model, index, cluster_radius)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut results = Vec::new();
    let mut fine_candidates = 0usize;

    for &center_idx in &coarse_results {
        for member in &model.clusters[center_idx] {
            if !seen.insert(member.id.as_str()) {
                continue;
            }
            fine_candidates += 1;
            let d = metric.distance(&query_entry.vector, &member.vector)?;
            if d <= r {
                results.push(make_result(member, d, &query_entry.vector));
            }
        }
    }

    sort_results(&mut results);
    let stats = QueryStats {
        coarse_centers: coarse_results.len(),
        fine_candidates,
    };
    Ok((results, stats))
}

/// Scans every entry of `full_store` and filters by `r`. The correctness
/// oracle: the accelerated path MUST return the same set of ids.
pub fn brute_force(
    query_entry: &Entry,
    r: f64,
    metric: Metric,
    full_store: &[Entry],
) -> Result<Vec<QueryResult>> {
    let mut results: Vec<QueryResult> = full_store
        .par_iter()
        .map(|entry| -> Result<Option<QueryResult>> {
            let d = metric.distance(&query_entry.vector, &entry.vector)?;
            Ok(if d <= r {
                Some(make_result(entry, d, &query_entry.vector))
            } else {
                None
            })
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    sort_results(&mut results);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{self, ClusterConfig, Policy};
    use crate::mindex::{self, MIndexConfig};
    use crate::vector::Vector;

    fn scenario_store() -> Vec<Entry> {
        vec![
            Entry::new("a", Vector::new(vec![1, 0, 0, 0])),
            Entry::new("b", Vector::new(vec![0, 1, 0, 0])),
            Entry::new("c", Vector::new(vec![0, 0, 1, 0])),
            Entry::new("d", Vector::new(vec![1, 1, 0, 0])),
        ]
    }

    #[test]
    fn test_concrete_scenario_euclidean_radius_one() {
        let source = scenario_store();
        let query = Entry::new("q", Vector::new(vec![1, 0, 0, 0]));

        let brute = brute_force(&query, 1.0, Metric::Euclidean, &source).unwrap();
        let mut ids: Vec<_> = brute.iter().map(|r| r.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a".to_string(), "d".to_string()]);

        let cluster_config = ClusterConfig {
            policy: Policy::Random,
            k: 2,
            r_max: None,
            metric: Metric::Euclidean,
            seed: Some(11),
        };
        let model = cluster::build(&source, &cluster_config).unwrap();

        let mindex_config = MIndexConfig {
            metric: Metric::Euclidean,
            seed: Some(11),
            anchor_count: Some(2),
        };
        let index = mindex::build(&source, &mindex_config).unwrap();

        let accel = query(&query, 1.0, Metric::Euclidean, &model, &index, 10.0).unwrap();
        let mut accel_ids: Vec<_> = accel.iter().map(|r| r.id.clone()).collect();
        accel_ids.sort();
        assert_eq!(accel_ids, ids);
    }

    #[test]
    fn test_all_identical_cosine_zero_returns_full_set() {
        let source = vec![
            Entry::new("a", Vector::new(vec![1, 2, 3])),
            Entry::new("b", Vector::new(vec![2, 4, 6])),
            Entry::new("c", Vector::new(vec![3, 6, 9])),
        ];
        let query = Entry::new("q", Vector::new(vec![1, 2, 3]));

        let model = cluster::build(
            &source,
            &ClusterConfig {
                policy: Policy::Random,
                k: 1,
                r_max: None,
                metric: Metric::Cosine,
                seed: Some(4),
            },
        )
        .unwrap();
        let index = mindex::build(
            &source,
            &MIndexConfig {
                metric: Metric::Cosine,
                seed: Some(4),
                anchor_count: Some(1),
            },
        )
        .unwrap();

        let results = query(&query, 0.0, Metric::Cosine, &model, &index, 10.0).unwrap();
        assert_eq!(results.len(), source.len());
    }

    #[test]
    fn test_empty_index_returns_empty_result_not_error() {
        let model = ClusterModel {
            centers: Vec::new(),
            clusters: Vec::new(),
            radii: Vec::new(),
            counts: Vec::new(),
        };
        let index = MIndex {
            anchors: Vec::new(),
            elements: Vec::new(),
            hashes: Vec::new(),
        };
        let query_entry = Entry::new("q", Vector::new(vec![1, 0]));
        let results = query(&query_entry, 5.0, Metric::Euclidean, &model, &index, 10.0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_side_outputs_report_both_metrics() {
        let source = scenario_store();
        let query_entry = Entry::new("q", Vector::new(vec![1, 0, 0, 0]));
        let results = brute_force(&query_entry, 10.0, Metric::Euclidean, &source).unwrap();
        for r in &results {
            assert!(r.cosine_distance >= 0.0 && r.cosine_distance <= 2.0);
            assert!(r.euclidean_distance >= 0.0);
        }
    }

    #[test]
    fn test_dimension_mismatch_is_fatal() {
        let source = scenario_store();
        let query_entry = Entry::new("q", Vector::new(vec![1, 0]));
        let err = brute_force(&query_entry, 1.0, Metric::Euclidean, &source).unwrap_err();
        assert!(matches!(err, crate::error::Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_results_ordered_ascending_with_id_tiebreak() {
        let source = vec![
            Entry::new("z", Vector::new(vec![0, 0])),
            Entry::new("a", Vector::new(vec![0, 0])),
        ];
        let query_entry = Entry::new("q", Vector::new(vec![0, 0]));
        let results = brute_force(&query_entry, 5.0, Metric::Euclidean, &source).unwrap();
        assert_eq!(results[0].id, "a");
        assert_eq!(results[1].id, "z");
    }
}
