use fragaccel_core::artifact;
use fragaccel_core::cluster::{self, ClusterConfig, Policy};
use fragaccel_core::mindex::{self, MIndexConfig};
use fragaccel_core::query;
use fragaccel_core::store::{EntryStoreReader, EntryStoreWriter};
use fragaccel_core::{Entry, LibraryRef, Metric, Vector};

fn scenario_store() -> Vec<Entry> {
    vec![
        Entry::new("a", Vector::new(vec![1, 0, 0, 0])),
        Entry::new("b", Vector::new(vec![0, 1, 0, 0])),
        Entry::new("c", Vector::new(vec![0, 0, 1, 0])),
        Entry::new("d", Vector::new(vec![1, 1, 0, 0])),
    ]
}

#[test]
fn test_accelerated_matches_brute_force_across_policies() {
    let source = scenario_store();
    let query_entry = Entry::new("q", Vector::new(vec![1, 0, 0, 0]));

    let brute = query::brute_force(&query_entry, 1.0, Metric::Euclidean, &source).unwrap();
    let mut brute_ids: Vec<_> = brute.into_iter().map(|r| r.id).collect();
    brute_ids.sort();
    assert_eq!(brute_ids, vec!["a".to_string(), "d".to_string()]);

    for policy in [Policy::Random, Policy::GreedyMetric, Policy::HalfHalf] {
        let model = cluster::build(
            &source,
            &ClusterConfig {
                policy,
                k: 2,
                r_max: None,
                metric: Metric::Euclidean,
                seed: Some(42),
            },
        )
        .unwrap();
        let index = mindex::build(
            &source,
            &MIndexConfig {
                metric: Metric::Euclidean,
                seed: Some(42),
                anchor_count: Some(2),
            },
        )
        .unwrap();

        let accel = query::query(&query_entry, 1.0, Metric::Euclidean, &model, &index, 10.0).unwrap();
        let mut accel_ids: Vec<_> = accel.into_iter().map(|r| r.id).collect();
        accel_ids.sort();
        assert_eq!(accel_ids, brute_ids, "policy {policy:?} mismatched the oracle");
    }
}

#[test]
fn test_store_round_trip_then_build_and_query() {
    let dir = std::env::temp_dir().join("fragaccel_pipeline_test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("store_{}.frst", std::process::id()));

    let library = LibraryRef::new("test-lib", 4);
    let mut writer = EntryStoreWriter::create(library, &path).unwrap();
    for entry in scenario_store() {
        writer.add(&entry).unwrap();
    }
    writer.close().unwrap();

    let reader = EntryStoreReader::open(&path).unwrap();
    let source = reader.read_all();
    assert_eq!(source.len(), 4);

    let model = cluster::build(
        &source,
        &ClusterConfig {
            policy: Policy::MaxRadius,
            k: 0,
            r_max: Some(0.5),
            metric: Metric::Euclidean,
            seed: Some(7),
        },
    )
    .unwrap();

    let bundle_bytes = artifact::write_cluster_bundle(&model);
    let reloaded = artifact::read_cluster_bundle(&bundle_bytes).unwrap();
    assert_eq!(reloaded.center_count(), model.center_count());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_full_overlap_scenario_cosine_zero_radius() {
    let source = vec![
        Entry::new("a", Vector::new(vec![2, 4, 6])),
        Entry::new("b", Vector::new(vec![1, 2, 3])),
        Entry::new("c", Vector::new(vec![5, 10, 15])),
    ];
    let query_entry = Entry::new("q", Vector::new(vec![1, 2, 3]));

    let model = cluster::build(
        &source,
        &ClusterConfig {
            policy: Policy::Random,
            k: 2,
            r_max: None,
            metric: Metric::Cosine,
            seed: Some(3),
        },
    )
    .unwrap();
    let index = mindex::build(
        &source,
        &MIndexConfig {
            metric: Metric::Cosine,
            seed: Some(3),
            anchor_count: Some(2),
        },
    )
    .unwrap();

    let results = query::query(&query_entry, 0.0, Metric::Cosine, &model, &index, 10.0).unwrap();
    assert_eq!(results.len(), source.len());
}
