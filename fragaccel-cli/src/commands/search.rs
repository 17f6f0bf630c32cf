use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args as ClapArgs;
use fragaccel_core::artifact;
use fragaccel_core::query;

use super::{load_store_expecting, parse_metric};

#[derive(ClapArgs)]
pub struct Args {
    /// Centers store, used only to sanity-check the bundle in `--clusters`.
    #[arg(long = "fragLib")]
    frag_lib: PathBuf,
    #[arg(long)]
    clusters: PathBuf,
    #[arg(long)]
    mindex: PathBuf,
    /// Full store to scan for the brute-force baseline.
    #[arg(long = "potentialTargets")]
    potential_targets: PathBuf,
    /// Store whose first entry is the query.
    #[arg(long = "searchQuery")]
    search_query: PathBuf,
    #[arg(long = "metric")]
    metric: String,
    #[arg(long = "maxRadius")]
    max_radius: f64,
    #[arg(long = "clusterRadius")]
    cluster_radius: f64,
    /// Print a JSON summary instead of plain text.
    #[arg(long)]
    json: bool,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let metric = parse_metric(&args.metric)?;

    let model = artifact::load_cluster_bundle(&args.clusters)?;
    let index = artifact::load_mindex(&args.mindex)?;

    let dimension = model
        .dimension()
        .or_else(|| index.dimension())
        .context("cluster bundle and m-index are both empty; cannot determine vector dimension")?;

    let centers_store = load_store_expecting(&args.frag_lib, dimension)?;
    if centers_store.len() != model.center_count() {
        tracing::warn!(
            "centers store at {} has {} entries but the bundle has {} centers",
            args.frag_lib.display(),
            centers_store.len(),
            model.center_count()
        );
    }

    let full_store = load_store_expecting(&args.potential_targets, dimension)?;
    let query_store = load_store_expecting(&args.search_query, dimension)?;
    let query_entry = query_store
        .first()
        .context("--searchQuery store is empty")?;

    let accel_start = Instant::now();
    let accel_results = fragaccel_core::parallel::install(|| {
        query::query(
            query_entry,
            args.max_radius,
            metric,
            &model,
            &index,
            args.cluster_radius,
        )
    })?;
    let accel_elapsed = accel_start.elapsed();

    let brute_start = Instant::now();
    let brute_results = fragaccel_core::parallel::install(|| {
        query::brute_force(query_entry, args.max_radius, metric, &full_store)
    })?;
    let brute_elapsed = brute_start.elapsed();

    let mut accel_ids: Vec<_> = accel_results.iter().map(|r| r.id.clone()).collect();
    let mut brute_ids: Vec<_> = brute_results.iter().map(|r| r.id.clone()).collect();
    accel_ids.sort();
    brute_ids.sort();
    let sets_agree = accel_ids == brute_ids;
    if !sets_agree {
        tracing::warn!("accelerated and brute-force result sets differ");
    }

    if args.json {
        let summary = serde_json::json!({
            "accelerated_count": accel_results.len(),
            "accelerated_micros": accel_elapsed.as_micros(),
            "brute_force_count": brute_results.len(),
            "brute_force_micros": brute_elapsed.as_micros(),
            "sets_agree": sets_agree,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "accelerated: {} results in {:?}",
            accel_results.len(),
            accel_elapsed
        );
        println!(
            "brute-force: {} results in {:?}",
            brute_results.len(),
            brute_elapsed
        );
    }

    Ok(())
}
