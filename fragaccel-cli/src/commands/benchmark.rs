use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args as ClapArgs;
use fragaccel_core::artifact;
use fragaccel_core::query::{self, QueryStats};
use fragaccel_core::Metric;

use super::{load_store, parse_metric};

#[derive(ClapArgs)]
pub struct Args {
    #[arg(long)]
    clusters: PathBuf,
    #[arg(long)]
    mindex: PathBuf,
    #[arg(long = "potentialTargets")]
    potential_targets: PathBuf,
    #[arg(long = "searchQuery")]
    search_query: PathBuf,
    #[arg(long = "metric")]
    metric: String,
    #[arg(long = "clusterRadius")]
    cluster_radius: f64,
    /// Number of radii to sample across the sweep range.
    #[arg(long, default_value_t = 50)]
    steps: usize,
}

/// The sweep covers `[0, 50)`, scaled by `1/100` for cosine (whose range is
/// `[0, 2]`) so the same step count probes a comparable fraction of each
/// metric's range.
fn radius_for_step(step: usize, metric: Metric) -> f64 {
    let raw = step as f64;
    match metric {
        Metric::Cosine => raw / 100.0,
        Metric::Euclidean => raw,
    }
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let metric = parse_metric(&args.metric)?;

    let model = artifact::load_cluster_bundle(&args.clusters)?;
    let index = artifact::load_mindex(&args.mindex)?;
    let full_store = load_store(&args.potential_targets)?;
    let query_store = load_store(&args.search_query)?;
    let query_entry = query_store
        .first()
        .context("--searchQuery store is empty")?;

    println!("Radius\tAccelCount\tLongCount\tAccel\tNaive\tSpeedup\tSensitivity\tFineCandidates");

    for step in 0..args.steps {
        let r = radius_for_step(step, metric);

        let accel_start = Instant::now();
        let (accel_results, stats): (_, QueryStats) =
            fragaccel_core::parallel::install(|| {
                query::query_with_stats(query_entry, r, metric, &model, &index, args.cluster_radius)
            })?;
        let accel_elapsed = accel_start.elapsed();

        let naive_start = Instant::now();
        let naive_results = fragaccel_core::parallel::install(|| {
            query::brute_force(query_entry, r, metric, &full_store)
        })?;
        let naive_elapsed = naive_start.elapsed();

        let sensitivity = if naive_results.is_empty() {
            1.0
        } else {
            accel_results.len() as f64 / naive_results.len() as f64
        };
        let speedup = if accel_elapsed.as_secs_f64() == 0.0 {
            f64::INFINITY
        } else {
            naive_elapsed.as_secs_f64() / accel_elapsed.as_secs_f64()
        };

        println!(
            "{:.4}\t{}\t{}\t{:?}\t{:?}\t{:.2}\t{:.4}\t{}",
            r,
            accel_results.len(),
            naive_results.len(),
            accel_elapsed,
            naive_elapsed,
            speedup,
            sensitivity,
            stats.fine_candidates,
        );
    }

    Ok(())
}
