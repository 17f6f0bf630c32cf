//! `fragaccel` CLI - builds and queries an accelerated range-query index
//! over sparse bag-of-fragments vector stores.
//!
//! Usage:
//!   `fragaccel create-clusters --fragLib store.frst --numCenters 64 --metric euclidean --kCenterAlg metricApprox --out run1`
//!   `fragaccel create-mindex --fragLib store.frst --metric euclidean --out run1.mindex.bin`
//!   `fragaccel search --fragLib run1.centers.frst --clusters run1.clusters.bin --mindex run1.mindex.bin --potentialTargets store.frst --searchQuery query.frst --metric euclidean --maxRadius 5.0 --clusterRadius 2.0`

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fragaccel")]
#[command(author, version, about = "Accelerated range queries over bag-of-fragments vectors")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Builds a center set and per-cluster member stores from a fragment library.
    CreateClusters(commands::create_clusters::Args),
    /// Builds a metric index (anchors + permutation hashes) from a fragment library.
    CreateMindex(commands::create_mindex::Args),
    /// Bundles previously-built per-center cluster stores into one artifact.
    SerializeClusters(commands::serialize_clusters::Args),
    /// Runs a single accelerated range query and its brute-force baseline.
    Search(commands::search::Args),
    /// Sweeps `--maxRadius` and reports accelerated vs. brute-force timings.
    Benchmark(commands::benchmark::Args),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateClusters(args) => commands::create_clusters::run(args),
        Commands::CreateMindex(args) => commands::create_mindex::run(args),
        Commands::SerializeClusters(args) => commands::serialize_clusters::run(args),
        Commands::Search(args) => commands::search::run(args),
        Commands::Benchmark(args) => commands::benchmark::run(args),
    }
}
