use std::path::PathBuf;

use anyhow::Context;
use clap::Args as ClapArgs;
use fragaccel_core::artifact;
use fragaccel_core::mindex::{self, MIndexConfig};

use super::{load_store, parse_metric};

#[derive(ClapArgs)]
pub struct Args {
    #[arg(long = "fragLib")]
    frag_lib: PathBuf,
    #[arg(long = "metric")]
    metric: String,
    #[arg(long)]
    out: PathBuf,
    /// Anchor count override; defaults to `min(16, floor(log2(n)) / 2)`.
    #[arg(long = "numAnchors")]
    num_anchors: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let source = load_store(&args.frag_lib)?;
    let metric = parse_metric(&args.metric)?;

    let config = MIndexConfig {
        metric,
        seed: args.seed,
        anchor_count: args.num_anchors,
    };

    let index = fragaccel_core::parallel::install(|| mindex::build(&source, &config))
        .with_context(|| format!("building m-index from {}", args.frag_lib.display()))?;

    tracing::info!(
        anchors = index.anchor_count(),
        elements = index.element_count(),
        "m-index built"
    );

    artifact::save_mindex(&index, &args.out)?;
    println!(
        "wrote m-index ({} anchors, {} elements) to {}",
        index.anchor_count(),
        index.element_count(),
        args.out.display()
    );
    Ok(())
}
