use std::path::PathBuf;

use anyhow::Context;
use clap::Args as ClapArgs;
use fragaccel_core::cluster::{self, ClusterConfig, Policy};
use fragaccel_core::store::EntryStoreWriter;
use fragaccel_core::{artifact, codec, LibraryRef};

use super::{load_store, parse_metric};

#[derive(ClapArgs)]
pub struct Args {
    /// Source fragment library store.
    #[arg(long = "fragLib")]
    frag_lib: PathBuf,
    /// Center count, consulted unless `--maxRadius` is given.
    #[arg(long = "numCenters")]
    num_centers: Option<usize>,
    #[arg(long = "metric")]
    metric: String,
    #[arg(long = "kCenterAlg", default_value = "random")]
    k_center_alg: String,
    /// When set, clusters with the max-radius policy instead of by center count.
    #[arg(long = "maxRadius")]
    max_radius: Option<f64>,
    /// Output path prefix; writes `<out>.centers.frst`, `<out>.cluster.N.frst`,
    /// `<out>.clusters.bin`, and `<out>.radii.bin`.
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    seed: Option<u64>,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let source = load_store(&args.frag_lib)?;
    let metric = parse_metric(&args.metric)?;

    let (policy, k) = match args.max_radius {
        Some(_) => (Policy::MaxRadius, 0),
        None => {
            let k = args
                .num_centers
                .context("--numCenters is required unless --maxRadius is given")?;
            (Policy::parse(&args.k_center_alg)?, k)
        }
    };

    let config = ClusterConfig {
        policy,
        k,
        r_max: args.max_radius,
        metric,
        seed: args.seed,
    };

    let model = fragaccel_core::parallel::install(|| cluster::build(&source, &config))
        .with_context(|| format!("clustering {}", args.frag_lib.display()))?;

    tracing::info!(
        centers = model.center_count(),
        total = model.total_members(),
        "clustering complete"
    );

    let dimension = source
        .first()
        .map(|e| e.vector.dimension())
        .unwrap_or(0);
    let library = LibraryRef::new("fragaccel-clusters", dimension);

    let centers_path = with_suffix(&args.out, "centers.frst");
    let mut centers_writer = EntryStoreWriter::create(library.clone(), &centers_path)?;
    for center in &model.centers {
        centers_writer.add(center)?;
    }
    centers_writer.close()?;

    for (i, cluster) in model.clusters.iter().enumerate() {
        let cluster_path = with_suffix(&args.out, &format!("cluster.{i}.frst"));
        let mut writer = EntryStoreWriter::create(library.clone(), &cluster_path)?;
        for member in cluster {
            writer.add(member)?;
        }
        writer.close()?;
    }

    let bundle_path = with_suffix(&args.out, "clusters.bin");
    artifact::save_cluster_bundle(&model, &bundle_path)?;

    let radii_path = with_suffix(&args.out, "radii.bin");
    let mut radii_bytes = Vec::new();
    for &radius in &model.radii {
        codec::write_f64(&mut radii_bytes, radius)?;
    }
    std::fs::write(&radii_path, radii_bytes)
        .with_context(|| format!("writing {}", radii_path.display()))?;

    println!(
        "wrote {} centers, {} clusters to {}",
        model.center_count(),
        model.clusters.len(),
        args.out.display()
    );
    Ok(())
}

fn with_suffix(prefix: &std::path::Path, suffix: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_owned();
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}
