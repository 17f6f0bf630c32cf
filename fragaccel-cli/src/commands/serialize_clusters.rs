use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args as ClapArgs;
use fragaccel_core::artifact;
use fragaccel_core::cluster::ClusterModel;
use fragaccel_core::codec::Reader;

use super::load_store;

#[derive(ClapArgs)]
pub struct Args {
    /// Path to the centers store previously written by `create-clusters`.
    #[arg(long)]
    centers: PathBuf,
    #[arg(long)]
    out: PathBuf,
}

/// Strips the `.centers.frst` suffix `create-clusters` uses, recovering the
/// output prefix its sibling cluster files share.
fn recover_prefix(centers_path: &Path) -> PathBuf {
    let s = centers_path.as_os_str().to_string_lossy();
    PathBuf::from(s.strip_suffix(".centers.frst").unwrap_or(&s))
}

fn read_radii(prefix: &Path, expected: usize) -> anyhow::Result<Vec<f64>> {
    let mut path = prefix.as_os_str().to_owned();
    path.push(".radii.bin");
    let path = PathBuf::from(path);

    if !path.exists() {
        tracing::warn!(
            "no radii sidecar at {}; bundling with zeroed radii",
            path.display()
        );
        return Ok(vec![0.0; expected]);
    }

    let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let mut r = Reader::new(&bytes);
    let mut radii = Vec::with_capacity(expected);
    while !r.at_end() {
        radii.push(
            r.read_f64()
                .map_err(|msg| anyhow::anyhow!("corrupt radii sidecar {}: {msg}", path.display()))?,
        );
    }
    Ok(radii)
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let centers = load_store(&args.centers)?;
    let prefix = recover_prefix(&args.centers);

    let mut clusters = Vec::with_capacity(centers.len());
    for i in 0..centers.len() {
        let mut cluster_path = prefix.as_os_str().to_owned();
        cluster_path.push(format!(".cluster.{i}.frst"));
        let cluster_path = PathBuf::from(cluster_path);
        let members = load_store(&cluster_path)
            .with_context(|| format!("reading cluster member store {}", cluster_path.display()))?;
        clusters.push(members);
    }

    let radii = read_radii(&prefix, centers.len())?;
    let counts = clusters.iter().map(Vec::len).collect();

    let model = ClusterModel {
        centers,
        clusters,
        radii,
        counts,
    };

    artifact::save_cluster_bundle(&model, &args.out)?;
    println!(
        "bundled {} clusters into {}",
        model.center_count(),
        args.out.display()
    );
    Ok(())
}
