//! Serialized artifact I/O: the cluster bundle and the M-index are each
//! persisted as one self-describing blob (magic, version, body, crc32).

use std::fs;
use std::path::Path;

use crate::cluster::ClusterModel;
use crate::codec::{self, Reader};
use crate::error::{Error, Result};
use crate::mindex::MIndex;

const CLUSTER_MAGIC: &[u8; 4] = b"FACL";
const CLUSTER_VERSION: u8 = 1;

const MINDEX_MAGIC: &[u8; 4] = b"FAMI";
const MINDEX_VERSION: u8 = 1;

fn corrupt(context: &str, msg: String) -> Error {
    Error::ArtifactCorrupt(format!("{context}: {msg}"))
}

fn encode_cluster_body(model: &ClusterModel) -> Vec<u8> {
    let dimension = model
        .centers
        .first()
        .map(|e| e.vector.dimension())
        .unwrap_or(0);

    let mut body = Vec::new();
    codec::write_u32(&mut body, dimension as u32).unwrap();
    codec::write_u32(&mut body, model.centers.len() as u32).unwrap();
    for center in &model.centers {
        codec::write_entry(&mut body, center).unwrap();
    }
    for cluster in &model.clusters {
        codec::write_u32(&mut body, cluster.len() as u32).unwrap();
        for member in cluster {
            codec::write_entry(&mut body, member).unwrap();
        }
    }
    for &radius in &model.radii {
        codec::write_f64(&mut body, radius).unwrap();
    }
    body
}

fn decode_cluster_body(body: &[u8]) -> std::result::Result<ClusterModel, String> {
    let mut r = Reader::new(body);
    let dimension = r.read_u32()? as usize;
    let center_count = r.read_u32()? as usize;

    let mut centers = Vec::with_capacity(center_count);
    for _ in 0..center_count {
        centers.push(r.read_entry(dimension)?);
    }

    let mut clusters = Vec::with_capacity(center_count);
    for _ in 0..center_count {
        let member_count = r.read_u32()? as usize;
        let mut members = Vec::with_capacity(member_count);
        for _ in 0..member_count {
            members.push(r.read_entry(dimension)?);
        }
        clusters.push(members);
    }

    let mut radii = Vec::with_capacity(center_count);
    for _ in 0..center_count {
        radii.push(r.read_f64()?);
    }

    let counts = clusters.iter().map(Vec::len).collect();

    Ok(ClusterModel {
        centers,
        clusters,
        radii,
        counts,
    })
}

/// Serializes a cluster bundle into its envelope.
pub fn write_cluster_bundle(model: &ClusterModel) -> Vec<u8> {
    codec::write_blob(CLUSTER_MAGIC, CLUSTER_VERSION, &encode_cluster_body(model))
}

/// Validates the envelope and decodes a cluster bundle.
pub fn read_cluster_bundle(bytes: &[u8]) -> Result<ClusterModel> {
    let body = codec::read_blob(CLUSTER_MAGIC, CLUSTER_VERSION, bytes)
        .map_err(|msg| corrupt("cluster bundle", msg))?;
    decode_cluster_body(body).map_err(|msg| corrupt("cluster bundle", msg))
}

/// Writes a cluster bundle to `path`.
pub fn save_cluster_bundle(model: &ClusterModel, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, write_cluster_bundle(model)).map_err(|e| Error::io(path, e))
}

/// Reads and decodes a cluster bundle from `path`.
pub fn load_cluster_bundle(path: impl AsRef<Path>) -> Result<ClusterModel> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    read_cluster_bundle(&bytes)
}

fn encode_mindex_body(index: &MIndex) -> Vec<u8> {
    let dimension = index
        .anchors
        .first()
        .or_else(|| index.elements.first())
        .map(|e| e.vector.dimension())
        .unwrap_or(0);

    let mut body = Vec::new();
    codec::write_u32(&mut body, dimension as u32).unwrap();
    codec::write_u32(&mut body, index.anchors.len() as u32).unwrap();
    codec::write_u32(&mut body, index.elements.len() as u32).unwrap();
    for anchor in &index.anchors {
        codec::write_entry(&mut body, anchor).unwrap();
    }
    for element in &index.elements {
        codec::write_entry(&mut body, element).unwrap();
    }
    for hash in &index.hashes {
        for &rank in hash {
            codec::write_u32(&mut body, rank).unwrap();
        }
    }
    body
}

fn decode_mindex_body(body: &[u8]) -> std::result::Result<MIndex, String> {
    let mut r = Reader::new(body);
    let dimension = r.read_u32()? as usize;
    let anchor_count = r.read_u32()? as usize;
    let element_count = r.read_u32()? as usize;

    let mut anchors = Vec::with_capacity(anchor_count);
    for _ in 0..anchor_count {
        anchors.push(r.read_entry(dimension)?);
    }

    let mut elements = Vec::with_capacity(element_count);
    for _ in 0..element_count {
        elements.push(r.read_entry(dimension)?);
    }

    let mut hashes = Vec::with_capacity(element_count);
    for _ in 0..element_count {
        let mut hash = Vec::with_capacity(anchor_count);
        for _ in 0..anchor_count {
            hash.push(r.read_u32()?);
        }
        hashes.push(hash);
    }

    Ok(MIndex {
        anchors,
        elements,
        hashes,
    })
}

/// Serializes an M-index into its envelope.
pub fn write_mindex(index: &MIndex) -> Vec<u8> {
    codec::write_blob(MINDEX_MAGIC, MINDEX_VERSION, &encode_mindex_body(index))
}

/// Validates the envelope and decodes an M-index.
pub fn read_mindex(bytes: &[u8]) -> Result<MIndex> {
    let body = codec::read_blob(MINDEX_MAGIC, MINDEX_VERSION, bytes)
        .map_err(|msg| corrupt("m-index", msg))?;
    decode_mindex_body(body).map_err(|msg| corrupt("m-index", msg))
}

/// Writes an M-index to `path`.
pub fn save_mindex(index: &MIndex, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, write_mindex(index)).map_err(|e| Error::io(path, e))
}

/// Reads and decodes an M-index from `path`.
pub fn load_mindex(path: impl AsRef<Path>) -> Result<MIndex> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    read_mindex(&bytes)
}
