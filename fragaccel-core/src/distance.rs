//! Distance metrics over sparse integer frequency vectors.
//!
//! Both metrics are contractual: tests in `tests/` depend on the exact
//! zero-vector handling described below, not just on "a reasonable distance".

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::vector::Vector;

/// The two supported distance metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// `1 - cos(a, b)`. Range `[0, 2]`. A zero operand is maximally far
    /// (distance 1) from anything, including another zero vector.
    Cosine,
    /// `sqrt(sum((a_i - b_i)^2))`.
    Euclidean,
}

impl Metric {
    /// Parses a metric name as used by the CLI's `--metric` flag.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" => Ok(Metric::Euclidean),
            other => Err(Error::UnknownMetric(other.to_string())),
        }
    }

    /// Computes the distance between `a` and `b` under this metric.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `a` and `b` have different
    /// dimensions.
    pub fn distance(&self, a: &Vector, b: &Vector) -> Result<f64> {
        if a.dimension() != b.dimension() {
            return Err(Error::DimensionMismatch {
                expected: a.dimension(),
                got: b.dimension(),
            });
        }
        Ok(match self {
            Metric::Cosine => cosine_distance(a, b),
            Metric::Euclidean => euclidean_distance(a, b),
        })
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Cosine => write!(f, "cosine"),
            Metric::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Cosine distance. Assumes `a` and `b` share a dimension.
pub fn cosine_distance(a: &Vector, b: &Vector) -> f64 {
    let norm_a = (a.norm_sq() as f64).sqrt();
    let norm_b = (b.norm_sq() as f64).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    let dot: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| (x as f64) * (y as f64))
        .sum();

    (1.0 - dot / (norm_a * norm_b)).clamp(0.0, 2.0)
}

/// Euclidean distance. Assumes `a` and `b` share a dimension.
pub fn euclidean_distance(a: &Vector, b: &Vector) -> f64 {
    let sum_sq: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| {
            let diff = x as f64 - y as f64;
            diff * diff
        })
        .sum();
    sum_sq.sqrt()
}
