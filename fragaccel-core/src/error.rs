//! Error taxonomy for fragaccel operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using fragaccel's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, persisting, or querying an index.
#[derive(Debug, Error)]
pub enum Error {
    /// Two vectors (or a vector and an index) disagree on dimension.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// `add` was called on an entry store after `close`.
    #[error("entry store is closed")]
    ClosedStore,

    /// A store's library provenance or dimension disagrees with an expected one.
    #[error("library mismatch: expected {expected}, got {got}")]
    LibraryMismatch { expected: String, got: String },

    /// The clustering source contained no entries.
    #[error("clustering source is empty")]
    EmptySource,

    /// Requested center count exceeds the number of source entries.
    #[error("requested {k} centers but source has only {n} entries")]
    KTooLarge { k: usize, n: usize },

    /// `r_max` was not a positive radius.
    #[error("max radius must be positive, got {0}")]
    BadRadius(f64),

    /// A `--metric` flag (or persisted metric tag) did not name a known metric.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// A `--kCenterAlg` flag did not name a known clustering policy.
    #[error("unknown clustering policy: {0}")]
    UnknownPolicy(String),

    /// The legacy ASCII bag-of-fragments codec rejected malformed input.
    #[error("malformed old-style ascii input: {0}")]
    MalformedAscii(String),

    /// A persisted artifact failed to decode (bad magic, version, or checksum).
    #[error("artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    /// Underlying I/O failure, reported with the offending path.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = Error::DimensionMismatch {
            expected: 4,
            got: 7,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 4, got 7");
    }

    #[test]
    fn test_io_error_includes_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::io("/tmp/missing.db", source);
        assert!(err.to_string().contains("/tmp/missing.db"));
    }
}
