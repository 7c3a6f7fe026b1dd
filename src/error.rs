//! Error kinds shared across the crate.
//!
//! Sampling and provider errors are local to one region and recoverable at the
//! batch level. [`StoreError`] is the cache I/O failure and is fatal for the
//! call that hit it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::RegionId;
use crate::geometry::Bounds;

/// Failures of the polygon sampler and the region allocator.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("degenerate geometry: {0}")]
    GeometryDegenerate(String),

    #[error(
        "rejection sampling exhausted: {accepted}/{requested} points accepted after {rejected} rejected draws in {bounds}"
    )]
    SamplingExhausted {
        requested: usize,
        accepted: usize,
        rejected: usize,
        bounds: Bounds,
    },
}

/// Failures of a geography provider, attributed to the region being resolved.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unresolved region '{0}'")]
    UnresolvedRegion(RegionId),

    #[error("malformed data for region '{id}': {reason}")]
    Malformed { id: RegionId, reason: String },

    #[error("failed to read geography source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse geography data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("geography request failed: {0}")]
    Http(String),
}

/// Persistent point store failures (the cache I/O error kind).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed cache entry at {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of [`crate::cache::PointCache::get_or_compute`]: either the store
/// failed or the computation did.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Compute(#[from] SampleError),
}

/// A recoverable per-region failure recorded in a batch report.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Sampling(#[from] SampleError),
}

/// Coarse classification of a [`RegionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionErrorKind {
    UnresolvedRegion,
    Malformed,
    GeometryDegenerate,
    SamplingExhausted,
    /// I/O, HTTP or parse failures of the provider itself.
    Unexpected,
}

impl RegionError {
    pub fn kind(&self) -> RegionErrorKind {
        match self {
            RegionError::Provider(ProviderError::UnresolvedRegion(_)) => {
                RegionErrorKind::UnresolvedRegion
            }
            RegionError::Provider(ProviderError::Malformed { .. }) => RegionErrorKind::Malformed,
            RegionError::Provider(_) => RegionErrorKind::Unexpected,
            RegionError::Sampling(SampleError::GeometryDegenerate(_)) => {
                RegionErrorKind::GeometryDegenerate
            }
            RegionError::Sampling(SampleError::SamplingExhausted { .. }) => {
                RegionErrorKind::SamplingExhausted
            }
        }
    }

    /// True for the error kinds a batch expects to meet on real data.
    pub fn is_expected(&self) -> bool {
        self.kind() != RegionErrorKind::Unexpected
    }
}
