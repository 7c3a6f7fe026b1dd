//! Uniform points strictly inside one simple polygon.
//!
//! Candidates are drawn uniformly from the polygon's bounding box and kept if
//! [`SimplePolygon::contains`] accepts them, so boundary points are never
//! returned. Rejected draws are capped; see [`SamplerConfig`].
use geo::Coord;
use rand::Rng;
use tracing::debug;

use crate::error::SampleError;
use crate::geometry::{Point, SimplePolygon};

/// Limits for the rejection loop.
///
/// At most `rejection_factor * n + rejection_base` candidates may be rejected
/// while collecting `n` points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub rejection_factor: usize,
    pub rejection_base: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            rejection_factor: 1000,
            rejection_base: 10_000,
        }
    }
}

impl SamplerConfig {
    pub fn rejection_cap(&self, n: usize) -> usize {
        self.rejection_factor
            .saturating_mul(n)
            .saturating_add(self.rejection_base)
    }
}

/// Bounding-box rejection sampler.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonSampler {
    config: SamplerConfig,
}

impl PolygonSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Draw exactly `n` points inside `polygon` from `rng`.
    ///
    /// Fails with [`SampleError::GeometryDegenerate`] for a zero-area polygon
    /// and with [`SampleError::SamplingExhausted`] when the rejection cap is hit.
    /// `n == 0` on a valid polygon returns without consuming randomness.
    pub fn sample<R: Rng>(
        &self,
        polygon: &SimplePolygon,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<Point>, SampleError> {
        let area = polygon.area();
        if !(area.is_finite() && area > 0.0) {
            return Err(SampleError::GeometryDegenerate(format!(
                "polygon area is {}",
                area
            )));
        }

        if n == 0 {
            return Ok(Vec::new());
        }

        let bounds = polygon.bounds();
        let cap = self.config.rejection_cap(n);
        let mut points = Vec::with_capacity(n);
        let mut rejected = 0usize;

        while points.len() < n {
            let candidate = Coord {
                x: rng.gen_range(bounds.min_x..=bounds.max_x),
                y: rng.gen_range(bounds.min_y..=bounds.max_y),
            };

            if polygon.contains(candidate) {
                points.push(candidate);
                continue;
            }

            rejected += 1;
            if rejected > cap {
                return Err(SampleError::SamplingExhausted {
                    requested: n,
                    accepted: points.len(),
                    rejected,
                    bounds,
                });
            }
        }

        debug!(n, rejected, "sampled polygon");
        Ok(points)
    }
}
