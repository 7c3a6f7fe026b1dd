//! Splitting a region's dot budget across its sub-polygons.
//!
//! Each part gets `round_half_even(n * area_i / total_area)` points. The sum of
//! the shares may differ from `n` by up to half the number of parts; that drift
//! is accepted as is and never redistributed.
use rand::Rng;
use tracing::debug;

use super::{PolygonSampler, round_half_even};
use crate::domain::RegionSpec;
use crate::error::SampleError;
use crate::geometry::{MultiPolygon, Point};

#[derive(Debug, Clone, Copy, Default)]
pub struct RegionAllocator {
    sampler: PolygonSampler,
}

impl RegionAllocator {
    pub fn new(sampler: PolygonSampler) -> Self {
        Self { sampler }
    }

    pub fn sampler(&self) -> &PolygonSampler {
        &self.sampler
    }

    /// Per-part point counts for `n` points over `geometry`, in part order.
    pub fn shares(&self, geometry: &MultiPolygon, n: usize) -> Result<Vec<usize>, SampleError> {
        let areas: Vec<f64> = geometry.parts().iter().map(|p| p.area()).collect();
        let total: f64 = areas.iter().sum();

        if !(total.is_finite() && total > 0.0) {
            return Err(SampleError::GeometryDegenerate(format!(
                "region of {} parts has total area {}",
                geometry.len(),
                total
            )));
        }

        Ok(areas
            .iter()
            .map(|area| round_half_even(n as f64 * area / total))
            .collect())
    }

    /// Sample the region's target count, part by part in input order.
    ///
    /// The result length equals the sum of [`Self::shares`], which can drift
    /// from `region.target_count` by rounding.
    pub fn allocate<R: Rng>(
        &self,
        region: &RegionSpec,
        rng: &mut R,
    ) -> Result<Vec<Point>, SampleError> {
        let shares = self.shares(&region.geometry, region.target_count)?;
        let mut points = Vec::with_capacity(shares.iter().sum());

        for (part, &count) in region.geometry.parts().iter().zip(&shares) {
            if count == 0 {
                continue;
            }
            points.extend(self.sampler.sample(part, count, rng)?);
        }

        debug!(
            region = %region.id,
            requested = region.target_count,
            placed = points.len(),
            parts = shares.len(),
            "allocated region"
        );
        Ok(points)
    }
}
