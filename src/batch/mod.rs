//! Per-region driver: resolve, size, sample through the cache, and report.
//!
//! A region that cannot be resolved or sampled is recorded in the
//! [`BatchReport`] and the batch moves on. Cache I/O failures stop the batch.
use rand::Rng;
use tracing::{debug, warn};

use crate::api::GeographyProvider;
use crate::cache::{CacheKey, PointCache, PointStore};
use crate::domain::{Color, Region, RegionId, RegionSpec, default_palette};
use crate::error::{CacheError, RegionError, StoreError};
use crate::geometry::Point;
use crate::sampling::{RegionAllocator, round_half_even};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Population represented by one dot
    pub people_per_dot: f64,
    /// Region `i` gets `palette[i % len]`
    pub palette: Vec<Color>,
    /// Drop cached points for each region before sampling
    pub refresh: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            people_per_dot: 1000.0,
            palette: default_palette(),
            refresh: false,
        }
    }
}

impl BatchOptions {
    fn color_for(&self, index: usize) -> Color {
        if self.palette.is_empty() {
            return Color::new("black");
        }
        self.palette[index % self.palette.len()].clone()
    }
}

#[derive(Debug, Clone)]
pub struct DrawnRegion {
    pub spec: RegionSpec,
    pub name: Option<String>,
    pub population: f64,
    pub points: Vec<Point>,
    /// Points came from the cache rather than fresh sampling
    pub cached: bool,
}

#[derive(Debug)]
pub struct SkippedRegion {
    pub id: RegionId,
    pub error: RegionError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub drawn: Vec<DrawnRegion>,
    pub skipped: Vec<SkippedRegion>,
}

impl BatchReport {
    pub fn total_dots(&self) -> usize {
        self.drawn.iter().map(|r| r.points.len()).sum()
    }

    pub fn cache_hits(&self) -> usize {
        self.drawn.iter().filter(|r| r.cached).count()
    }
}

/// Number of dots for a population, rounded half to even
pub fn dot_count(population: f64, people_per_dot: f64) -> usize {
    if !(people_per_dot > 0.0) {
        return 0;
    }
    round_half_even(population / people_per_dot)
}

/// Run every region in `ids` in order, threading `rng` through each miss.
///
/// Cache hits do not consume randomness, so later regions only reproduce
/// exactly when the cache state is the same.
pub fn run_batch<P, S, R>(
    provider: &P,
    cache: &PointCache<S>,
    allocator: &RegionAllocator,
    ids: &[RegionId],
    options: &BatchOptions,
    rng: &mut R,
) -> Result<BatchReport, StoreError>
where
    P: GeographyProvider + ?Sized,
    S: PointStore,
    R: Rng,
{
    let mut report = BatchReport::default();

    for (index, id) in ids.iter().enumerate() {
        let region = match provider.resolve(id) {
            Ok(region) => region,
            Err(e) => {
                warn!(region = %id, error = %e, "skipping region");
                report.skipped.push(SkippedRegion {
                    id: id.clone(),
                    error: e.into(),
                });
                continue;
            }
        };

        let Region {
            id: _,
            name,
            category: _,
            population,
            geometry,
        } = region;
        let count = dot_count(population, options.people_per_dot);
        let spec = RegionSpec::new(id.clone(), geometry, count, options.color_for(index));
        let key = CacheKey::new(id.clone(), count);

        if options.refresh && cache.invalidate(&key)? {
            debug!(key = %key, "invalidated cached points");
        }
        let cached = cache.contains(&key)?;

        match cache.get_or_compute(&key, || allocator.allocate(&spec, &mut *rng)) {
            Ok(points) => {
                debug!(region = %id, dots = points.len(), cached, "drew region");
                report.drawn.push(DrawnRegion {
                    spec,
                    name,
                    population,
                    points,
                    cached,
                });
            }
            Err(CacheError::Compute(e)) => {
                let bounds = spec.geometry.bounds();
                warn!(
                    region = %id,
                    n = count,
                    bounds = ?bounds,
                    error = %e,
                    "skipping region"
                );
                report.skipped.push(SkippedRegion {
                    id: id.clone(),
                    error: e.into(),
                });
            }
            Err(CacheError::Store(e)) => return Err(e),
        }
    }

    Ok(report)
}
