use dotmap::api::{GeoJsonProvider, GeographyProvider};
use dotmap::batch::{BatchOptions, run_batch};
use dotmap::cache::{CacheKey, FsPointStore, MemoryPointStore, PointCache, PointStore};
use dotmap::domain::RegionId;
use dotmap::error::{RegionErrorKind, StoreError};
use dotmap::geometry::Point;
use dotmap::sampling::RegionAllocator;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::path::PathBuf;
use tempfile::tempdir;

const REGIONS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature",
         "properties": {"id": "A", "category": "district", "population": 10000},
         "geometry": {"type": "MultiPolygon", "coordinates": [
            [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]],
            [[[2, 0], [3, 0], [3, 1], [2, 1], [2, 0]]]
         ]}},
        {"type": "Feature",
         "properties": {"id": "FLAT", "category": "district", "population": 5000},
         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 1], [2, 2], [0, 0]]]}},
        {"type": "Feature",
         "properties": {"id": "B", "category": "district", "population": 2500},
         "geometry": {"type": "Polygon", "coordinates": [[[5, 5], [6, 5], [6, 6], [5, 6], [5, 5]]]}},
        {"type": "Feature",
         "properties": {"id": "P", "category": "province", "population": 12500},
         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [6, 0], [6, 6], [0, 6], [0, 0]]]}}
    ]
}"#;

fn ids(list: &[&str]) -> Vec<RegionId> {
    list.iter().map(|s| RegionId::from(*s)).collect()
}

/// Store whose writes always fail
struct ReadOnlyStore;

impl PointStore for ReadOnlyStore {
    fn contains(&self, _key: &CacheKey) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn load(&self, _key: &CacheKey) -> Result<Option<Vec<Point>>, StoreError> {
        Ok(None)
    }

    fn store(&self, _key: &CacheKey, _points: &[Point]) -> Result<(), StoreError> {
        Err(StoreError::Io {
            path: PathBuf::from("/read-only"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    fn remove(&self, _key: &CacheKey) -> Result<bool, StoreError> {
        Ok(false)
    }
}

#[test]
fn bad_regions_are_skipped_and_the_rest_drawn() {
    let provider = GeoJsonProvider::from_json(REGIONS).unwrap();
    let cache = PointCache::new(MemoryPointStore::new());
    let mut rng = StdRng::seed_from_u64(7);

    let report = run_batch(
        &provider,
        &cache,
        &RegionAllocator::default(),
        &ids(&["A", "MISSING", "FLAT", "B"]),
        &BatchOptions::default(),
        &mut rng,
    )
    .unwrap();

    let drawn: Vec<&str> = report.drawn.iter().map(|r| r.spec.id.as_str()).collect();
    assert_eq!(drawn, vec!["A", "B"]);

    // 10000 people / 1000 = 10 dots, split 5 and 5 over two equal squares
    assert_eq!(report.drawn[0].spec.target_count, 10);
    assert_eq!(report.drawn[0].points.len(), 10);
    // 2.5 rounds half to even
    assert_eq!(report.drawn[1].spec.target_count, 2);
    assert_eq!(report.total_dots(), 12);

    let skipped: Vec<(&str, RegionErrorKind)> = report
        .skipped
        .iter()
        .map(|s| (s.id.as_str(), s.error.kind()))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("MISSING", RegionErrorKind::UnresolvedRegion),
            ("FLAT", RegionErrorKind::GeometryDegenerate),
        ]
    );
    assert!(report.skipped.iter().all(|s| s.error.is_expected()));
}

#[test]
fn colors_follow_selection_order() {
    let provider = GeoJsonProvider::from_json(REGIONS).unwrap();
    let cache = PointCache::new(MemoryPointStore::new());
    let options = BatchOptions::default();

    let report = run_batch(
        &provider,
        &cache,
        &RegionAllocator::default(),
        &ids(&["B", "A"]),
        &options,
        &mut StdRng::seed_from_u64(1),
    )
    .unwrap();

    assert_eq!(report.drawn[0].spec.color, options.palette[0]);
    assert_eq!(report.drawn[1].spec.color, options.palette[1]);
}

#[test]
fn cache_failure_aborts_the_batch() {
    let provider = GeoJsonProvider::from_json(REGIONS).unwrap();
    let cache = PointCache::new(ReadOnlyStore);

    let result = run_batch(
        &provider,
        &cache,
        &RegionAllocator::default(),
        &ids(&["A", "B"]),
        &BatchOptions::default(),
        &mut StdRng::seed_from_u64(1),
    );
    assert!(matches!(result, Err(StoreError::Io { .. })));
}

#[test]
fn second_run_is_served_from_cache() {
    let dir = tempdir().unwrap();
    let provider = GeoJsonProvider::from_json(REGIONS).unwrap();
    let allocator = RegionAllocator::default();
    let selection = provider.list_regions("district").unwrap();

    let run = |seed: u64, refresh: bool| {
        let cache = PointCache::new(FsPointStore::open(dir.path()).unwrap());
        let options = BatchOptions {
            refresh,
            ..Default::default()
        };
        run_batch(
            &provider,
            &cache,
            &allocator,
            &selection,
            &options,
            &mut StdRng::seed_from_u64(seed),
        )
        .unwrap()
    };

    let first = run(1, false);
    assert_eq!(first.cache_hits(), 0);

    let second = run(2, false);
    assert_eq!(second.cache_hits(), 2);
    for (a, b) in first.drawn.iter().zip(&second.drawn) {
        assert_eq!(a.points, b.points);
    }

    let refreshed = run(3, true);
    assert_eq!(refreshed.cache_hits(), 0);
    assert_ne!(refreshed.drawn[0].points, first.drawn[0].points);
}

#[test]
fn people_per_dot_changes_the_key() {
    let provider = GeoJsonProvider::from_json(REGIONS).unwrap();
    let cache = PointCache::new(MemoryPointStore::new());
    let allocator = RegionAllocator::default();
    let mut rng = StdRng::seed_from_u64(1);

    for people_per_dot in [1000.0, 500.0] {
        let options = BatchOptions {
            people_per_dot,
            ..Default::default()
        };
        let report =
            run_batch(&provider, &cache, &allocator, &ids(&["P"]), &options, &mut rng).unwrap();
        assert_eq!(report.cache_hits(), 0);
        assert_eq!(
            report.drawn[0].points.len(),
            (12500.0_f64 / people_per_dot).round_ties_even() as usize
        );
    }
    assert_eq!(cache.store().len(), 2);
}
