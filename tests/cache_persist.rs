use dotmap::cache::{CacheKey, FsPointStore, MemoryPointStore, PointCache, PointStore};
use dotmap::domain::{Color, RegionId, RegionSpec};
use dotmap::geometry::{MultiPolygon, Point, SimplePolygon};
use dotmap::sampling::RegionAllocator;
use geo::Coord;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::tempdir;

fn island_region(n: usize) -> RegionSpec {
    let mainland =
        SimplePolygon::from_tuples(&[(79.8, 6.0), (81.8, 6.0), (81.8, 9.8), (79.8, 9.8)]).unwrap();
    let island =
        SimplePolygon::from_tuples(&[(79.6, 9.9), (79.7, 9.9), (79.7, 10.0), (79.6, 10.0)])
            .unwrap();
    RegionSpec::new(
        RegionId::from("LK"),
        MultiPolygon::new(vec![mainland, island]),
        n,
        Color::new("black"),
    )
}

fn marker(n: usize) -> Vec<Point> {
    (0..n).map(|i| Coord { x: i as f64, y: -(i as f64) }).collect()
}

#[test]
fn cached_list_wins_over_recompute() {
    let cache = PointCache::new(MemoryPointStore::new());
    let key = CacheKey::new(RegionId::from("LK-11"), 4);

    let first = cache.get_or_compute(&key, || Ok(marker(4))).unwrap();
    let second = cache.get_or_compute(&key, || Ok(marker(9))).unwrap();

    assert_eq!(first, marker(4));
    assert_eq!(second, marker(4));
}

#[test]
fn changing_count_is_a_miss() {
    let cache = PointCache::new(MemoryPointStore::new());
    let id = RegionId::from("LK-11");

    cache
        .get_or_compute(&CacheKey::new(id.clone(), 4), || Ok(marker(4)))
        .unwrap();
    let mut computed = false;
    let points = cache
        .get_or_compute(&CacheKey::new(id, 6), || {
            computed = true;
            Ok(marker(6))
        })
        .unwrap();

    assert!(computed);
    assert_eq!(points.len(), 6);
}

#[test]
fn sampled_points_survive_restart() {
    let dir = tempdir().unwrap();
    let allocator = RegionAllocator::default();
    let spec = island_region(300);
    let key = CacheKey::new(spec.id.clone(), spec.target_count);

    let first = {
        let cache = PointCache::new(FsPointStore::open(dir.path()).unwrap());
        let mut rng = StdRng::seed_from_u64(1);
        cache
            .get_or_compute(&key, || allocator.allocate(&spec, &mut rng))
            .unwrap()
    };
    assert!(first.iter().all(|p| spec.geometry.contains(*p)));

    // New process: different seed, but the stored entry must be returned as is
    let cache = PointCache::new(FsPointStore::open(dir.path()).unwrap());
    let mut rng = StdRng::seed_from_u64(2);
    let second = cache
        .get_or_compute(&key, || allocator.allocate(&spec, &mut rng))
        .unwrap();

    assert_eq!(first, second);
    assert!(cache.store().contains(&key).unwrap());
}

#[test]
fn invalidated_entry_is_resampled() {
    let dir = tempdir().unwrap();
    let cache = PointCache::new(FsPointStore::open(dir.path()).unwrap());
    let allocator = RegionAllocator::default();
    let spec = island_region(50);
    let key = CacheKey::new(spec.id.clone(), 50);

    let mut rng = StdRng::seed_from_u64(1);
    let first = cache
        .get_or_compute(&key, || allocator.allocate(&spec, &mut rng))
        .unwrap();

    assert!(cache.invalidate(&key).unwrap());
    let second = cache
        .get_or_compute(&key, || allocator.allocate(&spec, &mut rng))
        .unwrap();

    assert_eq!(first.len(), second.len());
    assert_ne!(first, second);
}
