//! Simple polygons and multi-part regions.
//!
//! Containment is boundary-exclusive: a point lying exactly on an edge or a
//! vertex of the ring is outside. Everything else is decided by the even-odd
//! crossing-number rule over the closed ring. Both checks use plain f64
//! arithmetic, so "exactly" means exactly as evaluated in f64.

use geo::{Area, Coord, LineString, Polygon};

use super::Bounds;
use crate::error::SampleError;

/// A planar point; x is longitude and y latitude for provider data.
pub type Point = Coord<f64>;

/// A closed ring of at least three vertices, without holes.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplePolygon {
    inner: Polygon<f64>,
    bounds: Bounds,
}

impl SimplePolygon {
    /// Build a polygon from its boundary vertices. The ring is closed
    /// automatically; a repeated closing vertex is accepted.
    pub fn new(vertices: Vec<Point>) -> Result<Self, SampleError> {
        let mut ring = vertices;
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        if ring.len() < 3 {
            return Err(SampleError::GeometryDegenerate(format!(
                "ring has {} distinct vertices, need at least 3",
                ring.len()
            )));
        }
        if ring.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(SampleError::GeometryDegenerate(
                "ring has non-finite coordinates".to_string(),
            ));
        }

        let bounds = Bounds::from_coords(&ring).ok_or_else(|| {
            SampleError::GeometryDegenerate("ring has no vertices".to_string())
        })?;

        Ok(Self {
            inner: Polygon::new(LineString::from(ring), Vec::new()),
            bounds,
        })
    }

    pub fn from_tuples(vertices: &[(f64, f64)]) -> Result<Self, SampleError> {
        Self::new(vertices.iter().map(|&(x, y)| Coord { x, y }).collect())
    }

    /// Shoelace area, absolute value
    pub fn area(&self) -> f64 {
        self.inner.unsigned_area()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The closed boundary ring (first vertex repeated at the end)
    pub fn ring(&self) -> &LineString<f64> {
        self.inner.exterior()
    }

    pub fn as_geo(&self) -> &Polygon<f64> {
        &self.inner
    }

    /// Boundary-exclusive point-in-polygon test.
    pub fn contains(&self, p: Point) -> bool {
        if !self.bounds.contains(p) {
            return false;
        }

        let mut inside = false;
        for line in self.ring().lines() {
            let (a, b) = (line.start, line.end);
            if on_segment(a, b, p) {
                return false;
            }
            // Half-open in y so a ray through a vertex counts once
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross != 0.0 {
        return false;
    }
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// All sub-polygons of one region (mainland, islands, enclaves), in input order.
///
/// Overlap between parts is not checked.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPolygon {
    parts: Vec<SimplePolygon>,
}

impl MultiPolygon {
    pub fn new(parts: Vec<SimplePolygon>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[SimplePolygon] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn area(&self) -> f64 {
        self.parts.iter().map(SimplePolygon::area).sum()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut parts = self.parts.iter();
        let mut bounds = parts.next()?.bounds();
        for part in parts {
            bounds.union(&part.bounds());
        }
        Some(bounds)
    }

    /// True if any part contains the point
    pub fn contains(&self, p: Point) -> bool {
        self.parts.iter().any(|part| part.contains(p))
    }
}

impl From<SimplePolygon> for MultiPolygon {
    fn from(polygon: SimplePolygon) -> Self {
        Self::new(vec![polygon])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;

    fn unit_square() -> SimplePolygon {
        SimplePolygon::from_tuples(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap()
    }

    #[test]
    fn test_area_shoelace() {
        assert!((unit_square().area() - 1.0).abs() < 1e-12);

        // Clockwise winding still yields a positive area
        let cw = SimplePolygon::from_tuples(&[(0.0, 0.0), (0.0, 2.0), (3.0, 2.0), (3.0, 0.0)])
            .unwrap();
        assert!((cw.area() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_closing_vertex_accepted() {
        let closed = SimplePolygon::from_tuples(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(closed, unit_square());
    }

    #[test]
    fn test_too_few_vertices() {
        let result = SimplePolygon::from_tuples(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        assert!(matches!(result, Err(SampleError::GeometryDegenerate(_))));
    }

    #[test]
    fn test_non_finite_rejected() {
        let result = SimplePolygon::from_tuples(&[(0.0, 0.0), (f64::NAN, 0.0), (0.0, 1.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_collinear_has_zero_area() {
        let line = SimplePolygon::from_tuples(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]).unwrap();
        assert_eq!(line.area(), 0.0);
    }

    #[test]
    fn test_contains_interior_and_exterior() {
        let square = unit_square();
        assert!(square.contains(Coord { x: 0.5, y: 0.5 }));
        assert!(square.contains(Coord { x: 0.001, y: 0.999 }));
        assert!(!square.contains(Coord { x: 1.5, y: 0.5 }));
        assert!(!square.contains(Coord { x: -0.1, y: 0.5 }));
    }

    #[test]
    fn test_boundary_is_outside() {
        let square = unit_square();
        for p in [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 0.5, y: 0.0 },
            Coord { x: 1.0, y: 0.25 },
            Coord { x: 0.0, y: 0.75 },
            Coord { x: 0.5, y: 1.0 },
        ] {
            assert!(!square.contains(p), "{:?} should be outside", p);
        }
    }

    #[test]
    fn test_contains_concave() {
        // U shape opening upwards
        let u = SimplePolygon::from_tuples(&[
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ])
        .unwrap();
        assert!(u.contains(Coord { x: 0.5, y: 2.0 }));
        assert!(u.contains(Coord { x: 2.5, y: 2.0 }));
        assert!(u.contains(Coord { x: 1.5, y: 0.5 }));
        assert!(!u.contains(Coord { x: 1.5, y: 2.0 }));
        // Ray from here passes through the vertex at (2, 1)
        assert!(u.contains(Coord { x: 0.5, y: 1.0 }));
    }

    #[test]
    fn test_contains_agrees_with_geo_off_boundary() {
        let poly = SimplePolygon::from_tuples(&[
            (0.0, 0.0),
            (4.0, 1.0),
            (3.0, 4.0),
            (1.5, 2.0),
            (-1.0, 3.0),
        ])
        .unwrap();
        for i in 0..50 {
            for j in 0..50 {
                let p = Coord {
                    x: -1.5 + i as f64 * 0.113,
                    y: -0.5 + j as f64 * 0.097,
                };
                assert_eq!(poly.contains(p), poly.as_geo().contains(&p), "{:?}", p);
            }
        }
    }

    #[test]
    fn test_multipolygon_area_and_bounds() {
        let a = unit_square();
        let b = SimplePolygon::from_tuples(&[(2.0, 2.0), (3.0, 2.0), (3.0, 3.0), (2.0, 3.0)])
            .unwrap();
        let multi = MultiPolygon::new(vec![a, b]);

        assert_eq!(multi.len(), 2);
        assert!((multi.area() - 2.0).abs() < 1e-12);
        let bounds = multi.bounds().unwrap();
        assert_eq!((bounds.min_x, bounds.max_x), (0.0, 3.0));
        assert_eq!((bounds.min_y, bounds.max_y), (0.0, 3.0));
        assert!(multi.contains(Coord { x: 2.5, y: 2.5 }));
        assert!(!multi.contains(Coord { x: 1.5, y: 1.5 }));
    }

    #[test]
    fn test_empty_multipolygon() {
        let multi = MultiPolygon::default();
        assert!(multi.is_empty());
        assert_eq!(multi.area(), 0.0);
        assert!(multi.bounds().is_none());
    }
}
