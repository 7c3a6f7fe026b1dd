use geo::Coord;

/// Equirectangular projection from WGS84 lon/lat to local meters
///
/// Uses approximation suitable for region-scale maps:
/// - x = (lon - center_lon) * cos(center_lat) * 111320
/// - y = (lat - center_lat) * 111320
///
/// Only used for drawing; sampling and caching stay in provider coordinates.
#[derive(Debug, Clone)]
pub struct Projector {
    center_lat: f64,
    center_lon: f64,
    cos_lat: f64,
}

impl Projector {
    /// Create a new projector centered at the given coordinates
    ///
    /// # Arguments
    /// * `center` - (lat, lon) center point in WGS84
    pub fn new(center: (f64, f64)) -> Self {
        let (lat, lon) = center;
        Self {
            center_lat: lat,
            center_lon: lon,
            cos_lat: lat.to_radians().cos(),
        }
    }

    /// Project a lat/lon point to local meters
    ///
    /// # Returns
    /// * (x, y) in meters, centered at the projection center
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        // Meters per degree at equator
        const METERS_PER_DEGREE: f64 = 111320.0;

        let x = (lon - self.center_lon) * self.cos_lat * METERS_PER_DEGREE;
        let y = (lat - self.center_lat) * METERS_PER_DEGREE;

        (x, y)
    }

    /// Project a coordinate whose x is longitude and y latitude
    pub fn project_coord(&self, c: Coord<f64>) -> (f64, f64) {
        self.project(c.y, c.x)
    }
}
