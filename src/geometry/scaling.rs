use geo::Coord;
use std::fmt;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Create bounds from a set of points
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let coords: Vec<Coord<f64>> = points.iter().map(|&(x, y)| Coord { x, y }).collect();
        Self::from_coords(&coords)
    }

    pub fn from_coords(coords: &[Coord<f64>]) -> Option<Self> {
        if coords.is_empty() {
            return None;
        }

        let mut min_x = f64::MAX;
        let mut max_x = f64::MIN;
        let mut min_y = f64::MAX;
        let mut max_y = f64::MIN;

        for c in coords {
            min_x = min_x.min(c.x);
            max_x = max_x.max(c.x);
            min_y = min_y.min(c.y);
            max_y = max_y.max(c.y);
        }

        Some(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Grow to cover another box
    pub fn union(&mut self, other: &Bounds) {
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Closed-interval test
    pub fn contains(&self, c: Coord<f64>) -> bool {
        c.x >= self.min_x && c.x <= self.max_x && c.y >= self.min_y && c.y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

/// Maps projected coordinates (meters) onto an image canvas (pixels).
///
/// Image y grows downwards, so the y axis is flipped.
#[derive(Debug, Clone)]
pub struct Scaler {
    /// Pixels per meter
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    width_px: f64,
    height_px: f64,
}

impl Scaler {
    /// Fit `bounds` into a canvas `width_px` wide, keeping the aspect ratio.
    ///
    /// The canvas height follows from the aspect ratio of `bounds`; `margin_px`
    /// is kept free on every side.
    pub fn fit(bounds: &Bounds, width_px: f64, margin_px: f64) -> Self {
        let width = bounds.width();
        let height = bounds.height();
        let usable_width = (width_px - 2.0 * margin_px).max(1.0);

        let scale = if width > 0.0 {
            usable_width / width
        } else if height > 0.0 {
            usable_width / height
        } else {
            1.0
        };

        let scaled_width = width * scale;
        let scaled_height = height * scale;
        let height_px = (scaled_height + 2.0 * margin_px).max(1.0);

        let offset_x = (width_px - scaled_width) / 2.0 - bounds.min_x * scale;
        let offset_y = margin_px - bounds.min_y * scale;

        Self {
            scale,
            offset_x,
            offset_y,
            width_px,
            height_px,
        }
    }

    /// Scale a projected point to canvas pixels
    pub fn scale(&self, x: f64, y: f64) -> (f64, f64) {
        let px = x * self.scale + self.offset_x;
        let py = self.height_px - (y * self.scale + self.offset_y);
        (px, py)
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale
    }

    pub fn width(&self) -> f64 {
        self.width_px
    }

    pub fn height(&self) -> f64 {
        self.height_px
    }
}
