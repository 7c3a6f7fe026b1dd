pub mod polygon;
pub mod projection;
pub mod scaling;

pub use polygon::{MultiPolygon, Point, SimplePolygon};
pub use projection::Projector;
pub use scaling::{Bounds, Scaler};
