pub mod color;
pub mod region;

pub use color::{Color, default_palette};
pub use region::{Region, RegionId, RegionSpec};
