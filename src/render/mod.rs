pub mod svg;

pub use svg::{MapLayer, RenderConfig, render_svg, write_svg};
