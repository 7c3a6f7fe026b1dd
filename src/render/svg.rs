use anyhow::{Context, Result, bail};
use std::fmt::Write as _;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::domain::Color;
use crate::geometry::{Bounds, MultiPolygon, Point, Projector, Scaler};

/// Canvas settings for the SVG output
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Canvas width in px; the height follows the map's aspect ratio
    pub width: u32,
    pub margin: f64,
    pub dot_radius: f64,
    pub background: String,
    pub outline_color: String,
    pub outline_width: f64,
    pub title: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            margin: 20.0,
            dot_radius: 0.8,
            background: "#ffffff".to_string(),
            outline_color: "#444444".to_string(),
            outline_width: 0.5,
            title: None,
        }
    }
}

/// One region to draw: its outline and its dots
#[derive(Debug, Clone, Copy)]
pub struct MapLayer<'a> {
    pub outline: &'a MultiPolygon,
    pub points: &'a [Point],
    pub color: &'a Color,
}

/// Render layers into an SVG document.
///
/// Coordinates are lon/lat and are projected equirectangularly around the
/// center of all outlines. Outlines are drawn first, dots on top, in layer order.
pub fn render_svg(layers: &[MapLayer<'_>], config: &RenderConfig) -> Result<String> {
    let Some(geo_bounds) = combined_bounds(layers) else {
        bail!("nothing to render: no region outlines");
    };

    let center = geo_bounds.center();
    let projector = Projector::new((center.y, center.x));

    let corners: Vec<(f64, f64)> = layers
        .iter()
        .flat_map(|layer| layer.outline.parts())
        .flat_map(|part| part.ring().coords())
        .map(|&c| projector.project_coord(c))
        .collect();
    let projected_bounds =
        Bounds::from_points(&corners).context("Failed to compute projected bounds")?;
    let scaler = Scaler::fit(&projected_bounds, config.width as f64, config.margin);

    let to_px = |c: Point| {
        let (x, y) = projector.project_coord(c);
        scaler.scale(x, y)
    };

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = scaler.width(),
        h = scaler.height()
    )?;
    writeln!(
        svg,
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        escape(&config.background)
    )?;

    writeln!(
        svg,
        r#"<g fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round">"#,
        escape(&config.outline_color),
        config.outline_width
    )?;
    for layer in layers {
        for part in layer.outline.parts() {
            let mut d = String::new();
            for (i, &c) in part.ring().coords().enumerate() {
                let (x, y) = to_px(c);
                write!(d, "{}{:.2} {:.2} ", if i == 0 { "M" } else { "L" }, x, y)?;
            }
            d.push('Z');
            writeln!(svg, r#"<path d="{}"/>"#, d)?;
        }
    }
    writeln!(svg, "</g>")?;

    for layer in layers {
        writeln!(svg, r#"<g fill="{}">"#, escape(layer.color.as_str()))?;
        for &p in layer.points {
            let (x, y) = to_px(p);
            writeln!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{}"/>"#,
                x, y, config.dot_radius
            )?;
        }
        writeln!(svg, "</g>")?;
    }

    if let Some(title) = &config.title {
        writeln!(
            svg,
            r#"<text x="{:.0}" y="{:.0}" font-family="sans-serif" font-size="16" text-anchor="middle">{}</text>"#,
            scaler.width() / 2.0,
            config.margin.max(16.0),
            escape(title)
        )?;
    }

    writeln!(svg, "</svg>")?;
    Ok(svg)
}

/// Render layers and write the SVG to `path`.
///
/// The document goes to a temporary file next to `path` that is renamed into
/// place, so a failed write never leaves a truncated map behind.
pub fn write_svg(path: &Path, layers: &[MapLayer<'_>], config: &RenderConfig) -> Result<()> {
    let svg = render_svg(layers, config)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create SVG file in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        writer.write_all(svg.as_bytes())?;
        writer.flush()?;
    }
    tmp.persist(path)
        .with_context(|| format!("Failed to write SVG file: {}", path.display()))?;

    Ok(())
}

fn combined_bounds(layers: &[MapLayer<'_>]) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;
    for layer in layers {
        if let Some(b) = layer.outline.bounds() {
            match bounds.as_mut() {
                Some(acc) => acc.union(&b),
                None => bounds = Some(b),
            }
        }
    }
    bounds
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
