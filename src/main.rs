use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::Level;

use dotmap::api::{GeoJsonProvider, GeographyProvider, RemoteProvider};
use dotmap::batch::{BatchOptions, BatchReport, run_batch};
use dotmap::cache::{FsPointStore, PointCache};
use dotmap::config::{FileConfig, ProviderConfig, default_cache_dir};
use dotmap::domain::RegionId;
use dotmap::render::{MapLayer, RenderConfig, write_svg};
use dotmap::sampling::{PolygonSampler, RegionAllocator, SamplerConfig};

/// Render dot-density population maps
///
/// Examples:
///   # All districts from a local GeoJSON file, one dot per 1000 people
///   dotmap --geojson lk.geojson --category district
///
///   # Two regions, one dot per 500 people, custom output
///   dotmap --geojson lk.geojson -r LK-11,LK-12 --people-per-dot 500 -o colombo.svg
///
///   # Regions served over HTTP, resampled from scratch
///   dotmap --url https://example.org/geo --category province --refresh
///
///   # Use a config file
///   dotmap --config my-map.toml
#[derive(Parser, Debug)]
#[command(name = "dotmap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches dotmap.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Region ids to draw, comma separated
    #[arg(short = 'r', long, value_delimiter = ',')]
    regions: Vec<String>,

    /// Draw every region of this category (e.g. district)
    #[arg(short = 'c', long, conflicts_with = "regions")]
    category: Option<String>,

    /// GeoJSON FeatureCollection with region boundaries and population
    #[arg(long, conflicts_with = "url")]
    geojson: Option<PathBuf>,

    /// Base URL of a remote geography provider
    #[arg(long)]
    url: Option<String>,

    /// Population represented by one dot
    #[arg(short = 'p', long)]
    people_per_dot: Option<f64>,

    /// Random seed for dot placement
    #[arg(long)]
    seed: Option<u64>,

    /// Directory of the persistent point cache
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Resample regions even if cached points exist
    #[arg(long)]
    refresh: bool,

    /// Output SVG file path
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Title drawn at the top of the map
    #[arg(long)]
    title: Option<String>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config: FileConfig = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load().unwrap_or_default()
    };

    let verbose = args.verbose || file_config.verbose;
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let people_per_dot = args.people_per_dot.unwrap_or(file_config.people_per_dot);
    if !(people_per_dot.is_finite() && people_per_dot > 0.0) {
        bail!("--people-per-dot must be a positive number, got {}", people_per_dot);
    }
    let seed = args.seed.unwrap_or(file_config.seed);
    let cache_dir = args
        .cache_dir
        .clone()
        .or_else(|| file_config.cache_dir.clone())
        .unwrap_or_else(default_cache_dir);
    let output = args.output.clone().unwrap_or_else(|| file_config.output.clone());
    let width = args.width.unwrap_or(file_config.width);
    let title = args.title.clone().or_else(|| file_config.title.clone());

    let mut provider_config = file_config.provider.clone();
    if args.geojson.is_some() || args.url.is_some() {
        provider_config.geojson = args.geojson.clone();
        provider_config.url = args.url.clone();
    }

    println!("dotmap - Dot-Density Map Generator");
    println!("==================================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  People per dot: {}", people_per_dot);
        println!("  Seed: {}", seed);
        println!("  Cache: {}", cache_dir.display());
        println!("  Output: {}", output.display());
        println!("  Width: {}px", width);
        println!();
    }

    let spinner = create_spinner("Loading geography...");
    let start = Instant::now();
    let provider = open_provider(&provider_config)?;
    spinner.finish_with_message(format!(
        "Geography ready [{:.1}s]",
        start.elapsed().as_secs_f32()
    ));

    let ids: Vec<RegionId> = if !args.regions.is_empty() {
        args.regions.iter().map(|s| RegionId::from(s.trim())).collect()
    } else if let Some(category) = args.category.as_ref().or(file_config.category.as_ref()) {
        provider
            .list_regions(category)
            .with_context(|| format!("Failed to list regions of category '{}'", category))?
    } else if let Some(regions) = &file_config.regions {
        regions.iter().map(|s| RegionId::from(s.as_str())).collect()
    } else {
        bail!("Must provide --regions or --category (or set them in the config file)");
    };

    if ids.is_empty() {
        bail!("No regions selected");
    }

    let store = FsPointStore::open(&cache_dir)
        .with_context(|| format!("Failed to open cache directory {}", cache_dir.display()))?;
    let cache = PointCache::new(store);
    let sampler_config: SamplerConfig = file_config.sampler.into();
    let allocator = RegionAllocator::new(PolygonSampler::new(sampler_config));
    let options = BatchOptions {
        people_per_dot,
        palette: file_config.palette(),
        refresh: args.refresh,
    };
    let mut rng = StdRng::seed_from_u64(seed);

    let spinner = create_spinner(&format!("Placing dots for {} regions...", ids.len()));
    let start = Instant::now();
    let report = run_batch(&provider, &cache, &allocator, &ids, &options, &mut rng)
        .context("Point cache failed")?;
    spinner.finish_with_message(format!(
        "Placed {} dots in {} regions ({} from cache) [{:.1}s]",
        report.total_dots(),
        report.drawn.len(),
        report.cache_hits(),
        start.elapsed().as_secs_f32()
    ));

    print_skipped(&report);

    if report.drawn.is_empty() {
        bail!("Every selected region was skipped; nothing to draw");
    }

    let spinner = create_spinner("Writing SVG...");
    let start = Instant::now();
    let layers: Vec<MapLayer<'_>> = report
        .drawn
        .iter()
        .map(|region| MapLayer {
            outline: &region.spec.geometry,
            points: &region.points,
            color: &region.spec.color,
        })
        .collect();
    let render_config = RenderConfig {
        width,
        dot_radius: file_config.dot_radius,
        title,
        ..Default::default()
    };
    write_svg(&output, &layers, &render_config).context("Failed to write SVG file")?;
    spinner.finish_with_message(format!(
        "Wrote {} [{:.1}s]",
        output.display(),
        start.elapsed().as_secs_f32()
    ));

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    if verbose {
        println!();
        for region in &report.drawn {
            println!(
                "  {:<12} {:>12.0} people  {:>7} dots{}",
                region.spec.id,
                region.population,
                region.points.len(),
                if region.cached { "  (cached)" } else { "" }
            );
        }
    }

    Ok(())
}

fn open_provider(config: &ProviderConfig) -> Result<Box<dyn GeographyProvider>> {
    match (&config.geojson, &config.url) {
        (Some(path), _) => {
            let provider = GeoJsonProvider::load(path)
                .with_context(|| format!("Failed to load GeoJSON from {}", path.display()))?;
            Ok(Box::new(provider))
        }
        (None, Some(url)) => {
            let provider = RemoteProvider::new(
                url,
                Duration::from_secs(config.timeout_secs),
                config.max_retries,
            )
            .context("Failed to set up remote provider")?;
            Ok(Box::new(provider))
        }
        (None, None) => bail!("No geography source: pass --geojson or --url, or set [provider]"),
    }
}

fn print_skipped(report: &BatchReport) {
    if report.skipped.is_empty() {
        return;
    }

    println!();
    println!("Skipped {} regions:", report.skipped.len());
    for skipped in &report.skipped {
        println!(
            "  {:<12} {:?}: {}",
            skipped.id,
            skipped.error.kind(),
            skipped.error
        );
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
