use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::{Color, default_palette};
use crate::sampling::SamplerConfig;

/// Default population represented by one dot
pub const DEFAULT_PEOPLE_PER_DOT: f64 = 1000.0;

fn default_people_per_dot() -> f64 {
    DEFAULT_PEOPLE_PER_DOT
}
fn default_output() -> PathBuf {
    PathBuf::from("dotmap.svg")
}
fn default_width() -> u32 {
    1000
}
fn default_dot_radius() -> f64 {
    0.8
}
fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_people_per_dot")]
    pub people_per_dot: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_dot_radius")]
    pub dot_radius: f64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub palette: Option<Vec<Color>>,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub sampler: SamplerSettings,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            people_per_dot: default_people_per_dot(),
            seed: 0,
            cache_dir: None,
            output: default_output(),
            width: default_width(),
            dot_radius: default_dot_radius(),
            title: None,
            palette: None,
            regions: None,
            category: None,
            verbose: default_verbose(),
            provider: ProviderConfig::default(),
            sampler: SamplerSettings::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Where region geometry comes from: a local GeoJSON file or an HTTP base URL
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub geojson: Option<PathBuf>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            geojson: None,
            url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_rejection_factor() -> usize {
    SamplerConfig::default().rejection_factor
}

fn default_rejection_base() -> usize {
    SamplerConfig::default().rejection_base
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SamplerSettings {
    #[serde(default = "default_rejection_factor")]
    pub rejection_factor: usize,
    #[serde(default = "default_rejection_base")]
    pub rejection_base: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            rejection_factor: default_rejection_factor(),
            rejection_base: default_rejection_base(),
        }
    }
}

impl From<SamplerSettings> for SamplerConfig {
    fn from(settings: SamplerSettings) -> Self {
        SamplerConfig {
            rejection_factor: settings.rejection_factor,
            rejection_base: settings.rejection_base,
        }
    }
}

impl FileConfig {
    /// First config file found in the search path, if any.
    ///
    /// Files that fail to parse are reported on stderr and skipped. This runs
    /// before logging is set up, so it cannot go through `tracing`.
    pub fn load() -> Option<Self> {
        Self::load_first(&get_config_paths())
    }

    fn load_first(paths: &[PathBuf]) -> Option<Self> {
        for path in paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    pub fn palette(&self) -> Vec<Color> {
        match &self.palette {
            Some(colors) if !colors.is_empty() => colors.clone(),
            _ => default_palette(),
        }
    }
}

/// Default point cache location
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("dotmap"))
        .unwrap_or_else(|| PathBuf::from(".dotmap-cache"))
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("dotmap.toml"));
    paths.push(PathBuf::from(".dotmap.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("dotmap").join("config.toml"));
        paths.push(config_dir.join("dotmap.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".dotmap.toml"));
    }

    paths
}
