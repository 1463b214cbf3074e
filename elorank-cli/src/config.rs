/// Config file loading and creation for the elorank CLI.
///
/// Config lives at ~/.config/elorank/config.toml.
/// Every field is optional. CLI args override config values.
use elorank_core::{EngineConfig, StabilityCriteria};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ElorankConfig {
    pub k_factor: Option<f64>,
    pub minimum_comparisons: Option<u32>,
    pub default_initial_rating: Option<f64>,
    pub min_rating: Option<f64>,
    pub rating_change_threshold: Option<f64>,
    pub stable_comparisons: Option<usize>,
}

/// Values supplied on the command line. `None` falls through to the config file,
/// then to the library defaults.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct EngineOverrides {
    /// Maximum rating change per comparison
    #[arg(long)]
    pub k_factor: Option<f64>,

    /// Comparisons the least-compared item needs before the run is saturated
    #[arg(long)]
    pub minimum_comparisons: Option<u32>,

    /// Rating for items without an explicit one
    #[arg(long)]
    pub default_rating: Option<f64>,

    /// Rating floor
    #[arg(long)]
    pub min_rating: Option<f64>,

    /// Per-comparison rating change below which an item counts as settled
    #[arg(long)]
    pub rating_change_threshold: Option<f64>,

    /// Trailing comparisons inspected by the stability check
    #[arg(long)]
    pub stable_comparisons: Option<usize>,

    /// Path to config file (default: ~/.config/elorank/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# elorank configuration
# All values here can be overridden by CLI flags.

# Maximum rating change per comparison
# k_factor = 32.0

# Comparisons the least-compared item needs before no further pair is suggested
# minimum_comparisons = 10

# Rating for items added without one
# default_initial_rating = 1500.0

# No rating ever drops below this floor
# min_rating = 100.0

# An item is stable once every rating change over its last
# `stable_comparisons` comparisons is below `rating_change_threshold`
# rating_change_threshold = 10.0
# stable_comparisons = 5
";

/// `$HOME/.config/elorank/config.toml`, or `None` when `HOME` is unset.
pub fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/elorank/config.toml"))
}

/// Read and parse the config at `path`. A missing file yields an empty config.
pub fn load_config(path: &Path) -> Result<ElorankConfig, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ElorankConfig::default());
        }
        Err(e) => return Err(format!("Failed to read config at {}: {e}", path.display())),
    };
    tracing::debug!(path = %path.display(), "loaded config file");
    parse_config(&content).map_err(|e| format!("Failed to parse config at {}: {e}", path.display()))
}

pub fn parse_config(content: &str) -> Result<ElorankConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Merge CLI overrides over file values over library defaults.
pub fn resolve(overrides: &EngineOverrides, file: &ElorankConfig) -> (EngineConfig, StabilityCriteria) {
    let defaults = EngineConfig::default();
    let engine = EngineConfig {
        k_factor: overrides.k_factor.or(file.k_factor).unwrap_or(defaults.k_factor),
        minimum_comparisons: overrides
            .minimum_comparisons
            .or(file.minimum_comparisons)
            .unwrap_or(defaults.minimum_comparisons),
        default_initial_rating: overrides
            .default_rating
            .or(file.default_initial_rating)
            .unwrap_or(defaults.default_initial_rating),
        min_rating: overrides.min_rating.or(file.min_rating).unwrap_or(defaults.min_rating),
    };

    let default_criteria = StabilityCriteria::default();
    let criteria = StabilityCriteria {
        rating_change_threshold: overrides
            .rating_change_threshold
            .or(file.rating_change_threshold)
            .unwrap_or(default_criteria.rating_change_threshold),
        stable_comparisons: overrides
            .stable_comparisons
            .or(file.stable_comparisons)
            .unwrap_or(default_criteria.stable_comparisons),
    };

    (engine, criteria)
}

/// Load the config file named by `overrides` (or the default path) and resolve.
pub fn load_and_resolve(overrides: &EngineOverrides) -> (EngineConfig, StabilityCriteria) {
    let file = match overrides.config.clone().or_else(default_config_path) {
        Some(path) => load_config(&path).unwrap_or_else(|e| bail(e)),
        None => ElorankConfig::default(),
    };
    resolve(overrides, &file)
}

/// Write the commented-out template to `path`, creating parent directories.
/// Refuses to overwrite an existing file.
pub fn write_default_config(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {e}", parent.display()))?;
    }

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => format!("Config file already exists at {}", path.display()),
            _ => format!("Failed to create {}: {e}", path.display()),
        })?;
    file.write_all(DEFAULT_CONFIG_TEMPLATE.as_bytes())
        .map_err(|e| format!("Failed to write config to {}: {e}", path.display()))
}
