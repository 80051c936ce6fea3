//! Configuration module.
//!
//! Handles loading and validating `picbatch.toml`. The file persists the
//! operator's preferred encoding policy between runs; CLI flags override
//! file values, and the merged policy is validated before a run starts.
//!
//! ## Config File Location
//!
//! `picbatch.toml` is looked up in the current working directory (or the
//! directory passed to [`load_config`]).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [policy]
//! max_width = 1024      # Downscale wider images to this width
//! min_quality = 85      # Quality floor (1-100) for quality-priority runs
//! max_size_kb = 300     # Size ceiling for size-priority runs
//! mode = "quality"      # "quality" or "size"
//! format = "jpeg"       # jpeg | png | webp | avif | tiff | bmp | keep
//!
//! [run]
//! clear_dest = true     # Empty the destination folder before each run
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [policy]
//! mode = "size"
//! max_size_kb = 500
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::format::OutputFormat;
use crate::policy::{EncodingPolicy, PolicyMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "picbatch.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `picbatch.toml`.
///
/// All fields have defaults matching the original tool's stock settings.
/// User config files need only specify the values they want to override.
/// Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Persisted encoding policy defaults.
    pub policy: PolicySection,
    /// Per-run behavior.
    pub run: RunSection,
}

/// The `[policy]` section — one field per CLI flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySection {
    /// Downscale wider images to this width.
    pub max_width: u32,
    /// Quality floor (1-100) for quality-priority runs.
    pub min_quality: u32,
    /// Size ceiling in KB for size-priority runs.
    pub max_size_kb: u32,
    /// Which constraint wins: `"quality"` or `"size"`.
    pub mode: PolicyMode,
    /// Output format, or `"keep"` to re-encode in each file's own format.
    pub format: OutputFormat,
}

impl Default for PolicySection {
    fn default() -> Self {
        let stock = EncodingPolicy::default();
        Self {
            max_width: stock.max_width,
            min_quality: stock.min_quality,
            max_size_kb: stock.max_size_kb,
            mode: stock.mode,
            format: stock.output_format,
        }
    }
}

/// The `[run]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// Empty the destination folder (top-level files only) before each run.
    pub clear_dest: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self { clear_dest: true }
    }
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_policy()
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    /// The config's policy section as a run-ready [`EncodingPolicy`].
    pub fn to_policy(&self) -> EncodingPolicy {
        EncodingPolicy {
            max_width: self.policy.max_width,
            min_quality: self.policy.min_quality,
            max_size_kb: self.policy.max_size_kb,
            mode: self.policy.mode,
            output_format: self.policy.format,
        }
    }
}

/// Load config from `picbatch.toml` in the given directory.
///
/// A missing file yields the stock defaults; a present file is parsed with
/// unknown keys rejected, then validated.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let config: AppConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `picbatch.toml` with all keys and
/// explanations. Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# picbatch configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. CLI flags override file values.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Encoding policy
# ---------------------------------------------------------------------------
[policy]
# Downscale wider images to this width (pixels). Narrower images are left
# at their original size.
max_width = 1024

# Quality floor (1-100) used by quality-priority runs.
# For images with text, 85 or higher is recommended (JPEG and WebP alike).
min_quality = 85

# File-size ceiling in KB used by size-priority runs and the copy fast-path.
max_size_kb = 300

# Which constraint wins for lossy formats:
#   "quality" - encode once at min_quality, size is whatever results
#   "size"    - search for the highest quality under max_size_kb
mode = "quality"

# Output format: jpeg | png | webp | avif | tiff | bmp | keep
# "keep" re-encodes each file in its own source format.
format = "jpeg"

# ---------------------------------------------------------------------------
# Run behavior
# ---------------------------------------------------------------------------
[run]
# Empty the destination folder (top-level files only) before each run.
clear_dest = true
"##
}
