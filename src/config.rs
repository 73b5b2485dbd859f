//! Configuration module.
//!
//! Handles loading, validating, and merging `quickthumb.toml`. Stock defaults
//! are the base layer; a user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [decode]
//! speed = "fastest"          # "fastest" lets the decoder downscale; "accurate" decodes full size
//! dither = "ordered"         # "none" or "ordered" (only used when quantize = true)
//! quantize = false           # Reduce decoded colors to a fixed palette
//! max_palette_colors = 216   # Palette size when quantizing (2-256)
//!
//! [encode]
//! quality = 75               # JPEG quality (1-100)
//! speed = "fastest"
//!
//! [processing]
//! max_processes = 4          # Max parallel batch workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CodecSettings, DecodeSettings, EncodeSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "quickthumb.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `quickthumb.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbConfig {
    /// Decoder tunables (speed, dithering, palette).
    pub decode: DecodeSettings,
    /// Encoder tunables (quality, speed).
    pub encode: EncodeSettings,
    /// Parallel batch settings.
    pub processing: ProcessingConfig,
}

impl ThumbConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.encode.quality.value()) {
            return Err(ConfigError::Validation(
                "encode.quality must be 1-100".into(),
            ));
        }
        if !(2..=256).contains(&self.decode.max_palette_colors) {
            return Err(ConfigError::Validation(
                "decode.max_palette_colors must be 2-256".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Codec settings for one resize call.
    pub fn codec_settings(&self) -> CodecSettings {
        CodecSettings {
            decode: self.decode,
            encode: self.encode,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ThumbConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ThumbConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ThumbConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in the
/// working directory is used if present, stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<ThumbConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `quickthumb.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# quickthumb configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Decoding
# ---------------------------------------------------------------------------
[decode]
# "fastest" lets the JPEG decoder downscale by 1/2, 1/4 or 1/8 while decoding
# when the thumbnail is much smaller than the source.
# "accurate" always decodes at full resolution.
speed = "fastest"

# Dithering used when quantize = true: "none" or "ordered" (4x4 Bayer).
dither = "ordered"

# Reduce decoded colors to a fixed palette before resampling.
quantize = false

# Palette size when quantizing (2-256). 216 is a 6x6x6 color cube.
max_palette_colors = 216

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encode]
# JPEG quality (1 = worst, 100 = best).
quality = 75

# Encoder speed preference.
speed = "fastest"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `quickthumb batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{Dither, Quality, Speed};
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ThumbConfig::default();
        assert_eq!(config.decode.speed, Speed::Fastest);
        assert_eq!(config.decode.max_palette_colors, 216);
        assert_eq!(config.encode.quality, Quality(75));
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[decode]
quantize = true
dither = "none"
"#;
        let config: ThumbConfig = toml::from_str(toml).unwrap();
        assert!(config.decode.quantize);
        assert_eq!(config.decode.dither, Dither::None);
        // Defaults preserved
        assert_eq!(config.decode.max_palette_colors, 216);
        assert_eq!(config.encode.quality.value(), 75);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ThumbConfig, _> = toml::from_str("[decode]\nfast = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_speed_is_rejected() {
        let result: Result<ThumbConfig, _> = toml::from_str("[decode]\nspeed = \"turbo\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn codec_settings_mirror_config() {
        let mut config = ThumbConfig::default();
        config.encode.quality = Quality::new(40);
        config.decode.speed = Speed::Accurate;
        let settings = config.codec_settings();
        assert_eq!(settings.encode.quality.value(), 40);
        assert_eq!(settings.decode.speed, Speed::Accurate);
    }

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_rejects_quality_out_of_range() {
        let mut config = ThumbConfig::default();
        config.encode.quality = Quality(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.encode.quality = Quality(101);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_tiny_palette() {
        let mut config = ThumbConfig::default();
        config.decode.max_palette_colors = 1;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = ThumbConfig::default();
        config.processing.max_processes = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(10_000),
        };
        assert_eq!(effective_threads(&config), cores);
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // load / merge tests
    // =========================================================================

    #[test]
    fn merge_toml_overrides_nested_keys_only() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn load_raw_config_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let result = load_raw_config(&tmp.path().join("quickthumb.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn load_config_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[encode]\nquality = 90\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.encode.quality.value(), 90);
        assert_eq!(config.decode, DecodeSettings::default());
    }

    #[test]
    fn load_config_explicit_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_validates_merged_result() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[decode]\nmax_palette_colors = 999\n").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ThumbConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ThumbConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[decode]"));
        assert!(content.contains("[encode]"));
        assert!(content.contains("[processing]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.get("decode").is_some());
        assert!(val.get("encode").is_some());
        assert!(val.get("processing").is_some());
    }
}
