//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files. Stock
//! defaults are overridden by the user's `config.toml`, which is in turn
//! overridden by an optional per-environment file:
//!
//! ```text
//! config/
//! ├── config.toml              # Base config (overrides stock defaults)
//! ├── config.development.toml  # Used with --env development (the default)
//! └── config.production.toml   # Used with --env production
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [feed]
//! margin_horizontal = 5.0        # Post margin on each side of the window
//! default_avatar = "channel-default.png"
//! copied_toast = "Copied to clipboard"
//!
//! [images]
//! border_width = 2.0             # Thumbnail border (pair and strip layouts)
//! border_radius = 10.0
//! border_color = "white"
//!
//! [songbook]
//! cover_delay_ms = 1000          # How long the cover shows on first open
//! capo_prefix = "📢: "
//!
//! [logging]
//! level = "info"                 # trace | debug | info | warn | error | off
//! format = "compact"             # compact | json
//! ```
//!
//! ## Partial Configuration
//!
//! Each file only needs the keys it wants to change:
//!
//! ```toml
//! [songbook]
//! cover_delay_ms = 1500
//! ```
//!
//! Unknown keys are rejected so typos surface immediately.

use crate::layout::BorderStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Feed post presentation.
    pub feed: FeedConfig,
    /// Thumbnail border treatment.
    pub images: ImagesConfig,
    /// Songbook cover and table of contents.
    pub songbook: SongbookConfig,
    /// Diagnostic logging.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.feed.margin_horizontal.is_finite() || self.feed.margin_horizontal < 0.0 {
            return Err(ConfigError::Validation(
                "feed.margin_horizontal must be a non-negative number".into(),
            ));
        }
        if self.images.border_width < 0.0 || self.images.border_radius < 0.0 {
            return Err(ConfigError::Validation(
                "images.border_width and images.border_radius must be non-negative".into(),
            ));
        }
        if self.songbook.cover_delay_ms == 0 {
            return Err(ConfigError::Validation(
                "songbook.cover_delay_ms must be greater than zero".into(),
            ));
        }
        if self.logging.level.parse::<LevelFilter>().is_err() {
            return Err(ConfigError::Validation(format!(
                "logging.level '{}' is not a log level",
                self.logging.level
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Horizontal margin on each side of a post.
    pub margin_horizontal: f64,
    /// Avatar shown for channels without one.
    pub default_avatar: String,
    /// Toast text after copying a post's text.
    pub copied_toast: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            margin_horizontal: 5.0,
            default_avatar: "channel-default.png".to_string(),
            copied_toast: "Copied to clipboard".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    pub border_width: f64,
    pub border_radius: f64,
    pub border_color: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        let border = BorderStyle::default();
        Self {
            border_width: border.width,
            border_radius: border.radius,
            border_color: border.color,
        }
    }
}

impl ImagesConfig {
    pub fn border(&self) -> BorderStyle {
        BorderStyle {
            width: self.border_width,
            radius: self.border_radius,
            color: self.border_color.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SongbookConfig {
    /// Milliseconds the cover stays up the first time the songbook opens.
    pub cover_delay_ms: u64,
    /// Prefix for a song's capo signal in table-of-contents rows.
    pub capo_prefix: String,
}

impl Default for SongbookConfig {
    fn default() -> Self {
        Self {
            cover_delay_ms: 1000,
            capo_prefix: "📢: ".to_string(),
        }
    }
}

impl SongbookConfig {
    pub fn cover_delay(&self) -> Duration {
        Duration::from_millis(self.cover_delay_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level; `RUST_LOG` overrides it.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
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

/// Load a TOML file as a raw value.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `dir`: stock defaults, then `config.toml`, then
/// `config.<env>.toml` when an environment is given.
pub fn load_config(dir: &Path, env: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut overlays = Vec::new();
    if let Some(base) = load_raw_config(&dir.join("config.toml"))? {
        overlays.push(base);
    }
    if let Some(env) = env
        && let Some(env_overlay) = load_raw_config(&dir.join(format!("config.{env}.toml")))?
    {
        overlays.push(env_overlay);
    }
    resolve_config(stock_defaults_value(), overlays)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Chantbook Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Files are merged in order, later ones winning:
#   config.toml          -> base (overrides stock defaults)
#   config.<env>.toml    -> per environment (--env, default "development")
#
# Each file only needs the keys it wants to override.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Feed posts
# ---------------------------------------------------------------------------
[feed]
# Horizontal margin on each side of a post. Image layouts use the window
# width minus both margins.
margin_horizontal = 5.0

# Avatar shown for channels that have none.
default_avatar = "channel-default.png"

# Toast shown after long-pressing a post to copy its text.
copied_toast = "Copied to clipboard"

# ---------------------------------------------------------------------------
# Image thumbnails (posts with two or more images)
# ---------------------------------------------------------------------------
[images]
border_width = 2.0
border_radius = 10.0
border_color = "white"

# ---------------------------------------------------------------------------
# Songbook
# ---------------------------------------------------------------------------
[songbook]
# Milliseconds the cover stays up the first time the songbook is opened.
cover_delay_ms = 1000

# Prefix shown before a song's capo signal in the table of contents.
capo_prefix = "📢: "

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# trace | debug | info | warn | error | off. RUST_LOG overrides this.
level = "info"

# compact | json
format = "compact"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // Defaults and parsing
    // =========================================================================

    #[test]
    fn default_config_is_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn stock_toml_matches_defaults() {
        let parsed: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(parsed.feed.margin_horizontal, defaults.feed.margin_horizontal);
        assert_eq!(parsed.images.border(), defaults.images.border());
        assert_eq!(
            parsed.songbook.cover_delay_ms,
            defaults.songbook.cover_delay_ms
        );
        assert_eq!(parsed.songbook.capo_prefix, defaults.songbook.capo_prefix);
        assert_eq!(parsed.logging.format, LogFormat::Compact);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[songbook]
cover_delay_ms = 1500
"#,
        )
        .unwrap();
        assert_eq!(config.songbook.cover_delay(), Duration::from_millis(1500));
        assert_eq!(config.songbook.capo_prefix, "📢: ");
        assert_eq!(config.feed.margin_horizontal, 5.0);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
[images]
border_wdith = 3.0
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn images_config_builds_border_style() {
        let config = ImagesConfig {
            border_width: 1.0,
            border_radius: 4.0,
            border_color: "#eee".into(),
        };
        assert_eq!(
            config.border(),
            BorderStyle {
                width: 1.0,
                radius: 4.0,
                color: "#eee".into()
            }
        );
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn zero_cover_delay_is_invalid() {
        let mut config = AppConfig::default();
        config.songbook.cover_delay_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn negative_margin_is_invalid() {
        let mut config = AppConfig::default();
        config.feed.margin_horizontal = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn unknown_log_level_is_invalid() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_overrides_leaf_and_keeps_siblings() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn merge_adds_new_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1").unwrap();
        let overlay: toml::Value = toml::from_str("[b]\nz = 9").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["b"]["z"].as_integer(), Some(9));
    }

    // =========================================================================
    // load_config
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.songbook.cover_delay_ms, 1000);
    }

    #[test]
    fn load_config_reads_base_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[images]\nborder_color = \"#ddd\"\n",
        )
        .unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.images.border_color, "#ddd");
        assert_eq!(config.images.border_radius, 10.0);
    }

    #[test]
    fn env_overlay_wins_over_base() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("config.production.toml"),
            "[logging]\nlevel = \"warn\"\nformat = \"json\"\n",
        )
        .unwrap();

        let prod = load_config(tmp.path(), Some("production")).unwrap();
        assert_eq!(prod.logging.level, "warn");
        assert_eq!(prod.logging.format, LogFormat::Json);

        let dev = load_config(tmp.path(), Some("development")).unwrap();
        assert_eq!(dev.logging.level, "debug");
        assert_eq!(dev.logging.format, LogFormat::Compact);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[feed\n").unwrap();
        assert!(matches!(
            load_config(tmp.path(), None),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn invalid_values_fail_validation_on_load() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[songbook]\ncover_delay_ms = 0\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path(), None),
            Err(ConfigError::Validation(_))
        ));
    }
}
