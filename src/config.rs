//! Plugin configuration.
//!
//! Loaded from `lightgallery.toml` in the config directory. Every key is
//! optional: user values are merged over the stock defaults, unknown keys are
//! rejected to catch typos early, and the merged result is validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # Category slug that enables the stirile-zilei gallery
//! target_category = "stirile-zilei"
//!
//! [assets]
//! base_url = "/wp-content/plugins/wp-lightgallery/"  # Public URL of the asset root
//! dir = "assets"                                     # Asset root on disk (relative to the config dir)
//! fallback_version = "1"                             # ?ver= token when a file is missing
//!
//! [style]
//! backdrop = "rgba(30,30,30,.9)"                     # Gallery backdrop color
//!
//! [site]
//! title = "Blog"                                     # Used by the static host
//! lang = "ro"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file inside the config directory.
pub const CONFIG_FILENAME: &str = "lightgallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginConfig {
    /// Category slug whose posts get the stirile-zilei gallery.
    pub target_category: String,
    pub assets: AssetsConfig,
    pub style: StyleConfig,
    pub site: SiteConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            target_category: "stirile-zilei".to_string(),
            assets: AssetsConfig::default(),
            style: StyleConfig::default(),
            site: SiteConfig::default(),
        }
    }
}

impl PluginConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_category.trim().is_empty() {
            return Err(ConfigError::Validation(
                "target_category must not be empty".into(),
            ));
        }
        if !self.assets.base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "assets.base_url must end with '/'".into(),
            ));
        }
        if self.assets.fallback_version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "assets.fallback_version must not be empty".into(),
            ));
        }
        if self.style.backdrop.is_empty()
            || self.style.backdrop.contains(['{', '}', ';', '<', '>'])
        {
            return Err(ConfigError::Validation(
                "style.backdrop must be a single CSS color value".into(),
            ));
        }
        Ok(())
    }
}

/// Where the lightGallery distribution lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Public URL of the asset root, with a trailing slash.
    pub base_url: String,
    /// Asset root on disk, relative to the config directory.
    pub dir: String,
    /// Version token used when an asset file is missing.
    pub fallback_version: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base_url: "/wp-content/plugins/wp-lightgallery/".to_string(),
            dir: "assets".to_string(),
            fallback_version: "1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Background of the open gallery overlay (any CSS color).
    pub backdrop: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            backdrop: "rgba(30,30,30,.9)".to_string(),
        }
    }
}

/// Settings for the bundled static host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub title: String,
    pub lang: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            lang: "ro".to_string(),
        }
    }
}

// =============================================================================
// Loading and merging
// =============================================================================

/// Stock defaults as a TOML table, the base layer for user overrides.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PluginConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
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

/// Load `lightgallery.toml` from `dir`. `Ok(None)` if there is none.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Load, merge over defaults, and validate.
pub fn load_config(dir: &Path) -> Result<PluginConfig, ConfigError> {
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(stock_defaults_value()?, overlay),
        None => stock_defaults_value()?,
    };
    let config: PluginConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Cosmetic CSS attached inline to the gallery stylesheet.
pub fn inline_style(style: &StyleConfig) -> String {
    format!(
        ".lg-backdrop{{background-color:{};}} .lg-sub-html {{padding: 0}}",
        style.backdrop
    )
}

/// Fully commented stock config, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# lightgallery-imagebox configuration
# ===================================
#
# Every key is optional; anything left out keeps the value shown here.
# Unknown keys are rejected.

# Posts in this category get the stirile-zilei gallery for links to
# https://drscdn.500px.org/photo/...
target_category = "stirile-zilei"

[assets]
# Public URL the lightGallery distribution is served from. Must end with "/".
base_url = "/wp-content/plugins/wp-lightgallery/"
# Location of the distribution on disk, relative to this file. File
# modification times become the ?ver= cache-busting tokens.
dir = "assets"
# Token used for any file that does not exist.
fallback_version = "1"

[style]
# Background of the gallery overlay.
backdrop = "rgba(30,30,30,.9)"

[site]
# Used by the bundled static host (`build`).
title = "Blog"
lang = "ro"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.target_category, "stirile-zilei");
        assert_eq!(config.assets.base_url, "/wp-content/plugins/wp-lightgallery/");
        assert_eq!(config.assets.fallback_version, "1");
        assert_eq!(config.style.backdrop, "rgba(30,30,30,.9)");
        config.validate().unwrap();
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.target_category, "stirile-zilei");
    }

    #[test]
    fn load_config_merges_partial_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
target_category = "photo-of-the-day"

[assets]
base_url = "https://cdn.example.ro/lg/"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.target_category, "photo-of-the-day");
        assert_eq!(config.assets.base_url, "https://cdn.example.ro/lg/");
        // untouched keys keep their defaults
        assert_eq!(config.assets.dir, "assets");
        assert_eq!(config.style.backdrop, "rgba(30,30,30,.9)");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "not = [valid").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[assets]\nbase_ur = \"/x/\"\n",
        )
        .unwrap();
        let err = load_config(tmp.path()).unwrap_err().to_string();
        assert!(err.contains("unknown field"), "{err}");
    }

    #[test]
    fn base_url_needs_trailing_slash() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[assets]\nbase_url = \"/lg\"\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn backdrop_cannot_break_out_of_rule() {
        let mut config = PluginConfig::default();
        config.style.backdrop = "red;} body{display:none".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn inline_style_uses_backdrop() {
        assert_eq!(
            inline_style(&StyleConfig::default()),
            ".lg-backdrop{background-color:rgba(30,30,30,.9);} .lg-sub-html {padding: 0}"
        );
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: PluginConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = PluginConfig::default();
        assert_eq!(config.target_category, defaults.target_category);
        assert_eq!(config.assets.base_url, defaults.assets.base_url);
        assert_eq!(config.assets.dir, defaults.assets.dir);
        assert_eq!(config.style.backdrop, defaults.style.backdrop);
        assert_eq!(config.site.title, defaults.site.title);
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str("[a.b]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a.b]\nx = 10\n").unwrap();
        let merged = merge_toml(base, overlay);
        let b = merged.get("a").unwrap().get("b").unwrap();
        assert_eq!(b.get("x").unwrap().as_integer(), Some(10));
        assert_eq!(b.get("y").unwrap().as_integer(), Some(2));
    }
}
