//! Generator settings.
//!
//! Handles loading, validating, and merging the optional `generator.toml` in
//! the content root. These are the knobs of the generator itself (directory
//! names, highlighting theme, manpage converter), not site content: languages
//! and pages live in the JSON documents loaded by [`crate::structure`].
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! output_dir = "output"            # Where the site is written
//!
//! [site]
//! title = "Website"                # Suffix of every <title>
//! stylesheets = ["/static/style.css"]  # Linked from every page
//!
//! [paths]
//! static_dir = "static"            # Copied to <output>/static
//! downloads_dir = "downloads"      # Copied to <output>/downloads
//! favicon = "favicon.ico"          # Symlinked from <output>/favicon.ico
//! highlight_css = "highlight.css"  # Generated inside <output>/static
//!
//! [highlight]
//! theme = "InspiredGitHub"         # Any syntect default theme
//!
//! [manpages]
//! command = ["man2html", "-r"]     # The manpage file path is appended
//!
//! [downloads]
//! signature_suffix = ".asc"        # Detached signatures next to downloads
//! ```
//!
//! ## Partial Configuration
//!
//! The file is sparse. Override just the values you want:
//!
//! ```toml
//! [highlight]
//! theme = "base16-ocean.light"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the settings file looked up in the content root.
pub const CONFIG_FILE: &str = "generator.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator settings loaded from `generator.toml`.
///
/// All fields have defaults matching the conventional layout, so a content
/// root without the file builds exactly as before.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Output directory, relative to the working directory.
    pub output_dir: String,
    pub site: SiteSettings,
    pub paths: PathsConfig,
    pub highlight: HighlightConfig,
    pub manpages: ManpagesConfig,
    pub downloads: DownloadsConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            site: SiteSettings::default(),
            paths: PathsConfig::default(),
            highlight: HighlightConfig::default(),
            manpages: ManpagesConfig::default(),
            downloads: DownloadsConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        for (key, value) in [
            ("paths.static_dir", &self.paths.static_dir),
            ("paths.downloads_dir", &self.paths.downloads_dir),
            ("paths.favicon", &self.paths.favicon),
            ("paths.highlight_css", &self.paths.highlight_css),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.manpages.command.is_empty() || self.manpages.command[0].trim().is_empty() {
            return Err(ConfigError::Validation(
                "manpages.command must name a program".into(),
            ));
        }
        let suffix = &self.downloads.signature_suffix;
        if !suffix.starts_with('.') || suffix.len() < 2 {
            return Err(ConfigError::Validation(
                "downloads.signature_suffix must look like \".asc\"".into(),
            ));
        }
        Ok(())
    }
}

/// Site-wide presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSettings {
    /// Appended to every page title: `"<page> - <title>"`.
    pub title: String,
    /// Stylesheet URLs linked from every page, before the highlighting one.
    pub stylesheets: Vec<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "Website".to_string(),
            stylesheets: vec!["/static/style.css".to_string()],
        }
    }
}

/// Asset locations, relative to the content root (source) and output root
/// (destination). Both sides use the same names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub static_dir: String,
    pub downloads_dir: String,
    /// File inside `static_dir` linked from the output root.
    pub favicon: String,
    /// Generated highlighting stylesheet, written inside `static_dir`.
    pub highlight_css: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            static_dir: "static".to_string(),
            downloads_dir: "downloads".to_string(),
            favicon: "favicon.ico".to_string(),
            highlight_css: "highlight.css".to_string(),
        }
    }
}

impl PathsConfig {
    /// Public URL of the generated highlighting stylesheet.
    pub fn highlight_css_url(&self) -> String {
        format!("/{}/{}", self.static_dir, self.highlight_css)
    }
}

/// Syntax highlighting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    /// Name of a theme from syntect's default theme set.
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "InspiredGitHub".to_string(),
        }
    }
}

/// External manpage converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManpagesConfig {
    /// Program and leading arguments. The manpage path is appended and the
    /// HTML document is read from stdout.
    pub command: Vec<String>,
}

impl Default for ManpagesConfig {
    fn default() -> Self {
        Self {
            command: vec!["man2html".to_string(), "-r".to_string()],
        }
    }
}

/// Download table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadsConfig {
    /// Suffix of detached signature files. Such files never get their own row.
    pub signature_suffix: String,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            signature_suffix: ".asc".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GeneratorConfig::default()).expect("default config must serialize")
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

/// Load `generator.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GeneratorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GeneratorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load generator settings from the content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<GeneratorConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `generator.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Site Generator Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Site content is not configured here: languages live in config.json,
# pages in structure.json and per-language overrides in structure.<code>.json.
#
# Unknown keys will cause an error.

# Output directory. Wiped and rebuilt from scratch on every build.
output_dir = "output"

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Appended to every page title ("Downloads - Website").
title = "Website"

# Stylesheets linked from every page. The generated highlighting stylesheet
# is always linked after these.
stylesheets = ["/static/style.css"]

# ---------------------------------------------------------------------------
# Asset paths
# ---------------------------------------------------------------------------
[paths]
# Static assets, copied verbatim to <output>/<static_dir>.
static_dir = "static"

# Release files, copied verbatim to <output>/<downloads_dir>.
downloads_dir = "downloads"

# File inside static_dir that <output>/<favicon> links to.
favicon = "favicon.ico"

# Syntax highlighting stylesheet, generated inside <output>/<static_dir>.
highlight_css = "highlight.css"

# ---------------------------------------------------------------------------
# Syntax highlighting
# ---------------------------------------------------------------------------
[highlight]
# One of syntect's bundled themes: "InspiredGitHub", "Solarized (light)",
# "Solarized (dark)", "base16-ocean.dark", "base16-ocean.light",
# "base16-eighties.dark", "base16-mocha.dark".
theme = "InspiredGitHub"

# ---------------------------------------------------------------------------
# Manpages
# ---------------------------------------------------------------------------
[manpages]
# Converter invoked once per manpage. The manpage path is appended as the
# last argument; an HTML document is expected on stdout.
command = ["man2html", "-r"]

# ---------------------------------------------------------------------------
# Downloads
# ---------------------------------------------------------------------------
[downloads]
# Detached signatures ("foo.tar.gz.asc") are attached to the file they sign.
signature_suffix = ".asc"
"##
}
