//! Site configuration module.
//!
//! Handles loading and validating the optional `site.toml` at the project
//! root. Every key has a default matching the conventional layout, so a
//! project without a `site.toml` builds exactly like one with the stock file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Blog"             # Home page title, suffix of every page title
//!
//! [paths]
//! posts = "posts"            # Markdown documents and colocated media
//! styles = "styles"          # main.scss and its imports
//! templates = "templates"    # layout.html and parts/
//! static = "static"          # Copied verbatim into the output
//! output = "build"           # Generated site
//!
//! [highlight]
//! theme = "base16-ocean.dark"  # Any theme from syntect's default set
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site-wide presentation settings.
    pub site: SiteInfo,
    /// Input and output directories, relative to the project root.
    pub paths: PathsConfig,
    /// Code block highlighting settings.
    pub highlight: HighlightConfig,
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("paths.posts", &self.paths.posts),
            ("paths.styles", &self.paths.styles),
            ("paths.templates", &self.paths.templates),
            ("paths.static", &self.paths.static_dir),
            ("paths.output", &self.paths.output),
        ];
        for (key, value) in named {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if Path::new(&self.paths.output) == Path::new(&self.paths.posts) {
            return Err(ConfigError::Validation(
                "paths.output must differ from paths.posts".into(),
            ));
        }
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation("site.title must not be empty".into()));
        }
        if self.highlight.theme.trim().is_empty() {
            return Err(ConfigError::Validation(
                "highlight.theme must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Resolve every configured directory against the project root.
    pub fn resolve(&self, root: &Path) -> SitePaths {
        SitePaths {
            posts: root.join(&self.paths.posts),
            styles: root.join(&self.paths.styles),
            templates: root.join(&self.paths.templates),
            static_dir: root.join(&self.paths.static_dir),
            output: root.join(&self.paths.output),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
        }
    }
}

/// Directory layout, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub posts: String,
    pub styles: String,
    pub templates: String,
    #[serde(rename = "static")]
    pub static_dir: String,
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            posts: "posts".to_string(),
            styles: "styles".to_string(),
            templates: "templates".to_string(),
            static_dir: "static".to_string(),
            output: "build".to_string(),
        }
    }
}

/// Code highlighting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    /// Name of a theme in syntect's default theme set.
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Absolute (root-joined) directories the build reads from and writes to.
#[derive(Debug, Clone, PartialEq)]
pub struct SitePaths {
    pub posts: PathBuf,
    pub styles: PathBuf,
    pub templates: PathBuf,
    pub static_dir: PathBuf,
    pub output: PathBuf,
}

impl SitePaths {
    /// Destination root for materialized media.
    pub fn medias(&self) -> PathBuf {
        self.output.join("medias")
    }
}

/// Load config from `site.toml` in the given directory.
///
/// Missing file means stock defaults. Sparse files are filled in from
/// defaults by serde, unknown keys are rejected, and the result is validated.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `site.toml`.
pub fn stock_config_toml() -> &'static str {
    r##"# inkpost configuration
# All settings are optional. Values shown below are the defaults.
# Unknown keys cause an error.

[site]
# Title of the home page. Post and tag pages use "<page> | <title>".
title = "Blog"

[paths]
# Markdown documents (*.md) and their colocated media files.
posts = "posts"
# Stylesheet sources. The build compiles main.scss and its imports.
styles = "styles"
# layout.html plus parts/header.html, parts/index.html, parts/tag.html.
templates = "templates"
# Copied verbatim into the output directory.
static = "static"
# Where the generated site is written.
output = "build"

[highlight]
# Theme used for code blocks. One of syntect's bundled themes, e.g.
# "base16-ocean.dark", "base16-eighties.dark", "InspiredGitHub",
# "Solarized (dark)", "Solarized (light)".
theme = "base16-ocean.dark"
"##
}
