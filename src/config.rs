use crate::error::{Error, Result};
use crate::parser::DocstringStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "pydoc-md.toml";

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub render: RenderConfig,
    pub run: RunConfig,
}

/// Source discovery settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Glob patterns, relative to the source root, of files to skip
    pub exclude: Vec<String>,
}

/// Rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub docstring_style: DocstringStyle,
    /// Text placed in the Default column of parameters without a default
    pub required_marker: String,
    /// Directory of `*.tera` files overriding the embedded templates
    pub templates_dir: Option<PathBuf>,
}

/// Execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub parallel: bool,
    pub progress: bool,
    pub log_level: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            docstring_style: DocstringStyle::default(),
            required_marker: "*is required*".to_string(),
            templates_dir: None,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            progress: false,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file if it exists, defaults otherwise.
    ///
    /// Unlike a missing file, a file that fails to parse or validate is an error.
    pub fn load_if_present(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.render.required_marker.trim().is_empty() {
            return Err(Error::config_validation("required_marker must not be empty"));
        }

        let level = self.run.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::config_validation(format!(
                "unknown log_level '{}', expected one of {}",
                self.run.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        for pattern in &self.source.exclude {
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }

    /// Compiled exclusion patterns
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.source
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p).map_err(Error::from))
            .collect()
    }
}
