use anyhow::{anyhow, Context, Result};
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::rendering::{OutputFormat, RenderOptions};

/// Application configuration module
/// This module handles loading and validating the viewer settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// How segments are presented
    #[serde(default)]
    pub display: DisplayConfig,

    /// Which files a folder index picks up
    #[serde(default)]
    pub index: IndexConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Presentation settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Output format for rendered documents
    #[serde(default)]
    pub format: OutputFormat,

    /// Show the source column
    #[serde(default = "default_true")]
    pub show_source: bool,

    /// Show the translation column
    #[serde(default = "default_true")]
    pub show_translation: bool,

    /// Text shown in place of an empty source passage
    #[serde(default = "default_empty_source_placeholder")]
    pub empty_source_placeholder: String,

    /// Text shown when no translation note was matched
    #[serde(default = "default_missing_translation_placeholder")]
    pub missing_translation_placeholder: String,

    /// Segments rendered per batch before yielding
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            show_source: true,
            show_translation: true,
            empty_source_placeholder: default_empty_source_placeholder(),
            missing_translation_placeholder: default_missing_translation_placeholder(),
            batch_size: default_batch_size(),
        }
    }
}

impl DisplayConfig {
    // @returns: Renderer options mirroring these settings
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_source: self.show_source,
            show_translation: self.show_translation,
            empty_source_placeholder: self.empty_source_placeholder.clone(),
            missing_translation_placeholder: self.missing_translation_placeholder.clone(),
            batch_size: self.batch_size,
        }
    }
}

/// Folder indexing settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IndexConfig {
    /// File extensions to index, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Follow symbolic links while walking folders
    #[serde(default = "default_true")]
    pub follow_links: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            follow_links: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    80
}

fn default_empty_source_placeholder() -> String {
    "(empty)".to_string()
}

fn default_missing_translation_placeholder() -> String {
    "(no translation note found)".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["xml".to_string()]
}

impl Config {
    /// Load the configuration at `path`, or the defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let config: Config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.display.batch_size == 0 {
            return Err(anyhow!("display.batch_size must be greater than zero"));
        }

        if self.display.empty_source_placeholder.trim().is_empty()
            || self.display.missing_translation_placeholder.trim().is_empty()
        {
            return Err(anyhow!("display placeholders must not be empty"));
        }

        if self.index.extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
            return Err(anyhow!("index.extensions must contain at least one extension"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            display: DisplayConfig::default(),
            index: IndexConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
