use crate::label::DEFAULT_LABEL_LENGTH;
use crate::palette::ThemeMode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Drawing options for the SVG renderer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub theme: ThemeMode,
    /// Category labels longer than this are shortened on axes and legends
    #[serde(default = "default_label_length")]
    pub label_max_length: usize,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_label_length() -> usize { DEFAULT_LABEL_LENGTH }
fn default_available_cap() -> usize { 10 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            theme: ThemeMode::Light,
            label_max_length: DEFAULT_LABEL_LENGTH,
        }
    }
}

/// Options for the data side of the pipeline
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// How many real column names a missing-column diagnostic lists
    #[serde(default = "default_available_cap")]
    pub available_columns_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            available_columns_cap: 10,
        }
    }
}

/// Configuration file contents: `{"render": {...}, "engine": {...}}`, both optional
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }
}
