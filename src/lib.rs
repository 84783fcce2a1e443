// Library exports for gphviz

pub mod backend;
pub mod canvas;
pub mod graph;
pub mod layout;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod scene;
pub mod tier;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    /// Infer the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            "" => Err(anyhow!(
                "Output path {} has no extension (expected .png or .svg)",
                path.display()
            )),
            other => Err(anyhow!("Unsupported output format '.{}'", other)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Crop raster output to the drawn content
    #[serde(default = "default_tight")]
    pub tight: bool,
    #[serde(default = "default_title_size")]
    pub title_size: f64,
}

fn default_dpi() -> u32 { 150 }
fn default_tight() -> bool { true }
fn default_title_size() -> f64 { 20.0 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: 150,
            tight: true,
            title_size: 20.0,
        }
    }
}
