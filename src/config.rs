use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

/// Tunables for text acquisition. Every field has a default, so an empty
/// TOML file (or no file at all) yields a working pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Digital yields shorter than this fall through to OCR.
    pub min_digital_chars: usize,
    pub raster_dpi: u32,
    pub raster_width: u32,
    pub raster_height: u32,
    pub tool_timeout_secs: u64,
    pub ocr_language: String,
    /// Clamp for the `rawText` diagnostic excerpt.
    pub raw_text_limit: usize,
    #[serde(rename = "tools")]
    pub bins: ToolBins,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolBins {
    pub pdftoppm: String,
    pub magick: String,
    pub tesseract: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_digital_chars: 50,
            raster_dpi: 200,
            raster_width: 1700,
            raster_height: 2200,
            tool_timeout_secs: 30,
            ocr_language: "eng".to_string(),
            raw_text_limit: 500,
            bins: ToolBins::default(),
        }
    }
}

impl Default for ToolBins {
    fn default() -> Self {
        Self {
            pdftoppm: "pdftoppm".to_string(),
            magick: "convert".to_string(),
            tesseract: "tesseract".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}
