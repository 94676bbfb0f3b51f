// src/acquire.rs

use crate::config::PipelineConfig;
use crate::ocr::OcrAdapter;
use crate::pdf_extract::{DigitalText, PdfContent};
use crate::raster::RasterChain;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Where the acquired text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    Digital,
    Ocr,
    Empty,
}

#[derive(Debug, Clone)]
pub struct AcquiredText {
    /// Lower-cased document text.
    pub text: String,
    pub source: TextSource,
}

/// Produces OCR text for page one of a PDF, "" on any failure.
#[async_trait]
pub trait PageOcr: Send + Sync {
    async fn ocr_first_page(&self, pdf: &Path) -> String;
}

/// Rasterize, recognize, clean up.
pub struct OcrRoute {
    rasterizers: RasterChain,
    engine: OcrAdapter,
}

impl OcrRoute {
    pub fn new(rasterizers: RasterChain, engine: OcrAdapter) -> Self {
        Self {
            rasterizers,
            engine,
        }
    }

    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(RasterChain::from_config(cfg), OcrAdapter::from_config(cfg))
    }
}

#[async_trait]
impl PageOcr for OcrRoute {
    async fn ocr_first_page(&self, pdf: &Path) -> String {
        let Some(image) = self.rasterizers.rasterize_first_page(pdf).await else {
            return String::new();
        };
        // `image` removes its temp dir when it goes out of scope, on every path.
        self.engine.recognize(image.path()).await
    }
}

/// Hybrid acquisition: digital text layer first, OCR when the yield is short.
pub async fn acquire(
    pdf: &Path,
    digital: &dyn DigitalText,
    ocr: &dyn PageOcr,
    min_digital_chars: usize,
) -> AcquiredText {
    let content = digital.extract(pdf);
    if let PdfContent::Error(e) = &content {
        warn!(pdf = %pdf.display(), error = %e, "Digital extraction failed — treating as empty");
    }
    let digital_text = content.into_text();
    let digital_len = meaningful_chars(&digital_text);

    if digital_len >= min_digital_chars {
        info!(chars = digital_len, "Using digital text layer");
        return finish(digital_text, TextSource::Digital);
    }

    info!(
        chars = digital_len,
        threshold = min_digital_chars,
        "Digital yield below threshold — running OCR"
    );
    let ocr_text = ocr.ocr_first_page(pdf).await;
    let ocr_len = meaningful_chars(&ocr_text);

    if ocr_len > digital_len {
        info!(ocr_chars = ocr_len, digital_chars = digital_len, "Keeping OCR text");
        finish(ocr_text, TextSource::Ocr)
    } else {
        info!(ocr_chars = ocr_len, digital_chars = digital_len, "Keeping digital text");
        finish(digital_text, TextSource::Digital)
    }
}

/// Yield size ignoring whitespace; text layers are often padded with blank lines.
fn meaningful_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

fn finish(text: String, source: TextSource) -> AcquiredText {
    let text = text.trim().to_lowercase();
    let source = if text.is_empty() { TextSource::Empty } else { source };
    AcquiredText { text, source }
}
