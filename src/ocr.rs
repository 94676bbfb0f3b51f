// src/ocr.rs

use crate::config::PipelineConfig;
use crate::tools::{ToolError, run_with_timeout};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Recognizes text in a raster image.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    async fn recognize(&self, image: &Path) -> Result<String, ToolError>;
}

/// Builds the (expensive) recognition engine. Called at most once per
/// successful [`OcrAdapter`] initialization.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn build(&self) -> Result<Box<dyn RecognitionEngine>, ToolError>;
}

/// Progress callback, invoked with a percentage at fixed milestones.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Tesseract via its command-line front end.
pub struct TesseractCli {
    bin: String,
    language: String,
    timeout: Duration,
}

#[async_trait]
impl RecognitionEngine for TesseractCli {
    async fn recognize(&self, image: &Path) -> Result<String, ToolError> {
        let mut cmd = Command::new(&self.bin);
        cmd.arg(image).arg("stdout").arg("-l").arg(&self.language);
        let output = run_with_timeout(&self.bin, &mut cmd, self.timeout).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Probes the tesseract binary once, then hands out a [`TesseractCli`].
pub struct TesseractFactory {
    bin: String,
    language: String,
    timeout: Duration,
}

impl TesseractFactory {
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self {
            bin: cfg.bins.tesseract.clone(),
            language: cfg.ocr_language.clone(),
            timeout: cfg.tool_timeout(),
        }
    }
}

#[async_trait]
impl EngineFactory for TesseractFactory {
    async fn build(&self) -> Result<Box<dyn RecognitionEngine>, ToolError> {
        let mut probe = Command::new(&self.bin);
        probe.arg("--version");
        let output = run_with_timeout(&self.bin, &mut probe, self.timeout).await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let source = if stdout.trim().is_empty() { stderr } else { stdout };
        let version = source.lines().next().map(str::trim).unwrap_or("unknown");
        info!(bin = %self.bin, version = %version, lang = %self.language, "OCR engine ready");

        Ok(Box::new(TesseractCli {
            bin: self.bin.clone(),
            language: self.language.clone(),
            timeout: self.timeout,
        }))
    }
}

/// Initialize-once handle around a recognition engine.
///
/// Concurrent first callers race on `OnceCell::get_or_try_init`, which runs
/// the factory at most once; a failed build is not cached.
pub struct OcrAdapter {
    factory: Box<dyn EngineFactory>,
    engine: OnceCell<Box<dyn RecognitionEngine>>,
    progress: Option<ProgressFn>,
}

impl OcrAdapter {
    pub fn new(factory: Box<dyn EngineFactory>) -> Self {
        Self {
            factory,
            engine: OnceCell::new(),
            progress: None,
        }
    }

    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(Box::new(TesseractFactory::from_config(cfg)))
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    fn report(&self, pct: u8) {
        debug!(progress = pct, "OCR progress");
        if let Some(cb) = &self.progress {
            cb(pct);
        }
    }

    /// Recognize text in `image`. Engine failures are logged and yield "".
    pub async fn recognize(&self, image: &Path) -> String {
        let engine = match self.engine.get_or_try_init(|| self.factory.build()).await {
            Ok(engine) => engine,
            Err(e) => {
                warn!(error = %e, "OCR engine unavailable");
                return String::new();
            }
        };
        self.report(25);

        let raw = match engine.recognize(image).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(image = %image.display(), error = %e, "OCR recognition failed");
                return String::new();
            }
        };
        self.report(50);

        let text = clean_ocr_text(&raw);
        self.report(75);
        let chars = text.chars().count();
        info!(chars, "OCR complete");
        self.report(100);
        text
    }
}

/// Drop NULs, trim lines and remove blank ones.
fn clean_ocr_text(raw: &str) -> String {
    raw.replace('\u{0000}', "")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
