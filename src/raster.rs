// src/raster.rs

use crate::config::PipelineConfig;
use crate::tools::{ToolError, run_with_timeout};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Output geometry shared by every rasterizer in a chain.
#[derive(Debug, Clone)]
pub struct RasterSettings {
    pub dpi: u32,
    pub width: u32,
    pub height: u32,
    pub timeout: Duration,
}

impl From<&PipelineConfig> for RasterSettings {
    fn from(cfg: &PipelineConfig) -> Self {
        Self {
            dpi: cfg.raster_dpi,
            width: cfg.raster_width,
            height: cfg.raster_height,
            timeout: cfg.tool_timeout(),
        }
    }
}

/// Converts page one of a PDF into a PNG inside `out_dir`.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    fn name(&self) -> &str;

    async fn rasterize(
        &self,
        pdf: &Path,
        out_dir: &Path,
        settings: &RasterSettings,
    ) -> Result<PathBuf, ToolError>;
}

/// poppler's `pdftoppm`.
pub struct Pdftoppm {
    bin: String,
}

impl Pdftoppm {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

#[async_trait]
impl Rasterizer for Pdftoppm {
    fn name(&self) -> &str {
        &self.bin
    }

    async fn rasterize(
        &self,
        pdf: &Path,
        out_dir: &Path,
        settings: &RasterSettings,
    ) -> Result<PathBuf, ToolError> {
        let output_root = out_dir.join("page");
        let mut cmd = Command::new(&self.bin);
        cmd.args(["-f", "1", "-l", "1", "-singlefile", "-png"])
            .arg("-r")
            .arg(settings.dpi.to_string())
            .arg("-scale-to-x")
            .arg(settings.width.to_string())
            .arg("-scale-to-y")
            .arg(settings.height.to_string())
            .arg(pdf)
            .arg(&output_root);

        run_with_timeout(&self.bin, &mut cmd, settings.timeout).await?;
        expect_output(&self.bin, output_root.with_extension("png"))
    }
}

/// ImageMagick (`convert` / `magick`), same geometry as the primary tool.
pub struct ImageMagick {
    bin: String,
}

impl ImageMagick {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

#[async_trait]
impl Rasterizer for ImageMagick {
    fn name(&self) -> &str {
        &self.bin
    }

    async fn rasterize(
        &self,
        pdf: &Path,
        out_dir: &Path,
        settings: &RasterSettings,
    ) -> Result<PathBuf, ToolError> {
        let png = out_dir.join("page.png");
        let mut first_page = OsString::from(pdf.as_os_str());
        first_page.push("[0]");

        let mut cmd = Command::new(&self.bin);
        cmd.arg("-density")
            .arg(settings.dpi.to_string())
            .arg(first_page)
            .arg("-resize")
            .arg(format!("{}x{}", settings.width, settings.height))
            .args(["-background", "white", "-alpha", "remove"])
            .arg(&png);

        run_with_timeout(&self.bin, &mut cmd, settings.timeout).await?;
        expect_output(&self.bin, png)
    }
}

/// The tool's PNG, provided it exists and is non-empty.
fn expect_output(program: &str, path: PathBuf) -> Result<PathBuf, ToolError> {
    let missing = || ToolError::MissingOutput {
        program: program.to_string(),
    };
    match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > 0 => Ok(path),
        Ok(_) => Err(missing()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(missing()),
        Err(e) => Err(ToolError::Io(e)),
    }
}

/// A rendered page living in its own temporary directory. Dropping it
/// removes the directory; a failed removal is logged, never raised.
#[derive(Debug)]
pub struct RasterImage {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl RasterImage {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RasterImage {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let dir_path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => debug!(path = %dir_path.display(), "Removed raster image"),
            Err(e) => warn!(path = %dir_path.display(), error = %e, "Failed to remove raster image"),
        }
    }
}

/// Ordered list of rasterizers; the first one that yields a file wins.
pub struct RasterChain {
    rasterizers: Vec<Box<dyn Rasterizer>>,
    settings: RasterSettings,
}

impl RasterChain {
    pub fn new(rasterizers: Vec<Box<dyn Rasterizer>>, settings: RasterSettings) -> Self {
        Self {
            rasterizers,
            settings,
        }
    }

    /// `pdftoppm`, then ImageMagick.
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(
            vec![
                Box::new(Pdftoppm::new(cfg.bins.pdftoppm.clone())),
                Box::new(ImageMagick::new(cfg.bins.magick.clone())),
            ],
            RasterSettings::from(cfg),
        )
    }

    /// Render page one, or `None` if every tool failed.
    pub async fn rasterize_first_page(&self, pdf: &Path) -> Option<RasterImage> {
        for rasterizer in &self.rasterizers {
            let dir = match tempfile::Builder::new().prefix("wo-raster-").tempdir() {
                Ok(dir) => dir,
                Err(e) => {
                    warn!(error = %e, "Could not create raster temp dir");
                    return None;
                }
            };

            match rasterizer.rasterize(pdf, dir.path(), &self.settings).await {
                Ok(path) => {
                    info!(tool = rasterizer.name(), path = %path.display(), "Rasterized first page");
                    return Some(RasterImage {
                        path,
                        dir: Some(dir),
                    });
                }
                Err(e) => {
                    warn!(tool = rasterizer.name(), error = %e, "Rasterizer failed — trying next");
                }
            }
        }

        warn!(pdf = %pdf.display(), "No rasterizer produced an image");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Writes a placeholder PNG, or fails, counting calls either way.
    struct FakeRasterizer {
        pub succeed: bool,
        pub calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Rasterizer for FakeRasterizer {
        fn name(&self) -> &str {
            "fake"
        }

        async fn rasterize(
            &self,
            _pdf: &Path,
            out_dir: &Path,
            _settings: &RasterSettings,
        ) -> Result<PathBuf, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.succeed {
                return Err(ToolError::MissingOutput {
                    program: "fake".to_string(),
                });
            }
            let png = out_dir.join("page.png");
            std::fs::write(&png, b"\x89PNG")?;
            Ok(png)
        }
    }

    fn settings() -> RasterSettings {
        RasterSettings::from(&PipelineConfig::default())
    }

    #[tokio::test]
    async fn falls_back_to_secondary() {
        let primary = Arc::new(AtomicUsize::new(0));
        let secondary = Arc::new(AtomicUsize::new(0));
        let chain = RasterChain::new(
            vec![
                Box::new(FakeRasterizer {
                    succeed: false,
                    calls: primary.clone(),
                }),
                Box::new(FakeRasterizer {
                    succeed: true,
                    calls: secondary.clone(),
                }),
            ],
            settings(),
        );

        let image = chain.rasterize_first_page(Path::new("doc.pdf")).await.unwrap();
        assert!(image.path().exists());
        assert_eq!(primary.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn secondary_skipped_when_primary_succeeds() {
        let secondary = Arc::new(AtomicUsize::new(0));
        let chain = RasterChain::new(
            vec![
                Box::new(FakeRasterizer {
                    succeed: true,
                    calls: Arc::new(AtomicUsize::new(0)),
                }),
                Box::new(FakeRasterizer {
                    succeed: true,
                    calls: secondary.clone(),
                }),
            ],
            settings(),
        );
        assert!(chain.rasterize_first_page(Path::new("doc.pdf")).await.is_some());
        assert_eq!(secondary.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_failing_yields_none() {
        let chain = RasterChain::new(
            vec![Box::new(FakeRasterizer {
                succeed: false,
                calls: Arc::new(AtomicUsize::new(0)),
            })],
            settings(),
        );
        assert!(chain.rasterize_first_page(Path::new("doc.pdf")).await.is_none());
    }

    #[tokio::test]
    async fn dropping_image_removes_file() {
        let chain = RasterChain::new(
            vec![Box::new(FakeRasterizer {
                succeed: true,
                calls: Arc::new(AtomicUsize::new(0)),
            })],
            settings(),
        );
        let image = chain.rasterize_first_page(Path::new("doc.pdf")).await.unwrap();
        let path = image.path().to_path_buf();
        let dir = path.parent().unwrap().to_path_buf();
        drop(image);
        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn output_must_exist_and_be_non_empty() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("page.png");
        assert!(matches!(
            expect_output("pdftoppm", png.clone()),
            Err(ToolError::MissingOutput { .. })
        ));

        std::fs::write(&png, b"").unwrap();
        assert!(matches!(
            expect_output("pdftoppm", png.clone()),
            Err(ToolError::MissingOutput { .. })
        ));

        std::fs::write(&png, b"\x89PNG").unwrap();
        assert_eq!(expect_output("pdftoppm", png.clone()).unwrap(), png);
    }

    #[tokio::test]
    async fn missing_tools_degrade_to_none() {
        let mut cfg = PipelineConfig::default();
        cfg.bins.pdftoppm = "no-such-pdftoppm-xyz".to_string();
        cfg.bins.magick = "no-such-convert-xyz".to_string();
        let chain = RasterChain::from_config(&cfg);
        assert!(chain.rasterize_first_page(Path::new("missing.pdf")).await.is_none());
    }
}
