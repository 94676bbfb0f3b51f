use std::path::PathBuf;
use tracing::info;
use workorder_extract::{Pipeline, PipelineConfig, TextSource};

/// Run both entry points on one PDF and print the results.
///
/// Usage: `workorder-extract <pdf> [config.toml]`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let pdf = PathBuf::from(args.next().ok_or("usage: workorder-extract <pdf> [config.toml]")?);
    let cfg = match args.next() {
        Some(path) => PipelineConfig::load(&path)?,
        None => PipelineConfig::default(),
    };
    info!(pdf = %pdf.display(), ?cfg, "Starting extraction");

    let pipeline = Pipeline::new(cfg);

    let acquired = pipeline.acquire(&pdf).await;
    if acquired.source == TextSource::Empty {
        println!("\n⚠ No text could be read from {} (digital or OCR).\n", pdf.display());
    }

    println!("--- Document Analysis ---");
    let analysis = workorder_extract::analyze_text(acquired.text.clone());
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    println!("--- End Analysis (source: {:?}) ---\n", acquired.source);

    println!("--- Work-Order Fields ---");
    let fields = pipeline.extract_work_order_fields(&acquired.text);
    let (filled, total) = fields.coverage();
    println!("{}", serde_json::to_string_pretty(&fields)?);
    println!("--- End Fields ({filled}/{total} fields) ---\n");

    Ok(())
}
