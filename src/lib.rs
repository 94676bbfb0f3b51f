//! Field extraction for work-order and purchase-order PDFs: hybrid
//! digital/OCR text acquisition, supplier and PO-number detection, and
//! per-customer layout extractors with a generic fallback.

pub mod acquire;
pub mod config;
pub mod heuristics;
pub mod normalize;
pub mod ocr;
pub mod pdf_extract;
pub mod pipeline;
pub mod profiles;
pub mod raster;
pub mod tools;

pub use acquire::{AcquiredText, TextSource};
pub use config::PipelineConfig;
pub use heuristics::{ExtractionResult, WorkOrderFields};
pub use pipeline::{Pipeline, analyze_text, extract_work_order_fields};
