// src/pipeline.rs

use crate::acquire::{self, AcquiredText, OcrRoute, PageOcr};
use crate::config::PipelineConfig;
use crate::heuristics::po_number::identify_number;
use crate::heuristics::supplier::identify_supplier;
use crate::heuristics::{ExtractionResult, WorkOrderFields, generic};
use crate::normalize::{clamp, non_empty};
use crate::pdf_extract::{DigitalText, TextLayer};
use crate::profiles::detect_profile;
use std::path::Path;
use tracing::{Instrument, info, info_span};

/// Shorter inputs cannot carry a work order and are not scanned.
const MIN_FIELD_TEXT_CHARS: usize = 10;

const DEFAULT_RAW_TEXT_LIMIT: usize = 500;

/// Document-level entry points. Owns the text sources (and through them the
/// shared OCR engine), so one `Pipeline` should serve every document.
pub struct Pipeline {
    config: PipelineConfig,
    digital: Box<dyn DigitalText>,
    ocr: Box<dyn PageOcr>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let ocr = OcrRoute::from_config(&config);
        Self::with_components(config, Box::new(TextLayer), Box::new(ocr))
    }

    pub fn with_components(
        config: PipelineConfig,
        digital: Box<dyn DigitalText>,
        ocr: Box<dyn PageOcr>,
    ) -> Self {
        Self {
            config,
            digital,
            ocr,
        }
    }

    /// Best available text for the document, with where it came from.
    pub async fn acquire(&self, path: &Path) -> AcquiredText {
        acquire::acquire(
            path,
            self.digital.as_ref(),
            self.ocr.as_ref(),
            self.config.min_digital_chars,
        )
        .instrument(info_span!("acquire", pdf = %path.display()))
        .await
    }

    /// Lower-cased document text, "" if nothing could be read.
    pub async fn acquire_text(&self, path: &Path) -> String {
        self.acquire(path).await.text
    }

    /// Acquire the text, then name the supplier and PO number.
    pub async fn analyze_document(&self, path: &Path) -> ExtractionResult {
        let acquired = self.acquire(path).await;
        let result = analyze_text(acquired.text);
        info!(
            pdf = %path.display(),
            source = ?acquired.source,
            chars = result.text_length,
            supplier = result.supplier.as_deref().unwrap_or("-"),
            po = result.po_number.as_deref().unwrap_or("-"),
            "Document analyzed"
        );
        result
    }

    pub fn extract_work_order_fields(&self, text: &str) -> WorkOrderFields {
        extract_fields(text, self.config.raw_text_limit)
    }
}

/// Supplier and PO number for already-acquired text.
pub fn analyze_text(text: String) -> ExtractionResult {
    ExtractionResult {
        text_length: text.chars().count(),
        supplier: identify_supplier(&text),
        po_number: identify_number(&text),
        text,
    }
}

/// Profile dispatch (or generic fallback) followed by result assembly.
/// Never fails: fields that cannot be found are `None`.
pub fn extract_work_order_fields(text: &str) -> WorkOrderFields {
    extract_fields(text, DEFAULT_RAW_TEXT_LIMIT)
}

fn extract_fields(text: &str, raw_text_limit: usize) -> WorkOrderFields {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_FIELD_TEXT_CHARS {
        return WorkOrderFields::default();
    }

    let profile = detect_profile(trimmed);
    let fields = match profile {
        Some(p) => p.strategy.extract(trimmed),
        None => generic::extract(trimmed),
    };

    let po_number = if fields.skip_po_number {
        None
    } else {
        fields.po_number.or_else(|| identify_number(trimmed))
    };

    let tidy = |v: Option<String>| v.as_deref().and_then(non_empty);
    let result = WorkOrderFields {
        customer: tidy(profile.map(|p| p.display_name.to_string()).or(fields.customer)),
        billing_address: tidy(profile.map(|p| p.billing_address.to_string())),
        work_order_number: tidy(fields.work_order_number),
        po_number: tidy(po_number),
        site_location: tidy(fields.site_location),
        site_address: tidy(fields.site_address),
        problem_description: tidy(fields.problem_description),
        detected_customer_profile: profile.is_some(),
        raw_text: non_empty(&clamp(trimmed, raw_text_limit)),
    };

    let (filled, total) = result.coverage();
    info!(
        profile = profile.map_or("generic", |p| p.key),
        filled,
        total,
        "Work-order fields extracted"
    );
    result
}
