// src/heuristics/mod.rs

pub mod generic;
pub mod po_number;
pub mod rules;
pub mod supplier;

use serde::Serialize;

/// Per-document fields produced by a profile extractor or the generic
/// fallback, before the pipeline assembles the final record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub work_order_number: Option<String>,
    pub site_location: Option<String>,
    pub site_address: Option<String>,
    pub problem_description: Option<String>,
    pub po_number: Option<String>,
    /// Suppress the generic PO-number fallback for this document.
    pub skip_po_number: bool,
    /// Issuer named by the document itself ("Bill To"), used only when no
    /// profile matched.
    pub customer: Option<String>,
}

/// Outcome of `analyze_document`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Lower-cased full document text.
    pub text: String,
    pub text_length: usize,
    pub supplier: Option<String>,
    pub po_number: Option<String>,
}

/// Business fields pulled out of a work order / purchase order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderFields {
    pub customer: Option<String>,
    pub billing_address: Option<String>,
    pub work_order_number: Option<String>,
    pub po_number: Option<String>,
    pub site_location: Option<String>,
    pub site_address: Option<String>,
    pub problem_description: Option<String>,
    pub detected_customer_profile: bool,
    /// Bounded excerpt of the source text, for diagnostics.
    pub raw_text: Option<String>,
}

impl WorkOrderFields {
    /// How many fields were successfully extracted (out of the scalar ones).
    pub fn coverage(&self) -> (usize, usize) {
        let total = 7;
        let filled = [
            self.customer.is_some(),
            self.billing_address.is_some(),
            self.work_order_number.is_some(),
            self.po_number.is_some(),
            self.site_location.is_some(),
            self.site_address.is_some(),
            self.problem_description.is_some(),
        ]
        .iter()
        .filter(|&&v| v)
        .count();
        (filled, total)
    }
}
