use super::rules::{Rule, first_accepted, id_like, identifier};
use std::sync::LazyLock;
use tracing::debug;

/// Labeled PO patterns, most reliable first. The bare "PO 1234" rule comes
/// last: it is the one most likely to fire on an unrelated number.
static PO_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "po-label",
            r"(?i)\bp\.?\s?o\.?\s*(?:#|no\.?|num(?:ber)?\.?)\s*:?\s*([a-z0-9][a-z0-9\-]*)",
        ),
        Rule::new(
            "purchase-order",
            r"(?i)\bpurchase\s+order\s*(?:#|no\.?|num(?:ber)?\.?)?\s*:?\s*([a-z0-9][a-z0-9\-]*)",
        ),
        Rule::new(
            "customer-po",
            r"(?i)\b(?:customer|client)\s+p\.?o\.?\s*:?\s*([a-z0-9][a-z0-9\-]*)",
        ),
        Rule::new("po-colon", r"(?i)\bp\.?o\.?\s*:\s*([a-z0-9][a-z0-9\-]*)"),
        Rule::new("bare-po", r"(?i)\bpo\s*(\d{3,})\b"),
    ]
    .into_iter()
    .map(|rule| rule.validate(id_like).transform(identifier))
    .collect()
});

/// Find the document's PO number, or `None`.
pub fn identify_number(text: &str) -> Option<String> {
    let accepted = first_accepted(text, &PO_RULES)?;
    debug!(rule = accepted.label, po = %accepted.value, "PO number detected");
    Some(accepted.value)
}
