use super::FieldSet;
use super::rules::{Rule, first_value, id_like, identifier, sentence, wordy};
use crate::normalize::{
    clean_description, content_lines, find_address_block, looks_like_street, normalize_address,
    non_empty, parse_city_line, strip_noise_labels, title_case,
};
use std::sync::LazyLock;

/// Main extraction entry point for senders with no registered profile:
/// broad label-anchored patterns.
pub fn extract(text: &str) -> FieldSet {
    FieldSet {
        work_order_number: first_value(text, &WORK_ORDER_RULES),
        site_location: first_value(text, &LOCATION_RULES),
        site_address: first_value(text, &ADDRESS_RULES),
        problem_description: first_value(text, &DESCRIPTION_RULES),
        po_number: None,
        skip_po_number: false,
        customer: first_value(text, &CUSTOMER_RULES),
    }
}

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

static WORK_ORDER_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "work-order",
            r"(?i)\bwork\s*order\s*(?:#|no\.?|number)?\s*:?\s*([a-z]{0,3}-?\d[\d\-]{2,})",
        ),
        Rule::new("wo-hash", r"(?i)\bw\.?o\.?\s*#\s*:?\s*(\d[\d\-]{2,})"),
        Rule::new(
            "ticket",
            r"(?i)\b(?:ticket|job|service\s+request|sr)\s*(?:#|no\.?|number)\s*:?\s*([a-z0-9\-]*\d[a-z0-9\-]*)",
        ),
    ]
    .into_iter()
    .map(|rule| rule.validate(id_like).transform(identifier))
    .collect()
});

static LOCATION_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("store-name", r"(?i)\bstore\s*name\s*:\s*([^\n]+)").transform(location_name),
        Rule::new(
            "ship-to-block",
            r"(?i)\bship\s*to\s*:?[ \t]*\n?((?:[^\n]*\n?){1,3})",
        )
        .transform(first_name_line),
        Rule::new("store-number", r"(?im)^\s*((?:store|site|location)\s*#\s*\d+[^\n]*)")
            .transform(numbered_location),
        Rule::new("location-label", r"(?i)\blocation\s*:\s*([^\n]+)").transform(location_name),
    ]
    .into_iter()
    .map(|rule| rule.validate(wordy))
    .collect()
});

static ADDRESS_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "site-address",
            r"(?i)\b(?:job\s*)?(?:site|service|location)\s+address\s*:?[ \t]*\n?((?:[^\n]*\n?){1,3})",
        )
        .transform(address_from_lines),
        Rule::new(
            "ship-to-address",
            r"(?i)\bship\s*to\s*:?[ \t]*\n?((?:[^\n]*\n?){1,4})",
        )
        .transform(address_block_only),
        Rule::new("any-address", r"(?s)(.+)").transform(address_block_only),
    ]
});

static DESCRIPTION_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "description",
            r"(?i)\b(?:description|scope\s+of\s+work|problem|issue)\s*(?:of\s+work)?\s*:[ \t]*\n?((?:[^\n]*\n?){1,4})",
        ),
        Rule::new("notes", r"(?i)\bnotes?\s*:[ \t]*([^\n]+)"),
    ]
    .into_iter()
    .map(|rule| rule.validate(sentence).transform(description))
    .collect()
});

static CUSTOMER_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("bill-to", r"(?i)\bbill\s*to\s*:?\s*([^\n]+)")
            .validate(wordy)
            .transform(location_name),
    ]
});

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

fn location_name(raw: &str) -> Option<String> {
    let cleaned = strip_noise_labels(raw);
    if cleaned.chars().any(char::is_alphabetic) {
        Some(title_case(&cleaned))
    } else {
        None
    }
}

/// "Store # 1234" keeps its label: without it only the number is left.
fn numbered_location(raw: &str) -> Option<String> {
    non_empty(raw).map(|line| title_case(&line))
}

/// First line of a block that is a name rather than part of an address.
fn first_name_line(raw: &str) -> Option<String> {
    content_lines(raw)
        .into_iter()
        .find(|line| !looks_like_street(line) && parse_city_line(line).is_none())
        .and_then(location_name)
}

fn address_from_lines(raw: &str) -> Option<String> {
    let lines = content_lines(raw);
    find_address_block(&lines).or_else(|| lines.first().and_then(|l| normalize_address(l)))
}

fn address_block_only(raw: &str) -> Option<String> {
    find_address_block(&content_lines(raw))
}

fn description(raw: &str) -> Option<String> {
    clean_description(raw, 500)
}
