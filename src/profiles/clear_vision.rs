//! Clear Vision work orders: a "SERVICE LOCATION" block (store line, street,
//! city line) followed by "PROBLEM REPORTED".

use crate::heuristics::FieldSet;
use crate::heuristics::rules::{Rule, first_value, id_like, identifier, sentence, wordy};
use crate::normalize::{
    clean_description, content_lines, find_address_block, looks_like_street, normalize_address,
    parse_city_line, strip_noise_labels, strip_store_prefix, title_case,
};
use std::sync::LazyLock;

pub(super) fn extract(text: &str) -> FieldSet {
    FieldSet {
        work_order_number: first_value(text, &WORK_ORDER),
        site_location: first_value(text, &SITE_LOCATION),
        site_address: first_value(text, &SITE_ADDRESS),
        problem_description: first_value(text, &PROBLEM),
        po_number: first_value(text, &CLIENT_PO),
        skip_po_number: false,
        customer: None,
    }
}

static WORK_ORDER: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("cv-work-order", r"(?i)\bwork\s*order\s*(?:#|no\.?|number)?\s*:?\s*(\d{5,})"),
        Rule::new("cv-wo", r"(?i)\bw\.?o\.?\s*#?\s*:?\s*(\d{5,})"),
        Rule::new("cv-bare-hash", r"(?m)^\s*#\s*(\d{6,})\s*$"),
    ]
    .into_iter()
    .map(|rule| rule.validate(id_like).transform(identifier))
    .collect()
});

static SITE_LOCATION: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "cv-service-location",
            r"(?i)\bservice\s+location\s*:?[ \t]*\n?((?:[^\n]*\n?){1,4})",
        )
        .transform(site_name_from_block),
        Rule::new("cv-store", r"(?i)\bstore\s*(?:name|#)?\s*:\s*([^\n]+)").transform(site_name),
        Rule::new("cv-site-name", r"(?i)\bsite\s*name\s*:\s*([^\n]+)").transform(site_name),
    ]
    .into_iter()
    .map(|rule| rule.validate(wordy))
    .collect()
});

static SITE_ADDRESS: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "cv-service-location",
            r"(?i)\bservice\s+location\s*:?[ \t]*\n?((?:[^\n]*\n?){1,5})",
        )
        .transform(address_from_block),
        Rule::new(
            "cv-site-address",
            r"(?i)\bsite\s+address\s*:?[ \t]*\n?((?:[^\n]*\n?){1,3})",
        )
        .transform(address_or_single_line),
        Rule::new("cv-any-address", r"(?s)(.+)").transform(address_from_block),
    ]
});

static PROBLEM: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "cv-problem",
            r"(?i)\bproblem\s+(?:reported|description)\s*:?[ \t]*\n?((?:[^\n]*\n?){1,4})",
        ),
        Rule::new(
            "cv-scope",
            r"(?i)\bscope\s+of\s+work\s*:?[ \t]*\n?((?:[^\n]*\n?){1,4})",
        ),
        Rule::new("cv-description", r"(?i)\bdescription\s*:\s*([^\n]+)"),
    ]
    .into_iter()
    .map(|rule| rule.validate(sentence).transform(description))
    .collect()
});

static CLIENT_PO: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "cv-client-po",
            r"(?i)\b(?:client|customer)\s+p\.?o\.?\s*(?:#|no\.?)?\s*:?\s*([a-z0-9\-]*\d[a-z0-9\-]*)",
        )
        .validate(id_like)
        .transform(identifier),
    ]
});

fn site_name(raw: &str) -> Option<String> {
    let name = strip_noise_labels(&strip_store_prefix(raw));
    name.chars()
        .any(char::is_alphabetic)
        .then(|| title_case(&name))
}

/// The store line is the first line of the block that is neither a street
/// nor a city line.
fn site_name_from_block(raw: &str) -> Option<String> {
    content_lines(raw)
        .into_iter()
        .take_while(|line| !line.to_lowercase().starts_with("problem"))
        .find(|line| !looks_like_street(line) && parse_city_line(line).is_none())
        .and_then(site_name)
}

fn address_from_block(raw: &str) -> Option<String> {
    find_address_block(&content_lines(raw))
}

fn address_or_single_line(raw: &str) -> Option<String> {
    let lines = content_lines(raw);
    find_address_block(&lines).or_else(|| lines.first().and_then(|l| normalize_address(l)))
}

fn description(raw: &str) -> Option<String> {
    clean_description(raw, 500)
}
