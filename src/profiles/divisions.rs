//! Divisions Maintenance Group work orders. Their documents carry a "PO"
//! line that is the contractor's own reference, so the PO fallback is
//! switched off for this issuer.

use crate::heuristics::FieldSet;
use crate::heuristics::rules::{Rule, first_value, id_like, identifier, sentence, wordy};
use crate::normalize::{
    clean_description, content_lines, find_address_block, normalize_address, strip_noise_labels,
    strip_store_prefix, title_case,
};
use std::sync::LazyLock;

pub(super) fn extract(text: &str) -> FieldSet {
    FieldSet {
        work_order_number: first_value(text, &WORK_ORDER),
        site_location: first_value(text, &LOCATION),
        site_address: first_value(text, &ADDRESS),
        problem_description: first_value(text, &PROBLEM),
        po_number: None,
        skip_po_number: true,
        customer: None,
    }
}

static WORK_ORDER: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("dmg-work-order", r"(?i)\bwork\s*order\s*(?:#|no\.?|number)?\s*:?\s*(\d{6,})"),
        Rule::new("dmg-wo", r"(?i)\bwo\s*#\s*:?\s*(\d{5,})"),
        Rule::new("dmg-prefixed", r"(?i)\bdmg-?(\d{5,})"),
    ]
    .into_iter()
    .map(|rule| rule.validate(id_like).transform(identifier))
    .collect()
});

static LOCATION: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("dmg-location-name", r"(?i)\blocation\s+name\s*:\s*([^\n]+)"),
        Rule::new("dmg-store-name", r"(?i)\bstore\s*name\s*:\s*([^\n]+)"),
        Rule::new("dmg-site-location", r"(?i)\bsite\s*/\s*location\s*:\s*([^\n]+)"),
    ]
    .into_iter()
    .map(|rule| rule.validate(wordy).transform(location_name))
    .collect()
});

static ADDRESS: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "dmg-site-address",
            r"(?i)\bsite\s+address\s*:?[ \t]*\n?((?:[^\n]*\n?){1,3})",
        )
        .transform(address_or_single_line),
        Rule::new("dmg-address", r"(?im)^\s*address\s*:\s*([^\n]+)").transform(normalize_address),
        Rule::new("dmg-any-address", r"(?s)(.+)")
            .transform(|raw| find_address_block(&content_lines(raw))),
    ]
});

static PROBLEM: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "dmg-description-of-work",
            r"(?i)\bdescription\s+of\s+work\s*:?[ \t]*\n?((?:[^\n]*\n?){1,4})",
        ),
        Rule::new("dmg-problem", r"(?i)\b(?:problem|issue)\s*:\s*([^\n]+)"),
    ]
    .into_iter()
    .map(|rule| rule.validate(sentence).transform(|raw| clean_description(raw, 500)))
    .collect()
});

fn location_name(raw: &str) -> Option<String> {
    let name = strip_noise_labels(&strip_store_prefix(raw));
    name.chars()
        .any(char::is_alphabetic)
        .then(|| title_case(&name))
}

fn address_or_single_line(raw: &str) -> Option<String> {
    let lines = content_lines(raw);
    find_address_block(&lines).or_else(|| lines.first().and_then(|l| normalize_address(l)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DMG: &str = "\
divisions maintenance group
work order #: 4567890
location name: dollar general #14420
site address: 812 e washington st
springfield, il 62701
description of work: replace broken rear door glass
board up until glass arrives
nte: $650
po #: 99812";

    #[test]
    fn extracts_standard_layout() {
        let fields = extract(DMG);
        assert_eq!(fields.work_order_number.as_deref(), Some("4567890"));
        assert_eq!(fields.site_location.as_deref(), Some("Dollar General #14420"));
        assert_eq!(
            fields.site_address.as_deref(),
            Some("812 E Washington St, Springfield, IL 62701")
        );
        assert_eq!(
            fields.problem_description.as_deref(),
            Some("Replace broken rear door glass board up until glass arrives")
        );
    }

    #[test]
    fn po_is_never_read_and_fallback_is_suppressed() {
        let fields = extract(DMG);
        assert_eq!(fields.po_number, None);
        assert!(fields.skip_po_number);
    }

    #[test]
    fn secondary_labels() {
        let text = "divisionsinc.com\nwo #: 33190\nstore name: aldi #5521\n\
                    address: 40 river rd, moline, il 61265\nissue: leaking skylight over aisle 4";
        let fields = extract(text);
        assert_eq!(fields.work_order_number.as_deref(), Some("33190"));
        assert_eq!(fields.site_location.as_deref(), Some("Aldi #5521"));
        assert_eq!(fields.site_address.as_deref(), Some("40 River Rd, Moline, IL 61265"));
        assert_eq!(
            fields.problem_description.as_deref(),
            Some("Leaking skylight over aisle 4")
        );
    }

    #[test]
    fn prefixed_reference_number() {
        assert_eq!(
            extract("divisions inc\nref dmg-220981").work_order_number.as_deref(),
            Some("220981")
        );
    }

    #[test]
    fn missing_fields_stay_empty() {
        let fields = extract("divisions maintenance\nthanks");
        assert_eq!(fields.work_order_number, None);
        assert_eq!(fields.site_location, None);
        assert_eq!(fields.site_address, None);
        assert_eq!(fields.problem_description, None);
        assert!(fields.skip_po_number);
    }
}
