use crate::normalize::{clamp, collapse_whitespace, strip_noise_labels, title_case};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// A vendor the system recognizes by name.
struct Vendor {
    name: &'static str,
    /// Compacted spellings (lower-case, alphanumerics only) checked against a
    /// layout-captured token.
    variants: &'static [&'static str],
    /// Whole-document patterns tolerant of OCR confusions (0/o, 1/l/i, @/a).
    keywords: Vec<Regex>,
}

fn vendor(name: &'static str, variants: &'static [&'static str], keywords: &[&str]) -> Vendor {
    Vendor {
        name,
        variants,
        keywords: keywords
            .iter()
            .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("vendor {name}: {e}")))
            .collect(),
    }
}

static VENDORS: LazyLock<Vec<Vendor>> = LazyLock::new(|| {
    vec![
        vendor(
            "Oldcastle",
            &["oldcastle", "oldcast"],
            &[
                r"(?i)\b[o0][l1i]d\s*c[a@4]st[l1i]e\b",
                r"(?i)\b[o0][l1i]d[\s\-]+c[a@4]st[l1i]e",
            ],
        ),
        vendor(
            "C.R. Laurence",
            &["crlaurence", "laurence"],
            &[
                r"(?i)\bc\.?\s?r\.?\s?[l1]aurence\b",
                r"(?i)\b[l1]aurence\s+c[o0]",
            ],
        ),
        vendor(
            "Vitro",
            &["vitro"],
            &[r"(?i)\bvitr[o0]\s+(?:architectural|glass)", r"(?i)\bvitr[o0]\b"],
        ),
        vendor(
            "Guardian",
            &["guardian"],
            &[r"(?i)\bguard[i1l][a@]n\s+(?:glass|industries)"],
        ),
        vendor(
            "Cardinal",
            &["cardinal"],
            &[r"(?i)\bcard[i1l]n[a@][l1]\s+(?:glass|ig|fg|cg)\b"],
        ),
    ]
});

/// "Vendor" at the start of a line. Group 1/2 are the optional qualifier and
/// delimiter, group 3 the rest of the line.
static VENDOR_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*vendor\b[ \t]*(name|info(?:rmation)?)?[ \t]*([:#])?[ \t]*([^\n]*)$",
    )
    .unwrap()
});

/// Identify the supplier named on the document: the "Vendor" block first,
/// keyword patterns second.
pub fn identify_supplier(text: &str) -> Option<String> {
    if let Some(name) = from_layout(text) {
        debug!(supplier = %name, strategy = "layout", "Supplier identified");
        return Some(name);
    }
    let name = from_keywords(text)?;
    debug!(supplier = %name, strategy = "keyword", "Supplier identified");
    Some(name.to_string())
}

/// Token after a "Vendor" label (same line, else the next non-empty line),
/// classified against the known vendors or returned cleaned.
fn from_layout(text: &str) -> Option<String> {
    for caps in VENDOR_LABEL.captures_iter(text) {
        let whole = caps.get(0)?;
        let delimited = caps.get(1).is_some() || caps.get(2).is_some();
        let same_line = caps.get(3).map_or("", |m| m.as_str().trim());

        let token = if is_token(same_line) {
            Some(same_line)
        } else {
            text[whole.end()..]
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .filter(|line| is_token(line))
        };

        if let Some(token) = token {
            if let Some(known) = classify(token) {
                return Some(known.to_string());
            }
            // Free text right after a bare "vendor" is a sentence, not a name.
            if !delimited && is_token(same_line) {
                continue;
            }
            if let Some(cleaned) = clean_vendor_name(token) {
                return Some(cleaned);
            }
        }
    }
    None
}

fn is_token(s: &str) -> bool {
    s.chars().filter(|c| c.is_alphabetic()).count() >= 2
}

fn compact(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| match c.to_ascii_lowercase() {
            '0' => 'o',
            '1' => 'l',
            other => other,
        })
        .collect()
}

fn classify(token: &str) -> Option<&'static str> {
    let compacted = compact(token);
    VENDORS
        .iter()
        .find(|v| v.variants.iter().any(|variant| compacted.contains(variant)))
        .map(|v| v.name)
}

fn clean_vendor_name(token: &str) -> Option<String> {
    let stripped = strip_noise_labels(token);
    let cleaned = collapse_whitespace(stripped.trim_matches(|c: char| !c.is_alphanumeric()));
    if !is_token(&cleaned) {
        return None;
    }
    Some(title_case(&clamp(&cleaned, 60)))
}

fn from_keywords(text: &str) -> Option<&'static str> {
    VENDORS
        .iter()
        .find(|v| v.keywords.iter().any(|re| re.is_match(text)))
        .map(|v| v.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_label_then_next_line() {
        let text = "PURCHASE ORDER\nVENDOR\nOLDCASTLE\nSHIP TO\n";
        assert_eq!(identify_supplier(text).as_deref(), Some("Oldcastle"));
    }

    #[test]
    fn vendor_on_same_line_with_spacing_variant() {
        let text = "vendor: old castle buildingenvelope inc\nship to: site";
        assert_eq!(identify_supplier(text).as_deref(), Some("Oldcastle"));
    }

    #[test]
    fn unknown_vendor_is_returned_cleaned() {
        let text = "vendor name: ACME GLASS SUPPLY, INC.\nbill to";
        assert_eq!(identify_supplier(text).as_deref(), Some("Acme Glass Supply, Inc"));
    }

    #[test]
    fn numeric_vendor_id_skipped_for_next_line() {
        let text = "vendor #: 10044\nc.r. laurence co\n";
        assert_eq!(identify_supplier(text).as_deref(), Some("C.R. Laurence"));
    }

    #[test]
    fn keyword_fallback_tolerates_ocr_digits() {
        let text = "thank you for your order\n0ldcastle building envelope\ninvoice 5512";
        assert_eq!(identify_supplier(text).as_deref(), Some("Oldcastle"));
    }

    #[test]
    fn keyword_fallback_order_is_stable() {
        let text = "guardian glass distributed by vitro architectural glass";
        assert_eq!(identify_supplier(text).as_deref(), Some("Vitro"));
    }

    #[test]
    fn nothing_found() {
        assert_eq!(identify_supplier("work order 12345 replace glass"), None);
        assert_eq!(identify_supplier(""), None);
    }

    #[test]
    fn vendor_in_prose_defers_to_keywords() {
        let text = "terms: vendor shall deliver all materials to site\nthank you\noldcastle building envelope";
        assert_eq!(identify_supplier(text).as_deref(), Some("Oldcastle"));
    }

    #[test]
    fn sentence_starting_with_vendor_is_not_a_name() {
        let text = "vendor shall deliver all materials to site\nplease call ahead";
        assert_eq!(identify_supplier(text), None);
    }

    #[test]
    fn vendors_plural_is_not_a_label() {
        assert_eq!(identify_supplier("approved vendors list\nzeta corp"), None);
    }
}
