//! First-accepted rule chains. Every extractor in the crate is a list of
//! `(pattern, validator, transform)` rules tried in order; the first rule
//! whose first match passes validation and survives its transform decides the
//! field and later rules are never consulted.

use regex::Regex;
use tracing::debug;

pub type Validator = fn(&str) -> bool;
pub type Transform = fn(&str) -> Option<String>;

pub struct Rule {
    pub label: &'static str,
    pattern: Regex,
    validate: Validator,
    transform: Transform,
}

impl Rule {
    /// Compile `pattern`. Panics if the pattern is invalid or has no
    /// capture group: both are defects in a static rule table.
    pub fn new(label: &'static str, pattern: &str) -> Self {
        let pattern = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("rule {label}: invalid pattern: {e}"));
        assert!(
            pattern.captures_len() >= 2,
            "rule {label}: pattern has no capture group"
        );
        Self {
            label,
            pattern,
            validate: always,
            transform: trimmed,
        }
    }

    pub fn validate(mut self, validate: Validator) -> Self {
        self.validate = validate;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    fn apply(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        let raw = caps.get(1)?.as_str().trim();
        if !(self.validate)(raw) {
            debug!(rule = self.label, raw = %raw, "Match rejected by validator");
            return None;
        }
        (self.transform)(raw).filter(|v| !v.trim().is_empty())
    }
}

/// A value together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub value: String,
    pub label: &'static str,
}

pub fn first_accepted(text: &str, rules: &[Rule]) -> Option<Accepted> {
    rules.iter().find_map(|rule| {
        rule.apply(text).map(|value| {
            debug!(rule = rule.label, value = %value, "Rule accepted");
            Accepted {
                value,
                label: rule.label,
            }
        })
    })
}

/// [`first_accepted`] without the label.
pub fn first_value(text: &str, rules: &[Rule]) -> Option<String> {
    first_accepted(text, rules).map(|a| a.value)
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

pub fn always(_: &str) -> bool {
    true
}

/// Identifier-like: at least one digit and three characters.
pub fn id_like(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit()) && s.chars().count() >= 3
}

/// At least three characters, one of them a letter.
pub fn wordy(s: &str) -> bool {
    s.chars().count() >= 3 && s.chars().any(char::is_alphabetic)
}

/// At least five characters of prose.
pub fn sentence(s: &str) -> bool {
    s.chars().filter(|c| c.is_alphabetic()).count() >= 5
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

pub fn trimmed(s: &str) -> Option<String> {
    crate::normalize::non_empty(s)
}

/// Identifiers are reported upper-case with stray punctuation removed.
pub fn identifier(s: &str) -> Option<String> {
    let id = s
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_uppercase();
    if id.is_empty() { None } else { Some(id) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits_only(s: &str) -> Option<String> {
        Some(s.chars().filter(char::is_ascii_digit).collect())
    }

    #[test]
    fn earliest_passing_rule_wins() {
        let rules = vec![
            Rule::new("first", r"(?i)ref:\s*(\w+)").validate(id_like),
            Rule::new("second", r"(?i)no\.\s*(\d+)"),
            Rule::new("third", r"(\d{3,})"),
        ];
        let got = first_accepted("ref: abc no. 4455 999", &rules).unwrap();
        assert_eq!(got.label, "second");
        assert_eq!(got.value, "4455");
    }

    #[test]
    fn transform_can_reject() {
        let rules = vec![
            Rule::new("empty", r"x(\s*)y").transform(trimmed),
            Rule::new("fallback", r"(\d+)").transform(digits_only),
        ];
        assert_eq!(first_value("x y 12", &rules).as_deref(), Some("12"));
    }

    #[test]
    fn no_match_is_none() {
        let rules = vec![Rule::new("only", r"po\s*(\d+)")];
        assert_eq!(first_accepted("nothing here", &rules), None);
    }

    #[test]
    #[should_panic(expected = "no capture group")]
    fn missing_group_is_a_defect() {
        Rule::new("broken", r"po\s*\d+");
    }

    #[test]
    fn validators() {
        assert!(id_like("a12"));
        assert!(!id_like("12"));
        assert!(!id_like("abcd"));
        assert!(wordy("abc"));
        assert!(!wordy("123"));
        assert!(sentence("glass broken"));
        assert!(!sentence("n/a"));
    }

    #[test]
    fn identifiers_are_upper_cased() {
        assert_eq!(identifier("ab-123.").as_deref(), Some("AB-123"));
        assert_eq!(identifier("--").as_deref(), None);
    }
}
