// src/profiles/mod.rs

//! Known document issuers. Each profile carries the aliases that identify the
//! sender, the display name and billing address reported for it, and the
//! strategy used to pull fields out of its layout.
//!
//! Registry order is part of the contract: when a document mentions aliases
//! of several profiles, the earliest profile in [`registry`] wins.
//!
//! 1. Clear Vision Facility Services (custom extractor)
//! 2. Divisions Maintenance Group (custom extractor, no PO fallback)
//! 3. SMS Assist (pattern map)
//! 4. Kellermeyer Bergensons Services (pattern map)

mod clear_vision;
mod divisions;

use crate::heuristics::FieldSet;
use crate::heuristics::rules::identifier;
use crate::normalize::{clean_description, normalize_address, strip_noise_labels, title_case};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Profile-specific multi-pattern extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomExtractor {
    ClearVision,
    Divisions,
}

impl CustomExtractor {
    fn run(self, text: &str) -> FieldSet {
        match self {
            CustomExtractor::ClearVision => clear_vision::extract(text),
            CustomExtractor::Divisions => divisions::extract(text),
        }
    }
}

/// One regex per field; capture group 1 is the value.
#[derive(Debug)]
pub struct PatternMap {
    pub work_order_number: Option<Regex>,
    pub site_location: Option<Regex>,
    pub site_address: Option<Regex>,
    pub problem_description: Option<Regex>,
    pub po_number: Option<Regex>,
    pub skip_po_number: bool,
}

impl PatternMap {
    fn extract(&self, text: &str) -> FieldSet {
        FieldSet {
            work_order_number: capture(&self.work_order_number, text).and_then(|v| identifier(&v)),
            site_location: capture(&self.site_location, text)
                .map(|v| title_case(&strip_noise_labels(&v)))
                .filter(|v| !v.is_empty()),
            site_address: capture(&self.site_address, text).and_then(|v| normalize_address(&v)),
            problem_description: capture(&self.problem_description, text)
                .and_then(|v| clean_description(&v, 500)),
            po_number: capture(&self.po_number, text).and_then(|v| identifier(&v)),
            skip_po_number: self.skip_po_number,
            customer: None,
        }
    }
}

fn capture(pattern: &Option<Regex>, text: &str) -> Option<String> {
    let caps = pattern.as_ref()?.captures(text)?;
    Some(caps.get(1)?.as_str().trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug)]
pub enum Strategy {
    Custom(CustomExtractor),
    PatternMap(PatternMap),
}

impl Strategy {
    pub fn extract(&self, text: &str) -> FieldSet {
        match self {
            Strategy::Custom(extractor) => extractor.run(text),
            Strategy::PatternMap(map) => map.extract(text),
        }
    }
}

#[derive(Debug)]
pub struct CustomerProfile {
    pub key: &'static str,
    /// Matched case-insensitively as plain substrings of the whole document.
    pub aliases: &'static [&'static str],
    pub display_name: &'static str,
    pub billing_address: &'static str,
    pub strategy: Strategy,
}

impl CustomerProfile {
    fn matches(&self, upper_text: &str) -> bool {
        self.aliases.iter().any(|alias| upper_text.contains(alias))
    }
}

fn pattern(p: &str) -> Option<Regex> {
    let re = Regex::new(p).unwrap_or_else(|e| panic!("profile pattern {p:?}: {e}"));
    assert!(re.captures_len() >= 2, "profile pattern {p:?} has no capture group");
    Some(re)
}

static REGISTRY: LazyLock<Vec<CustomerProfile>> = LazyLock::new(|| {
    vec![
        CustomerProfile {
            key: "clear_vision",
            aliases: &["CLEAR VISION", "CLEARVISION", "CLEAR-VISION"],
            display_name: "Clear Vision Facility Services",
            billing_address: "PO Box 4410, Oak Brook, IL 60522",
            strategy: Strategy::Custom(CustomExtractor::ClearVision),
        },
        CustomerProfile {
            key: "divisions",
            aliases: &["DIVISIONS MAINTENANCE", "DIVISIONS INC", "DIVISIONSINC.COM"],
            display_name: "Divisions Maintenance Group",
            billing_address: "PO Box 2170, Covington, KY 41012",
            strategy: Strategy::Custom(CustomExtractor::Divisions),
        },
        CustomerProfile {
            key: "sms_assist",
            aliases: &["SMS ASSIST", "SMSASSIST"],
            display_name: "SMS Assist",
            billing_address: "PO Box 88120, Chicago, IL 60680",
            strategy: Strategy::PatternMap(PatternMap {
                work_order_number: pattern(r"(?i)\bwork\s*order\s*(?:#|number)?\s*:?\s*(\d{6,})"),
                site_location: pattern(r"(?im)^\s*location\s*:\s*([^\n]+)"),
                site_address: pattern(r"(?im)^\s*address\s*:\s*([^\n]+)"),
                problem_description: pattern(r"(?i)\b(?:issue|problem)\s+description\s*:\s*([^\n]+)"),
                po_number: pattern(
                    r"(?i)\btracking\s*(?:#|number)\s*:?\s*([a-z0-9\-]*\d[a-z0-9\-]*)",
                ),
                skip_po_number: false,
            }),
        },
        CustomerProfile {
            key: "kellermeyer",
            aliases: &["KELLERMEYER BERGENSONS", "KELLERMEYER"],
            display_name: "Kellermeyer Bergensons Services",
            billing_address: "PO Box 3307, Oceanside, CA 92051",
            strategy: Strategy::PatternMap(PatternMap {
                work_order_number: pattern(r"(?i)\b(?:kbs\s+)?(?:wo|work\s*order)\s*#?\s*:?\s*(\d{5,})"),
                site_location: pattern(r"(?i)\bstore\s*name\s*:\s*([^\n]+)"),
                site_address: pattern(r"(?i)\bstore\s*address\s*:\s*([^\n]+)"),
                problem_description: pattern(r"(?i)\b(?:request|problem)\s+details?\s*:\s*([^\n]+)"),
                po_number: pattern(
                    r"(?i)\bcustomer\s+po\s*#?\s*:?\s*([a-z0-9\-]*\d[a-z0-9\-]*)",
                ),
                skip_po_number: false,
            }),
        },
    ]
});

/// All registered profiles, in precedence order.
pub fn registry() -> &'static [CustomerProfile] {
    &REGISTRY
}

/// First profile (in registry order) with an alias anywhere in `text`.
///
/// Alias matching is plain substring containment on the upper-cased text,
/// so a short alias can also fire inside an unrelated word.
pub fn detect_profile(text: &str) -> Option<&'static CustomerProfile> {
    let upper = text.to_uppercase();
    let profile = registry().iter().find(|p| p.matches(&upper))?;
    debug!(profile = profile.key, "Customer profile detected");
    Some(profile)
}

pub fn profile(key: &str) -> Option<&'static CustomerProfile> {
    registry().iter().find(|p| p.key == key)
}
