//! String clean-up shared by every extractor. OCR output arrives with ragged
//! spacing, stray labels and inconsistent case; these helpers turn captured
//! fragments into presentable values.

use regex::Regex;
use std::sync::LazyLock;

/// Tokens that stay upper-case after title-casing.
const KEEP_UPPER: &[&str] = &["NE", "NW", "SE", "SW", "LLC", "PO", "USA"];

static LEADING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:site\s+|store\s+|location\s+)?(?:name|address|addr|location|store|site|attn|attention|contact)\b\s*[:#\-]?\s*",
    )
    .unwrap()
});

static TRAILING_CONTACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\b(?:phone|tel|fax|ph)\b\s*[:#.]?.*$").unwrap());

static CITY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([a-z][a-z .'\-]*?)\s*,?\s+([a-z]{2})\.?,?\s+(\d{5}(?:-\d{4})?)\s*$")
        .unwrap()
});

static SINGLE_LINE_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?\S)\s*,?\s+([a-z]{2})\.?,?\s+(\d{5}(?:-\d{4})?)\s*$").unwrap()
});

static DESCRIPTION_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:work\s*order|w\.?o\.?)\s*(?:#|no\.?|number)?\s*:?\s*\d{4,}\b|#\s*\d{5,}\b|\b\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}\b",
    )
    .unwrap()
});

/// Lines that open a new section and therefore end a description block.
static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:service\s+location|site\s+(?:name|address)|location|address|nte|not\s+to\s+exceed|priority|scheduled|due\s+date|dispatch|contact|phone|bill\s+to|ship\s+to|work\s+order|purchase\s+order|(?:client|customer)\s+po|requested\s+by|trade|category|store\s+(?:name|#|number))\b|p\.?o\.?\s*(?:#|:|no\b|number\b))",
    )
    .unwrap()
});

static STORE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s*\d+\s*[-:]?\s*").unwrap());

/// Collapse every run of whitespace (including newlines) to a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed, whitespace-collapsed value, or `None` if nothing is left.
pub fn non_empty(s: &str) -> Option<String> {
    let collapsed = collapse_whitespace(s);
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(title_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_word(word: &str) -> String {
    let upper = word.to_uppercase();
    if KEEP_UPPER.contains(&upper.trim_end_matches([',', '.'])) {
        return upper;
    }

    let mut out = String::with_capacity(word.len());
    let mut at_start = true;
    for c in word.chars() {
        if c.is_alphabetic() {
            if at_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_start = false;
        } else {
            out.push(c);
            // "north-west", "a/c" start a new word part
            at_start = matches!(c, '-' | '/' | '(');
        }
    }
    out
}

/// Drop leading field labels ("Name:", "Site Address -") and trailing contact
/// details ("Phone: 555...") that bleed into a capture.
pub fn strip_noise_labels(s: &str) -> String {
    let mut current = s.trim().to_string();
    loop {
        let stripped = LEADING_LABEL.replace(&current, "").into_owned();
        if stripped == current {
            break;
        }
        current = stripped;
    }
    TRAILING_CONTACT
        .replace(&current, "")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | ','))
        .to_string()
}

/// Truncate to at most `max` characters on a char boundary.
pub fn clamp(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s.to_string(),
    }
}

/// Non-empty, trimmed lines.
pub fn content_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Turn a captured problem-description block into one presentable sentence:
/// stop at the next section header, drop work-order numbers and dates that
/// bled into the capture, collapse whitespace, clamp, capitalize.
pub fn clean_description(raw: &str, max: usize) -> Option<String> {
    let mut kept = Vec::new();
    for (i, line) in content_lines(raw).into_iter().enumerate() {
        if i > 0 && SECTION_HEADER.is_match(line) {
            break;
        }
        kept.push(line);
    }

    let joined = kept.join(" ");
    let stripped = DESCRIPTION_NOISE.replace_all(&joined, " ");
    let collapsed = collapse_whitespace(&stripped);
    let trimmed = collapsed.trim_matches(|c: char| matches!(c, ':' | '-' | ',' | ';') || c.is_whitespace());
    let clamped = clamp(trimmed, max);

    let mut chars = clamped.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// "City ST 12345" split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityLine {
    pub city: String,
    pub state: String,
    pub zip: String,
}

pub fn parse_city_line(line: &str) -> Option<CityLine> {
    let caps = CITY_LINE.captures(line)?;
    Some(CityLine {
        city: title_case(&caps[1]),
        state: caps[2].to_uppercase(),
        zip: caps[3].to_string(),
    })
}

/// True if the line reads like a street line: a house number followed by words.
pub fn looks_like_street(line: &str) -> bool {
    let line = line.trim();
    let mut parts = line.splitn(2, char::is_whitespace);
    let number = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default();
    number.chars().next().is_some_and(|c| c.is_ascii_digit())
        && number.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && rest.chars().any(char::is_alphabetic)
        && parse_city_line(line).is_none()
}

/// "Street, City, ST ZIP".
pub fn format_address(street: &str, city: &CityLine) -> String {
    format!(
        "{}, {}, {} {}",
        title_case(&strip_noise_labels(street)),
        city.city,
        city.state,
        city.zip
    )
}

/// Normalize an address captured on a single line. A trailing "ST 12345" is
/// kept upper-case; everything before it is title-cased.
pub fn normalize_address(raw: &str) -> Option<String> {
    let cleaned = collapse_whitespace(&strip_noise_labels(raw));
    if cleaned.is_empty() {
        return None;
    }
    match SINGLE_LINE_ADDRESS.captures(&cleaned) {
        Some(caps) => {
            let head = caps[1].trim_end_matches(',');
            Some(format!(
                "{}, {} {}",
                title_case(head),
                caps[2].to_uppercase(),
                &caps[3]
            ))
        }
        None => Some(title_case(&cleaned)),
    }
}

/// Find the first street line followed by a "City ST ZIP" line and join
/// them. A single line between the two (suite, neighborhood) is folded into
/// the street part.
pub fn find_address_block(lines: &[&str]) -> Option<String> {
    for (i, line) in lines.iter().enumerate() {
        if !looks_like_street(line) {
            continue;
        }
        if let Some(city) = lines.get(i + 1).and_then(|l| parse_city_line(l)) {
            return Some(format_address(line, &city));
        }
        let extra = lines.get(i + 1).filter(|l| !l.contains(':'));
        let city = lines.get(i + 2).and_then(|l| parse_city_line(l));
        if let (Some(extra), Some(city)) = (extra, city) {
            return Some(format_address(&format!("{line} {extra}"), &city));
        }
    }
    None
}

/// Drop a leading store number ("#122 Sweetgreen" -> "Sweetgreen").
pub fn strip_store_prefix(s: &str) -> String {
    STORE_PREFIX.replace(s.trim(), "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(non_empty(" \n "), None);
    }

    #[test]
    fn title_cases_words() {
        assert_eq!(title_case("sweetgreen restaurant #122"), "Sweetgreen Restaurant #122");
        assert_eq!(title_case("1471 N. MILWAUKEE AVE"), "1471 N. Milwaukee Ave");
        assert_eq!(title_case("winston-salem nw"), "Winston-Salem NW");
    }

    #[test]
    fn strips_labels() {
        assert_eq!(strip_noise_labels("Site Name: Target #12"), "Target #12");
        assert_eq!(strip_noise_labels("Address: 12 Main St Phone: 555-1234"), "12 Main St");
    }

    #[test]
    fn clamps_on_char_boundary() {
        assert_eq!(clamp("héllo world", 5), "héllo");
        assert_eq!(clamp("short", 50), "short");
    }

    #[test]
    fn description_cleanup() {
        let raw = "replace shattered front door glass 03/14/2024\nwo# 4412345 customer waiting\nnte: $500";
        assert_eq!(
            clean_description(raw, 500).unwrap(),
            "Replace shattered front door glass customer waiting"
        );
        assert_eq!(clean_description(" -- ", 500), None);
        assert_eq!(clean_description("broken window pane", 6).unwrap(), "Broken");
    }

    #[test]
    fn description_noise_spanning_joined_lines() {
        let raw = "glass cracked 03/02/2024 wo# 5512345\nreplace asap";
        assert_eq!(
            clean_description(raw, 500).as_deref(),
            Some("Glass cracked replace asap")
        );
    }

    #[test]
    fn parses_city_line() {
        let city = parse_city_line("chicago il 60622").unwrap();
        assert_eq!(city.city, "Chicago");
        assert_eq!(city.state, "IL");
        assert_eq!(city.zip, "60622");
        assert!(parse_city_line("San Jose, CA 95112-1234").is_some());
        assert!(parse_city_line("1471 milwaukee ave").is_none());
    }

    #[test]
    fn street_detection() {
        assert!(looks_like_street("1471 N. Milwaukee Ave Wicker Park"));
        assert!(!looks_like_street("#122 Sweetgreen"));
        assert!(!looks_like_street("60622"));
    }

    #[test]
    fn address_block_from_ragged_lines() {
        let lines = ["Sweetgreen", "1471 n. milwaukee ave", "chicago il 60622"];
        assert_eq!(
            find_address_block(&lines).unwrap(),
            "1471 N. Milwaukee Ave, Chicago, IL 60622"
        );
    }

    #[test]
    fn address_block_folds_middle_line() {
        let lines = ["1200 w. lake st", "suite 4", "oak park il 60301"];
        assert_eq!(
            find_address_block(&lines).unwrap(),
            "1200 W. Lake St Suite 4, Oak Park, IL 60301"
        );
    }

    #[test]
    fn store_prefix() {
        assert_eq!(strip_store_prefix("#122 Sweetgreen Restaurant #122"), "Sweetgreen Restaurant #122");
        assert_eq!(strip_store_prefix("Sweetgreen"), "Sweetgreen");
    }

    #[test]
    fn single_line_address() {
        assert_eq!(
            normalize_address("address: 200 e randolph st, chicago, il 60601").unwrap(),
            "200 E Randolph St, Chicago, IL 60601"
        );
        assert_eq!(normalize_address("  ").as_deref(), None);
    }
}
