//! Tolerant number parsing for scraped text
//!
//! Dashboards render numbers as `$1,234.50`, `1.2K`, `98%` or `(12)`. These
//! helpers pull the first number out of such text and never panic.

use gigpulse_snapshot::finite;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(-)[$€£]?|[$€£]\s?)?(\d[\d,]*(?:\.\d+)?)\s*([kKmM])?\b").expect("static regex")
});

/// Collapse runs of whitespace and trim
#[must_use]
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First number in `s`, with `k`/`m` suffixes applied
#[must_use]
pub fn parse_number(s: &str) -> Option<f64> {
    let caps = NUMBER.captures(s)?;
    let digits = caps.get(2)?.as_str().replace(',', "");
    let mut value: f64 = digits.parse().ok()?;
    match caps.get(3).map(|m| m.as_str()) {
        Some("k" | "K") => value *= 1_000.0,
        Some("m" | "M") => value *= 1_000_000.0,
        _ => {}
    }
    if caps.get(1).is_some() {
        value = -value;
    }
    finite(value)
}

/// Non-negative integer count (`1.2K` → 1200)
#[must_use]
pub fn parse_count(s: &str) -> Option<u64> {
    let value = parse_number(s)?;
    if value < 0.0 || value > u64::MAX as f64 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(value.round() as u64)
}

/// Money amount, rounded to cents
#[must_use]
pub fn parse_money(s: &str) -> Option<f64> {
    let value = parse_number(s)?;
    finite((value * 100.0).round() / 100.0)
}

/// Non-empty normalized text
#[must_use]
pub fn parse_text(s: &str) -> Option<String> {
    let text = normalize_ws(s);
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn counts_handle_separators_and_suffixes() {
        assert_eq!(parse_count("1,234"), Some(1234));
        assert_eq!(parse_count("Impressions 1.2K"), Some(1200));
        assert_eq!(parse_count("(12)"), Some(12));
        assert_eq!(parse_count("3m"), Some(3_000_000));
        assert_eq!(parse_count("none"), None);
        assert_eq!(parse_count("-4"), None);
        assert_eq!(parse_count("Late - 4"), Some(4));
    }

    #[test]
    fn money_strips_currency() {
        assert_eq!(parse_money("$1,234.567"), Some(1234.57));
        assert_eq!(parse_money("US$ 80"), Some(80.0));
        assert_eq!(parse_money("€12.5"), Some(12.5));
        assert_eq!(parse_money("-$20.00"), Some(-20.0));
        assert_eq!(parse_money("--"), None);
    }

    #[test]
    fn percent_reads_first_number() {
        assert_eq!(parse_number("98%"), Some(98.0));
        assert_eq!(parse_number("4.9 (120 reviews)"), Some(4.9));
    }

    #[test]
    fn text_is_normalized() {
        assert_eq!(parse_text("  Build\n  a   bot "), Some("Build a bot".into()));
        assert_eq!(parse_text(" \n\t"), None);
    }

    proptest! {
        #[test]
        fn prop_parsers_never_panic_and_stay_finite(s in "\\PC{0,64}") {
            if let Some(v) = parse_number(&s) {
                prop_assert!(v.is_finite());
            }
            let _ = parse_count(&s);
            if let Some(v) = parse_money(&s) {
                prop_assert!(v.is_finite());
            }
        }
    }
}
