//! Selector cascades
//!
//! Each logical metric is an ordered list of pure strategies over a parsed
//! document (or one row element of it):
//! 1. Structural lookups (`Css`, `Attr`, `OwnAttr`)
//! 2. Text-pattern fallbacks (`LabelNumber`, `NumberLabel`)
//!
//! The first strategy that yields text the field parser accepts wins. When
//! all of them miss the field is `None`; nothing here returns an error.

use crate::parse::{normalize_ws, parse_count, parse_money, parse_number, parse_text};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// One way of locating a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Text of the first element matching a CSS selector
    Css(&'static str),
    /// Attribute of the first element matching a CSS selector
    Attr(&'static str, &'static str),
    /// Attribute of the scope element itself
    OwnAttr(&'static str),
    /// A label followed by a number in the visible text (`Unread: 4`)
    LabelNumber(&'static str),
    /// A number followed by a label in the visible text (`4 unread`)
    NumberLabel(&'static str),
}

impl Strategy {
    /// Run the strategy against `scope`
    #[must_use]
    pub fn apply(&self, scope: ElementRef<'_>) -> Option<String> {
        match *self {
            Strategy::Css(css) => {
                let selector = selector(css)?;
                scope
                    .select(&selector)
                    .map(element_text)
                    .find(|t| !t.is_empty())
            }
            Strategy::Attr(css, attr) => {
                let selector = selector(css)?;
                scope
                    .select(&selector)
                    .filter_map(|el| el.value().attr(attr))
                    .map(str::trim)
                    .find(|v| !v.is_empty())
                    .map(str::to_string)
            }
            Strategy::OwnAttr(attr) => scope
                .value()
                .attr(attr)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            Strategy::LabelNumber(label) => {
                let pattern = format!(
                    r"(?i){}[^\d]{{0,24}}?([$€£]?\s?\d[\d,]*(?:\.\d+)?\s?[kKmM%]?)",
                    regex::escape(label)
                );
                capture(&pattern, &element_text(scope))
            }
            Strategy::NumberLabel(label) => {
                let pattern = format!(
                    r"(?i)([$€£]?\d[\d,]*(?:\.\d+)?[kKmM]?)\s*{}",
                    regex::escape(label)
                );
                capture(&pattern, &element_text(scope))
            }
        }
    }
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(_) => {
            tracing::warn!(selector = css, "Invalid selector in cascade");
            None
        }
    }
}

fn capture(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Visible text of an element, whitespace-normalized
#[must_use]
pub fn element_text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<Vec<_>>().join(" "))
}

/// Ordered fallbacks for one logical field
#[derive(Debug, Clone, Copy)]
pub struct Cascade {
    /// Field name, for tracing
    pub field: &'static str,
    /// Strategies in priority order
    pub strategies: &'static [Strategy],
}

impl Cascade {
    #[inline]
    #[must_use]
    pub const fn new(field: &'static str, strategies: &'static [Strategy]) -> Self {
        Self { field, strategies }
    }

    /// First strategy whose output `parse` accepts
    pub fn resolve<T>(&self, scope: ElementRef<'_>, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        for (idx, strategy) in self.strategies.iter().enumerate() {
            if let Some(value) = strategy.apply(scope).as_deref().and_then(&parse) {
                tracing::trace!(field = self.field, strategy = idx, "Cascade hit");
                return Some(value);
            }
        }
        tracing::debug!(field = self.field, "Cascade miss");
        None
    }

    #[must_use]
    pub fn count(&self, scope: ElementRef<'_>) -> Option<u64> {
        self.resolve(scope, parse_count)
    }

    #[must_use]
    pub fn money(&self, scope: ElementRef<'_>) -> Option<f64> {
        self.resolve(scope, parse_money)
    }

    #[must_use]
    pub fn number(&self, scope: ElementRef<'_>) -> Option<f64> {
        self.resolve(scope, parse_number)
    }

    #[must_use]
    pub fn text(&self, scope: ElementRef<'_>) -> Option<String> {
        self.resolve(scope, parse_text)
    }
}

/// Ordered fallbacks for locating repeated rows (gigs, job tiles)
#[derive(Debug, Clone, Copy)]
pub struct RowCascade {
    pub name: &'static str,
    pub selectors: &'static [&'static str],
}

impl RowCascade {
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str, selectors: &'static [&'static str]) -> Self {
        Self { name, selectors }
    }

    /// Rows from the first selector that matches anything
    #[must_use]
    pub fn rows<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        for css in self.selectors {
            let Some(selector) = selector(css) else {
                continue;
            };
            let rows: Vec<_> = doc.select(&selector).collect();
            if !rows.is_empty() {
                tracing::trace!(rows = self.name, selector = *css, count = rows.len(), "Rows found");
                return rows;
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNREAD: Cascade = Cascade::new(
        "unread",
        &[
            Strategy::Css("[data-testid='unread-count']"),
            Strategy::Attr("[data-unread]", "data-unread"),
            Strategy::LabelNumber("Unread"),
            Strategy::NumberLabel("unread"),
        ],
    );

    fn root(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn first_structural_strategy_wins() {
        let doc = root(
            r#"<div><span data-testid="unread-count">7</span><p data-unread="3">Unread: 2</p></div>"#,
        );
        assert_eq!(UNREAD.count(doc.root_element()), Some(7));
    }

    #[test]
    fn falls_through_to_attribute() {
        let doc = root(r#"<p data-unread="3">messages</p>"#);
        assert_eq!(UNREAD.count(doc.root_element()), Some(3));
    }

    #[test]
    fn falls_through_to_label_pattern() {
        let doc = root("<div><h2>Inbox</h2><p>Unread messages: 12</p></div>");
        assert_eq!(UNREAD.count(doc.root_element()), Some(12));
    }

    #[test]
    fn falls_through_to_number_then_label() {
        let doc = root("<div><p>You have 5 unread conversations</p></div>");
        assert_eq!(UNREAD.count(doc.root_element()), Some(5));
    }

    #[test]
    fn unparseable_structural_hit_does_not_win() {
        let doc = root(
            r#"<span data-testid="unread-count">n/a</span><p>Unread: 4</p>"#,
        );
        assert_eq!(UNREAD.count(doc.root_element()), Some(4));
    }

    #[test]
    fn all_strategies_missing_is_none() {
        let doc = root("<div><p>Welcome back</p></div>");
        assert_eq!(UNREAD.count(doc.root_element()), None);
    }

    #[test]
    fn invalid_selector_is_skipped() {
        const BROKEN: Cascade =
            Cascade::new("broken", &[Strategy::Css("div[[["), Strategy::LabelNumber("Total")]);
        let doc = root("<p>Total 9</p>");
        assert_eq!(BROKEN.count(doc.root_element()), Some(9));
    }

    #[test]
    fn row_cascade_uses_first_matching_selector() {
        const ROWS: RowCascade = RowCascade::new("gigs", &["[data-testid='gig-row']", "tr.gig"]);
        let doc = root(
            r#"<table><tr class="gig"><td>A</td></tr><tr class="gig"><td>B</td></tr></table>"#,
        );
        let rows = ROWS.rows(&doc);
        assert_eq!(rows.len(), 2);
        assert_eq!(element_text(rows[1]), "B");
    }

    #[test]
    fn own_attr_reads_scope_element() {
        const STATUS: Cascade = Cascade::new("status", &[Strategy::OwnAttr("data-status")]);
        let doc = root(r#"<div class="gig" data-status="active">x</div>"#);
        let sel = Selector::parse("div.gig").unwrap();
        let row = doc.select(&sel).next().unwrap();
        assert_eq!(STATUS.text(row).as_deref(), Some("active"));
    }
}
