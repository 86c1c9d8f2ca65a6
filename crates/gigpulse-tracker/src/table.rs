//! Table recognition, keyword mapping and status vocabulary

use gigpulse_snapshot::Platform;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ROW_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,3}-\d{2}$").expect("static regex"));

/// Check if `cell` (untrimmed) is a tracked row id like `AW-01`
#[must_use]
pub fn is_row_id(cell: &str) -> bool {
    ROW_ID.is_match(cell.trim())
}

/// Tracked table, told apart by interior cell count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// `ID | Title | Status | Posted | Impressions | Clicks | Orders | Notes`
    FiverrGigs,
    /// `ID | Project | Status | Posted | Impressions | Orders | Notes`
    UpworkCatalog,
}

/// Patchable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Status,
    Posted,
    Impressions,
    Clicks,
    Orders,
}

impl TableKind {
    /// Kind for a row with `cells` interior cells; other counts are not tracked
    #[must_use]
    pub fn from_cell_count(cells: usize) -> Option<Self> {
        match cells {
            8 => Some(Self::FiverrGigs),
            7 => Some(Self::UpworkCatalog),
            _ => None,
        }
    }

    #[must_use]
    pub fn platform(self) -> Platform {
        match self {
            Self::FiverrGigs => Platform::Fiverr,
            Self::UpworkCatalog => Platform::Upwork,
        }
    }

    /// Cell index of a column, `None` if the table has no such column
    #[must_use]
    pub fn column(self, column: Column) -> Option<usize> {
        match (self, column) {
            (_, Column::Status) => Some(2),
            (_, Column::Posted) => Some(3),
            (_, Column::Impressions) => Some(4),
            (Self::FiverrGigs, Column::Clicks) => Some(5),
            (Self::UpworkCatalog, Column::Clicks) => None,
            (Self::FiverrGigs, Column::Orders) => Some(6),
            (Self::UpworkCatalog, Column::Orders) => Some(5),
        }
    }
}

/// Document status for a scraped listing status
///
/// Unknown wording maps to `None` and leaves the cell alone.
#[must_use]
pub fn map_status(raw: &str) -> Option<&'static str> {
    let s = raw.to_ascii_lowercase();
    if s.contains("draft") {
        Some("Draft")
    } else if s.contains("pause") || s.contains("inactive") {
        Some("Paused")
    } else if s.contains("review") || s.contains("pending") || s.contains("approval") {
        Some("Review")
    } else if s.contains("live") || s.contains("active") || s.contains("published") || s.contains("running") {
        Some("Live")
    } else {
        None
    }
}

/// Check if a `Posted` cell holds a real date rather than a placeholder
#[must_use]
pub fn is_posted(cell: &str) -> bool {
    let t = cell.trim();
    !t.is_empty() && !t.chars().all(|c| matches!(c, '-' | '–' | '—'))
}

/// Listing title keyword mapped to a row id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub platform: Platform,
    pub keyword: String,
    pub id: String,
}

/// Ordered keyword rules; first match wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordMap {
    rules: Vec<KeywordRule>,
}

impl KeywordMap {
    #[must_use]
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Add a rule at the lowest priority
    #[must_use]
    pub fn with_rule(mut self, platform: Platform, keyword: impl Into<String>, id: impl Into<String>) -> Self {
        self.rules.push(KeywordRule {
            platform,
            keyword: keyword.into(),
            id: id.into(),
        });
        self
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Row id for a listing title
    #[must_use]
    pub fn resolve(&self, platform: Platform, title: &str) -> Option<&str> {
        let title = title.to_lowercase();
        self.rules
            .iter()
            .filter(|r| r.platform == platform && !r.keyword.is_empty())
            .find(|r| title.contains(&r.keyword.to_lowercase()))
            .map(|r| r.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_ids() {
        assert!(is_row_id(" AW-01 "));
        assert!(is_row_id("DBX-12"));
        assert!(!is_row_id("A-01"));
        assert!(!is_row_id("AW-1"));
        assert!(!is_row_id("ID"));
        assert!(!is_row_id("aw-01"));
    }

    #[test]
    fn cell_count_selects_table() {
        assert_eq!(TableKind::from_cell_count(8), Some(TableKind::FiverrGigs));
        assert_eq!(TableKind::from_cell_count(7), Some(TableKind::UpworkCatalog));
        assert_eq!(TableKind::from_cell_count(6), None);
        assert_eq!(TableKind::UpworkCatalog.column(Column::Clicks), None);
        assert_eq!(TableKind::UpworkCatalog.column(Column::Orders), Some(5));
    }

    #[test]
    fn status_vocabulary() {
        assert_eq!(map_status("ACTIVE"), Some("Live"));
        assert_eq!(map_status("Paused"), Some("Paused"));
        assert_eq!(map_status("inactive"), Some("Paused"));
        assert_eq!(map_status("Pending Approval"), Some("Review"));
        assert_eq!(map_status("draft"), Some("Draft"));
        assert_eq!(map_status("denied"), None);
    }

    #[test]
    fn placeholders_are_not_posted() {
        assert!(is_posted(" 2026-10-01 "));
        assert!(!is_posted("  "));
        assert!(!is_posted(" -- "));
        assert!(!is_posted(" — "));
    }

    #[test]
    fn keyword_first_match_per_platform() {
        let map = KeywordMap::default()
            .with_rule(Platform::Fiverr, "workflow", "AW-01")
            .with_rule(Platform::Fiverr, "automation", "AW-02")
            .with_rule(Platform::Upwork, "workflow", "UP-01");
        assert_eq!(map.resolve(Platform::Fiverr, "I will build n8n Workflow automation"), Some("AW-01"));
        assert_eq!(map.resolve(Platform::Upwork, "Workflow audit"), Some("UP-01"));
        assert_eq!(map.resolve(Platform::Fiverr, "Logo design"), None);
    }
}
