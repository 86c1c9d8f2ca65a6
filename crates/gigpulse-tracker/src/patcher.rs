//! Tracking-document patcher
//!
//! Two passes over the parsed document:
//! 1. Overwrite metric cells of rows whose id a listing maps to, and the
//!    `Last updated` date
//! 2. Recompute the `Posted: N | Live: M` aggregate from the patched rows
//!
//! The file is written once, after both passes.

use crate::document::{rewrite_cell, Document, Line};
use crate::error::TrackerError;
use crate::table::{is_posted, is_row_id, map_status, Column, KeywordMap, TableKind};
use chrono::NaiveDate;
use gigpulse_snapshot::{write_atomic, Listing, MetricsSnapshot, Platform};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

static LAST_UPDATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*>\s*Last updated:[ \t]*)(.*)$").expect("static regex"));

static AGGREGATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*>\s*Posted:\s*)(\d+)(\s*\|\s*Live:\s*)(\d+)(.*)$").expect("static regex")
});

/// What a patch changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Row ids that had at least one cell rewritten
    pub rows_updated: Vec<String>,
    pub cells_changed: usize,
    /// Listing titles no keyword rule mapped to a row
    pub unmatched_listings: Vec<String>,
    pub last_updated: bool,
    /// Recomputed `(posted, live)` when the document has an aggregate line
    pub aggregate: Option<(usize, usize)>,
}

/// Result of patching text in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub text: String,
    pub report: PatchReport,
}

/// Patches tracking documents from snapshots
#[derive(Debug, Clone, Default)]
pub struct DocumentPatcher {
    keywords: KeywordMap,
}

impl DocumentPatcher {
    #[inline]
    #[must_use]
    pub fn new(keywords: KeywordMap) -> Self {
        Self { keywords }
    }

    /// Map listings to row ids, first listing per id wins
    fn targets<'a>(
        &self,
        snapshots: &[&'a MetricsSnapshot],
        report: &mut PatchReport,
    ) -> HashMap<String, (Platform, &'a Listing)> {
        let mut targets = HashMap::new();
        for snapshot in snapshots.iter().copied() {
            for listing in &snapshot.listings {
                match self.keywords.resolve(snapshot.platform, &listing.title) {
                    Some(id) => {
                        targets
                            .entry(id.to_string())
                            .or_insert((snapshot.platform, listing));
                    }
                    None => report.unmatched_listings.push(listing.title.clone()),
                }
            }
        }
        targets
    }

    /// Patch document text in memory
    #[must_use]
    pub fn patch(&self, text: &str, snapshots: &[&MetricsSnapshot], date: NaiveDate) -> Patched {
        let mut report = PatchReport::default();
        let targets = self.targets(snapshots, &mut report);
        if self.keywords.is_empty() && !report.unmatched_listings.is_empty() {
            tracing::warn!(
                listings = report.unmatched_listings.len(),
                "Keyword map is empty; no listing can reach a tracker row"
            );
        }
        let mut doc = Document::parse(text);

        for line in &mut doc.lines {
            if let Some(caps) = LAST_UPDATED.captures(&line.content) {
                let stamp = date.format("%Y-%m-%d").to_string();
                if &caps[2] != stamp {
                    line.content = format!("{}{stamp}", &caps[1]);
                }
                report.last_updated = true;
                continue;
            }

            let Some((id, kind)) = tracked_row(line) else {
                continue;
            };
            let Some((platform, listing)) = targets.get(&id) else {
                continue;
            };
            if kind.platform() != *platform {
                tracing::debug!(row = %id, "Listing platform does not match table, skipping");
                continue;
            }
            let changed = patch_row(line, kind, listing);
            if changed > 0 {
                report.cells_changed += changed;
                report.rows_updated.push(id);
            }
        }

        report.aggregate = recompute_aggregate(&mut doc);

        tracing::debug!(
            rows = report.rows_updated.len(),
            cells = report.cells_changed,
            unmatched = report.unmatched_listings.len(),
            "Document patched"
        );
        Patched {
            text: doc.render(),
            report,
        }
    }

    /// Patch the document at `path` and write it back atomically
    pub async fn patch_file(
        &self,
        path: &Path,
        snapshots: &[&MetricsSnapshot],
        date: NaiveDate,
    ) -> Result<PatchReport, TrackerError> {
        let original = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TrackerError::Missing(path.to_path_buf()))
            }
            Err(source) => {
                return Err(TrackerError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let patched = self.patch(&original, snapshots, date);
        if patched.text != original {
            write_atomic(path, patched.text.as_bytes()).await?;
        }
        tracing::info!(
            path = %path.display(),
            rows = patched.report.rows_updated.len(),
            "Tracking document updated"
        );
        Ok(patched.report)
    }
}

/// Row id and table kind for a tracked row
fn tracked_row(line: &Line) -> Option<(String, TableKind)> {
    let cells = line.cell_texts()?;
    let first = cells.first()?;
    if !is_row_id(first) {
        return None;
    }
    let kind = TableKind::from_cell_count(cells.len())?;
    Some((first.trim().to_string(), kind))
}

fn cell(line: &Line, idx: usize) -> Option<String> {
    line.cell_texts()?.get(idx).map(|s| (*s).to_string())
}

/// Overwrite one cell if the value differs; returns whether it changed
fn write_cell(line: &mut Line, idx: Option<usize>, value: Option<String>) -> bool {
    let (Some(idx), Some(value)) = (idx, value) else {
        return false;
    };
    let Some(original) = cell(line, idx) else {
        return false;
    };
    if original.trim() == value {
        return false;
    }
    line.set_cell(idx, &rewrite_cell(&original, &value))
}

fn patch_row(line: &mut Line, kind: TableKind, listing: &Listing) -> usize {
    let status = listing
        .status
        .as_deref()
        .and_then(map_status)
        .map(str::to_string);
    let updates = [
        (Column::Status, status),
        (Column::Impressions, listing.impressions.map(|n| n.to_string())),
        (Column::Clicks, listing.clicks.map(|n| n.to_string())),
        (Column::Orders, listing.orders.map(|n| n.to_string())),
    ];
    updates
        .into_iter()
        .filter(|(column, value)| write_cell(line, kind.column(*column), value.clone()))
        .count()
}

/// Second pass: count posted and live rows, rewrite the aggregate line
fn recompute_aggregate(doc: &mut Document) -> Option<(usize, usize)> {
    let (mut posted, mut live) = (0usize, 0usize);
    for line in &doc.lines {
        let Some((_, kind)) = tracked_row(line) else {
            continue;
        };
        if kind
            .column(Column::Posted)
            .and_then(|i| cell(line, i))
            .is_some_and(|c| is_posted(&c))
        {
            posted += 1;
        }
        if kind
            .column(Column::Status)
            .and_then(|i| cell(line, i))
            .is_some_and(|c| c.trim().eq_ignore_ascii_case("live"))
        {
            live += 1;
        }
    }

    let line = doc
        .lines
        .iter_mut()
        .find(|l| AGGREGATE.is_match(&l.content))?;
    let rewritten = AGGREGATE
        .replace(&line.content, |caps: &regex::Captures<'_>| {
            format!("{}{posted}{}{live}{}", &caps[1], &caps[3], &caps[5])
        })
        .into_owned();
    line.content = rewritten;
    Some((posted, live))
}
