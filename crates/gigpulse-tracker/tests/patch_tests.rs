//! Document patcher tests against the fixture tracker

use gigpulse_snapshot::{Listing, MetricsSnapshot, Platform};
use gigpulse_test_utils::{
    fiverr_snapshot, run_date, run_time, tracker_keywords, upwork_snapshot, TRACKER_DOC,
};
use gigpulse_tracker::{DocumentPatcher, KeywordMap, TrackerError};
use pretty_assertions::assert_eq;

fn patcher() -> DocumentPatcher {
    DocumentPatcher::new(tracker_keywords())
}

fn changed_lines(before: &str, after: &str) -> Vec<(String, String)> {
    before
        .lines()
        .zip(after.lines())
        .filter(|(a, b)| a != b)
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

#[test]
fn patches_both_tables_and_aggregate() {
    let fiverr = fiverr_snapshot(run_time());
    let upwork = upwork_snapshot(run_time());
    let patched = patcher().patch(TRACKER_DOC, &[&fiverr, &upwork], run_date());

    assert_eq!(
        changed_lines(TRACKER_DOC, &patched.text),
        vec![
            (
                "> Last updated: 2026-10-10".to_string(),
                "> Last updated: 2026-10-17".to_string()
            ),
            (
                "| AW-01 | n8n Workflow Automation | Live    | 2026-09-20 | 900   | 30  | 2 | top gig |".to_string(),
                "| AW-01 | n8n Workflow Automation | Live    | 2026-09-20 | 1200  | 45  | 3 | top gig |".to_string()
            ),
            (
                "| BI-01 | KPI Dashboard           | Live    | 2026-09-25 | 250   | 10  | 0 |  |".to_string(),
                "| BI-01 | KPI Dashboard           | Paused  | 2026-09-25 | 310   | 12  | 0 |  |".to_string()
            ),
            (
                "| UP-01 | Automated reporting pipeline | Review | -- | 40 | 0 | |".to_string(),
                "| UP-01 | Automated reporting pipeline | Live   | -- | 88 | 1 | |".to_string()
            ),
        ]
    );
    assert_eq!(patched.report.aggregate, Some((3, 3)));
    assert_eq!(patched.report.rows_updated, vec!["AW-01", "BI-01", "UP-01"]);
    assert_eq!(patched.text.len(), TRACKER_DOC.len());
}

#[test]
fn unknown_ids_change_only_last_updated() {
    let mut snap = MetricsSnapshot::new(Platform::Fiverr, run_time());
    snap.listings = vec![Listing {
        impressions: Some(10_000),
        ..Listing::titled("Logo design in 24h")
    }];
    let patched = patcher().patch(TRACKER_DOC, &[&snap], run_date());

    assert_eq!(patched.text, TRACKER_DOC.replace("2026-10-10", "2026-10-17"));
    assert!(patched.report.rows_updated.is_empty());
}

#[test]
fn repatching_is_stable() {
    let fiverr = fiverr_snapshot(run_time());
    let once = patcher().patch(TRACKER_DOC, &[&fiverr], run_date()).text;
    let twice = patcher().patch(&once, &[&fiverr], run_date()).text;
    assert_eq!(once, twice);
}

#[test]
fn empty_keyword_map_touches_no_rows() {
    let fiverr = fiverr_snapshot(run_time());
    let patched = DocumentPatcher::new(KeywordMap::default()).patch(TRACKER_DOC, &[&fiverr], run_date());
    assert_eq!(patched.report.unmatched_listings.len(), 2);
    assert_eq!(patched.report.cells_changed, 0);
}

#[tokio::test]
async fn patch_file_writes_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("TRACKER.md");
    std::fs::write(&path, TRACKER_DOC).unwrap();

    let fiverr = fiverr_snapshot(run_time());
    let report = patcher().patch_file(&path, &[&fiverr], run_date()).await.unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("| 1200  | 45  | 3 |"));
    assert_eq!(report.rows_updated, vec!["AW-01", "BI-01"]);
    assert!(!dir.path().join("TRACKER.md.tmp").exists());
}

#[tokio::test]
async fn missing_document_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = patcher()
        .patch_file(&dir.path().join("TRACKER.md"), &[], run_date())
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Missing(_)));
    assert!(err.is_missing());
}
