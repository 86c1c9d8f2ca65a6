//! Pipeline integration tests
//!
//! Full nightly runs against fake marketplaces, a scripted chat channel and a
//! temporary data directory.

use chrono::NaiveDate;
use gigpulse_extract::Throttle;
use gigpulse_notify::{NotifierConfig, SendError};
use gigpulse_pipeline::{
    Pipeline, PipelineConfig, RunOptions, RunStatus, Services, StageError, StageName, StageOutcome,
};
use gigpulse_snapshot::{DataLayout, Earnings, Platform, SessionStore, SnapshotStore};
use gigpulse_test_utils::{
    fiverr_pages, fiverr_snapshot, run_date, run_time, session, tracker_keywords, upwork_pages,
    FakeChannel, FakeGenerator, FakePageSource, TRACKER_DOC,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const GOOD_BRIEF: &str = "GIGPULSE DAILY BRIEF | Day 12 | 2026-10-17

FIVERR
Available: $320.50

UPWORK
Proposals Sent: 12

TOP MATCHES
1. n8n automation for CRM sync

PRIORITIES
- Deliver the late order";

fn config(root: &Path) -> PipelineConfig {
    PipelineConfig::default()
        .with_data_dir(root.join("data"))
        .with_docs_root(root.join("docs"))
        .with_throttle(Throttle::none())
        .with_notifier(NotifierConfig::immediate())
        .with_keywords(tracker_keywords())
}

fn all_pages() -> Arc<FakePageSource> {
    Arc::new(FakePageSource::with_pages(
        fiverr_pages().into_iter().chain(upwork_pages()),
    ))
}

async fn workspace(logged_in: &[Platform]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let sessions = SessionStore::new(DataLayout::new(dir.path().join("data")));
    for platform in logged_in {
        sessions.save(*platform, &session()).await.unwrap();
    }
    std::fs::create_dir_all(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/TRACKER.md"), TRACKER_DOC).unwrap();
    dir
}

fn pipeline(dir: &TempDir, channel: &Arc<FakeChannel>) -> Pipeline {
    let services = Services::new(all_pages()).with_channel(Arc::clone(channel) as _);
    Pipeline::new(config(dir.path()), services)
}

fn outcomes(status: &RunStatus) -> Vec<(StageName, bool)> {
    status
        .stages
        .iter()
        .map(|r| (r.stage, r.outcome.is_ok()))
        .collect()
}

#[tokio::test]
async fn full_run_sends_brief_and_keeps_artifacts() {
    let dir = workspace(&Platform::ALL).await;
    let channel = Arc::new(FakeChannel::accepting());
    let pipeline = pipeline(&dir, &channel);

    let outcome = pipeline.run(run_time(), RunOptions::new()).await;

    assert!(outcome.status.succeeded());
    assert!(outcome.status.stages.iter().all(|r| r.outcome.is_ok()));
    assert!(!outcome.status.alert_sent);

    let texts = channel.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("GIGPULSE DAILY BRIEF | Day 1 | 2026-10-17"));
    assert!(texts[0].contains("Active Orders: 3"));

    let layout = pipeline.layout();
    let report = std::fs::read_to_string(layout.report_path(run_date())).unwrap();
    assert_eq!(report.trim_end(), texts[0]);
    assert!(layout.history_path(run_date(), Platform::Upwork).exists());

    let tracker = std::fs::read_to_string(dir.path().join("docs/TRACKER.md")).unwrap();
    assert!(tracker.contains("> Last updated: 2026-10-17"));
    assert!(tracker.contains("| 1200  | 45  | 3 |"));

    let stored = RunStatus::load(layout, run_date()).await.unwrap();
    assert_eq!(stored.run_id, outcome.status.run_id);
    assert_eq!(stored.exit_code, 0);
    assert_eq!(stored.stages, outcome.status.stages);
}

#[tokio::test]
async fn expired_session_on_one_platform_still_delivers() {
    let dir = workspace(&[Platform::Fiverr]).await;
    let channel = Arc::new(FakeChannel::accepting());

    let outcome = pipeline(&dir, &channel).run(run_time(), RunOptions::new()).await;

    assert_eq!(
        outcomes(&outcome.status),
        vec![
            (StageName::ExtractFiverr, true),
            (StageName::ExtractUpwork, false),
            (StageName::Synthesize, true),
            (StageName::PatchTracker, true),
            (StageName::Notify, true),
        ]
    );
    assert_eq!(outcome.status.exit_code, 0);
    match outcome.status.outcome(StageName::ExtractUpwork) {
        Some(StageOutcome::Failed { error }) => assert!(error.contains("auth_expired")),
        other => panic!("unexpected outcome: {other:?}"),
    }

    let brief = &channel.texts()[0];
    assert!(brief.contains("Active Orders: 3"));
    assert!(brief.contains("No data this run."));
}

#[tokio::test]
async fn total_extraction_failure_sends_one_alert() {
    let dir = workspace(&[]).await;
    let channel = Arc::new(FakeChannel::accepting());
    let pipeline = pipeline(&dir, &channel);

    let outcome = pipeline.run(run_time(), RunOptions::new()).await;

    assert_eq!(outcome.status.exit_code, 1);
    assert!(outcome.status.alert_sent);
    assert!(outcome.brief.is_none());
    for stage in [StageName::Synthesize, StageName::PatchTracker, StageName::Notify] {
        assert_eq!(outcome.status.outcome(stage), Some(&StageOutcome::Skipped));
    }

    let texts = channel.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("GIGPULSE ALERT | 2026-10-17"));
    assert!(texts[0].contains("extract_fiverr: fiverr: auth_expired"));
    assert!(texts[0].contains("extract_upwork: upwork: auth_expired"));

    assert!(!pipeline.layout().report_path(run_date()).exists());
    let tracker = std::fs::read_to_string(dir.path().join("docs/TRACKER.md")).unwrap();
    assert_eq!(tracker, TRACKER_DOC);
    assert!(pipeline.layout().status_path(run_date()).exists());
}

#[tokio::test]
async fn undeliverable_alert_is_recorded() {
    let dir = workspace(&[]).await;
    let channel = Arc::new(FakeChannel::failing(SendError::Transport("connection refused".into())));

    let outcome = pipeline(&dir, &channel).run(run_time(), RunOptions::new()).await;

    assert_eq!(outcome.status.exit_code, 1);
    assert!(!outcome.status.alert_sent);
    assert!(outcome.alert.is_some());
}

#[tokio::test]
async fn notify_failure_exits_nonzero_and_keeps_artifacts() {
    let dir = workspace(&Platform::ALL).await;
    let channel = Arc::new(FakeChannel::failing(SendError::Transport("connection reset".into())));
    let pipeline = pipeline(&dir, &channel);

    let outcome = pipeline.run(run_time(), RunOptions::new()).await;

    assert_eq!(outcome.status.exit_code, 1);
    assert!(!outcome.status.outcome(StageName::Notify).unwrap().is_ok());
    assert!(outcome.status.outcome(StageName::Synthesize).unwrap().is_ok());
    // one chunk, three attempts
    assert_eq!(channel.sent().len(), 3);

    assert!(pipeline.layout().report_path(run_date()).exists());
    let tracker = std::fs::read_to_string(dir.path().join("docs/TRACKER.md")).unwrap();
    assert!(tracker.contains("| 1200  | 45  | 3 |"));
}

#[tokio::test]
async fn missing_tracker_fails_only_its_stage() {
    let dir = workspace(&Platform::ALL).await;
    std::fs::remove_file(dir.path().join("docs/TRACKER.md")).unwrap();
    let channel = Arc::new(FakeChannel::accepting());

    let outcome = pipeline(&dir, &channel).run(run_time(), RunOptions::new()).await;

    match outcome.status.outcome(StageName::PatchTracker) {
        Some(StageOutcome::Failed { error }) => assert!(error.contains("tracking document not found")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(outcome.status.outcome(StageName::Notify).unwrap().is_ok());
    assert_eq!(outcome.status.exit_code, 0);
}

#[tokio::test]
async fn dry_run_keeps_the_brief_local() {
    let dir = workspace(&Platform::ALL).await;
    let pipeline = Pipeline::new(config(dir.path()), Services::new(all_pages()));

    let outcome = pipeline
        .run(run_time(), RunOptions::new().with_dry_run(true))
        .await;

    assert!(outcome.status.succeeded());
    assert!(outcome.status.dry_run);
    let brief = outcome.brief.unwrap();
    assert!(brief.is_fallback());
    assert!(brief.text.starts_with("GIGPULSE DAILY BRIEF"));
}

#[tokio::test]
async fn notify_without_channel_fails() {
    let dir = workspace(&Platform::ALL).await;
    let pipeline = Pipeline::new(config(dir.path()), Services::new(all_pages()));

    let outcome = pipeline.run(run_time(), RunOptions::new()).await;

    assert_eq!(outcome.status.exit_code, 1);
    assert_eq!(
        outcome.status.outcome(StageName::Notify),
        Some(&StageOutcome::failed("chat channel is not configured"))
    );
}

#[tokio::test]
async fn start_date_and_yesterday_feed_the_generator() {
    let dir = workspace(&Platform::ALL).await;
    let layout = DataLayout::new(dir.path().join("data"));
    let yesterday = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let mut baseline = fiverr_snapshot(run_time());
    baseline.earnings = Some(Earnings {
        available: Some(1000.0),
        ..Earnings::default()
    });
    SnapshotStore::new(layout).save(&baseline, yesterday).await.unwrap();

    let generator = Arc::new(FakeGenerator::replying(GOOD_BRIEF));
    let channel = Arc::new(FakeChannel::accepting());
    let services = Services::new(all_pages())
        .with_channel(Arc::clone(&channel) as _)
        .with_generator(Arc::clone(&generator) as _);
    let config = config(dir.path()).with_start_date(NaiveDate::from_ymd_opt(2026, 10, 6).unwrap());

    let outcome = Pipeline::new(config, services)
        .run(run_time(), RunOptions::new())
        .await;

    let brief = outcome.brief.unwrap();
    assert_eq!(brief.text, GOOD_BRIEF);
    assert_eq!(brief.anomalies.len(), 1);
    assert_eq!(brief.anomalies[0].metric, "Available");

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("\"day\": 12"));
    assert_eq!(channel.texts(), vec![GOOD_BRIEF]);
}

#[tokio::test]
async fn day_counter_falls_back_to_archived_days() {
    let dir = workspace(&[]).await;
    let layout = DataLayout::new(dir.path().join("data"));
    let store = SnapshotStore::new(layout);
    for day in [14, 15, 16] {
        let date = NaiveDate::from_ymd_opt(2026, 10, day).unwrap();
        store.save(&fiverr_snapshot(run_time()), date).await.unwrap();
    }
    let pipeline = Pipeline::new(config(dir.path()), Services::new(all_pages()));

    assert_eq!(pipeline.day_number(run_date()).await, 3);
    assert_eq!(pipeline.day_number(NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()).await, 1);
}

#[tokio::test]
async fn single_stage_commands() {
    let dir = workspace(&Platform::ALL).await;
    let pipeline = Pipeline::new(config(dir.path()), Services::new(all_pages()));

    let snapshot = pipeline.extract(Platform::Fiverr, run_time()).await.unwrap();
    assert_eq!(snapshot.unread(), Some(6));
    assert!(pipeline.layout().latest_snapshot_path(Platform::Fiverr).exists());

    let brief = pipeline.report_for(run_date()).await.unwrap();
    assert!(brief.text.starts_with("GIGPULSE DAILY BRIEF | Day 1 | 2026-10-17"));
    assert!(!pipeline.layout().report_path(run_date()).exists());

    let patched = pipeline.patch_latest(run_date()).await.unwrap();
    assert_eq!(patched.rows_updated, vec!["AW-01", "BI-01"]);

    let err = pipeline.send("hello").await.unwrap_err();
    assert!(matches!(err, StageError::NotConfigured(_)));

    let err = pipeline
        .report_for(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, StageError::MissingInput(_)));
}
