//! Nightly stage runner
//!
//! Walks [`NIGHTLY`] in order:
//! - A stage whose requirement is unmet is recorded as skipped; the first
//!   such stage triggers a single alert through the chat channel
//! - A failing stage is recorded and the run goes on
//! - The exit code is `0` iff every terminal stage succeeded
//!
//! Artifacts written by completed stages stay on disk whatever happens later.
//! The single-stage entry points (`extract`, `report_for`, `patch_latest`,
//! `send`) back the manual-recovery subcommands.

use crate::config::PipelineConfig;
use crate::error::{ConfigError, StageError};
use crate::stage::{FailurePolicy, StageName, StageOutcome, StageRecord, NIGHTLY};
use crate::status::RunStatus;
use chrono::{DateTime, NaiveDate, Utc};
use gigpulse_extract::{Extractor, ExtractorConfig, HttpPageSource, PageSource};
use gigpulse_notify::{ChatChannel, DeliveryReport, Notifier, TelegramChannel};
use gigpulse_snapshot::{DataLayout, MetricsSnapshot, Platform, ReportStore, SessionStore, SnapshotStore};
use gigpulse_synth::{Brief, BriefInput, DayMetrics, MessagesClient, Synthesizer, TextGenerator};
use gigpulse_tracker::{DocumentPatcher, PatchReport};
use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Network seams the stages talk through
#[derive(Clone)]
pub struct Services {
    pub pages: Arc<dyn PageSource>,
    /// `None` when no chat credentials are configured
    pub channel: Option<Arc<dyn ChatChannel>>,
    /// `None` runs the template path only
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("channel", &self.channel.is_some())
            .field("generator", &self.generator.is_some())
            .finish_non_exhaustive()
    }
}

impl Services {
    /// Page source only
    #[must_use]
    pub fn new(pages: Arc<dyn PageSource>) -> Self {
        Self {
            pages,
            channel: None,
            generator: None,
        }
    }

    /// Production clients built from the configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let mut services = Self::new(Arc::new(HttpPageSource::new(config.timeouts.page())?));

        if let (Some(token), Some(chat_id)) = (&config.telegram_bot_token, &config.telegram_chat_id) {
            let channel = TelegramChannel::new(token.expose(), chat_id.clone(), config.timeouts.chat())?;
            services = services.with_channel(Arc::new(channel));
        }
        if let Some(key) = &config.anthropic_api_key {
            let timeout = Duration::from_secs(config.synth.timeout_secs);
            let client = MessagesClient::new(key.expose(), config.model.clone(), timeout)?;
            services = services.with_generator(Arc::new(client));
        }
        Ok(services)
    }

    #[must_use]
    pub fn with_channel(mut self, channel: Arc<dyn ChatChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }
}

/// Per-run switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub run_id: Uuid,
    /// Keep the brief local instead of sending it
    pub dry_run: bool,
}

impl RunOptions {
    /// Fresh run id, real delivery
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            dry_run: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Brief produced by `Synthesize`, if it ran
    pub brief: Option<Brief>,
    /// Alert text, when the run short-circuited
    pub alert: Option<String>,
}

/// Values handed from stage to stage
#[derive(Debug, Default)]
struct RunState {
    today: DayMetrics,
    brief: Option<Brief>,
}

fn slot(day: &mut DayMetrics, platform: Platform) -> &mut Option<MetricsSnapshot> {
    match platform {
        Platform::Fiverr => &mut day.fiverr,
        Platform::Upwork => &mut day.upwork,
    }
}

fn alert_text(date: NaiveDate, records: &[StageRecord]) -> String {
    let mut text = format!(
        "GIGPULSE ALERT | {}\nNo marketplace data could be extracted; no brief today.",
        date.format("%Y-%m-%d")
    );
    for record in records {
        if let StageOutcome::Failed { error } = &record.outcome {
            let _ = write!(text, "\n- {}: {error}", record.stage);
        }
    }
    text
}

/// The nightly pipeline with its collaborators
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    services: Services,
    layout: DataLayout,
    snapshots: SnapshotStore,
    sessions: SessionStore,
    reports: ReportStore,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig, services: Services) -> Self {
        let layout = config.layout();
        Self {
            snapshots: SnapshotStore::new(layout.clone()),
            sessions: SessionStore::new(layout.clone()),
            reports: ReportStore::new(layout.clone()),
            layout,
            config,
            services,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Run every stage of [`NIGHTLY`] for the day of `now`
    ///
    /// Never fails: stage errors end up in the returned status, which is
    /// also written to the data directory.
    pub async fn run(&self, now: DateTime<Utc>, options: RunOptions) -> RunOutcome {
        let date = now.date_naive();
        let clock = Instant::now();
        let mut state = RunState::default();
        let mut records: Vec<StageRecord> = Vec::with_capacity(NIGHTLY.len());
        let mut alert = None;
        let mut alert_sent = false;

        tracing::info!(date = %date, dry_run = options.dry_run, "Nightly run started");

        for spec in &NIGHTLY {
            if !spec.requires.is_met(&records) {
                if alert.is_none() {
                    let text = alert_text(date, &records);
                    alert_sent = self.send_alert(&text, options.dry_run).await;
                    alert = Some(text);
                }
                tracing::warn!(stage = %spec.name, "Skipped: no extraction succeeded");
                records.push(StageRecord::skipped(spec.name));
                continue;
            }

            let started = Instant::now();
            let outcome = match self
                .execute(spec.name, now, options.dry_run, &mut state)
                .await
            {
                Ok(()) => {
                    tracing::info!(stage = %spec.name, "Stage complete");
                    StageOutcome::Ok
                }
                Err(err) => {
                    tracing::error!(stage = %spec.name, error = %err, "Stage failed");
                    StageOutcome::failed(&err)
                }
            };
            records.push(StageRecord::new(spec.name, outcome, started.elapsed()));
        }

        let terminal_ok = NIGHTLY
            .iter()
            .filter(|s| s.policy == FailurePolicy::Terminal)
            .all(|s| records.iter().any(|r| r.stage == s.name && r.outcome.is_ok()));
        let elapsed = chrono::Duration::from_std(clock.elapsed()).unwrap_or_else(|_| chrono::Duration::zero());

        let status = RunStatus {
            run_id: options.run_id,
            date,
            started_at: now,
            finished_at: now + elapsed,
            dry_run: options.dry_run,
            alert_sent,
            stages: records,
            exit_code: i32::from(!terminal_ok),
        };
        if let Err(err) = status.save(&self.layout).await {
            tracing::warn!(error = %err, "Failed to persist run status");
        }
        tracing::info!(exit_code = status.exit_code, "Nightly run finished");

        RunOutcome {
            status,
            brief: state.brief,
            alert,
        }
    }

    async fn execute(
        &self,
        stage: StageName,
        now: DateTime<Utc>,
        dry_run: bool,
        state: &mut RunState,
    ) -> Result<(), StageError> {
        let date = now.date_naive();
        match stage {
            StageName::ExtractFiverr | StageName::ExtractUpwork => {
                let platform = if stage == StageName::ExtractFiverr {
                    Platform::Fiverr
                } else {
                    Platform::Upwork
                };
                let snapshot = self.extract(platform, now).await?;
                *slot(&mut state.today, platform) = Some(snapshot);
                Ok(())
            }
            StageName::Synthesize => {
                let input = self.brief_input(date, state.today.clone()).await;
                let brief = self.synthesizer().synthesize(&input).await;
                let written = self.reports.write(date, &brief.text).await;
                state.brief = Some(brief);
                let path = written?;
                tracing::info!(path = %path.display(), "Report written");
                Ok(())
            }
            StageName::PatchTracker => self.patch(date, &state.today).await.map(|_| ()),
            StageName::Notify => {
                let brief = state
                    .brief
                    .as_ref()
                    .ok_or_else(|| StageError::MissingInput("no brief was synthesized".to_string()))?;
                if dry_run {
                    tracing::info!("Dry run: brief kept local");
                    return Ok(());
                }
                self.send(&brief.text).await.map(|_| ())
            }
        }
    }

    async fn send_alert(&self, text: &str, dry_run: bool) -> bool {
        if dry_run {
            tracing::warn!("Dry run: alert kept local");
            return false;
        }
        match self.send(text).await {
            Ok(_) => {
                tracing::warn!("Total extraction failure alert sent");
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to send extraction failure alert");
                false
            }
        }
    }

    /// Extract one platform with its saved session and store the snapshot
    pub async fn extract(&self, platform: Platform, now: DateTime<Utc>) -> Result<MetricsSnapshot, StageError> {
        let mut config = ExtractorConfig::for_platform(platform)?
            .with_throttle(self.config.throttle)
            .with_section_timeout(self.config.timeouts.page());
        if let Some(base) = self.config.base_urls.get(platform) {
            config = config.with_base_url(base.clone());
        }

        let extractor = Extractor::new(platform, Arc::clone(&self.services.pages), config);
        let snapshot = match extractor.run(&self.sessions, now).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                if err.is_auth_expired() {
                    tracing::error!(
                        platform = %platform,
                        "Session expired; log in again and re-save the session file"
                    );
                }
                return Err(err.into());
            }
        };

        self.snapshots.save(&snapshot, now.date_naive()).await?;
        if !snapshot.section_failures.is_empty() {
            tracing::warn!(
                platform = %platform,
                failed = snapshot.section_failures.len(),
                "Partial extraction"
            );
        }
        Ok(snapshot)
    }

    fn synthesizer(&self) -> Synthesizer {
        match &self.services.generator {
            Some(generator) => Synthesizer::with_generator(Arc::clone(generator), self.config.synth.clone()),
            None => Synthesizer::fallback_only(self.config.synth.clone()),
        }
    }

    /// 1-based day number of `date`
    ///
    /// Counts from the configured start date, else the archived days up to
    /// and including `date`.
    pub async fn day_number(&self, date: NaiveDate) -> u32 {
        let days = match self.config.start_date {
            Some(start) => date.signed_duration_since(start).num_days() + 1,
            None => match self.snapshots.archived_dates().await {
                Ok(dates) => i64::try_from(dates.iter().filter(|d| **d <= date).count()).unwrap_or(i64::MAX),
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to list archived days");
                    1
                }
            },
        };
        u32::try_from(days.max(1)).unwrap_or(u32::MAX)
    }

    /// Archived snapshots of one day; unreadable entries count as absent
    pub async fn archived_day(&self, date: NaiveDate) -> DayMetrics {
        let mut day = DayMetrics::default();
        for platform in Platform::ALL {
            match self.snapshots.load_archived(date, platform).await {
                Ok(snapshot) => *slot(&mut day, platform) = snapshot,
                Err(err) => {
                    tracing::warn!(platform = %platform, error = %err, "Ignoring unreadable archive entry");
                }
            }
        }
        day
    }

    /// Latest stored snapshot of each platform
    pub async fn latest_day(&self) -> Result<DayMetrics, StageError> {
        let mut day = DayMetrics::default();
        for platform in Platform::ALL {
            *slot(&mut day, platform) = self.snapshots.load_latest(platform).await?;
        }
        Ok(day)
    }

    /// Brief input for `date`, with yesterday's archive as the baseline
    pub async fn brief_input(&self, date: NaiveDate, today: DayMetrics) -> BriefInput {
        let yesterday = match date.pred_opt() {
            Some(prev) => self.archived_day(prev).await,
            None => DayMetrics::default(),
        };
        BriefInput {
            date,
            day: self.day_number(date).await,
            today,
            yesterday,
        }
    }

    /// Re-synthesize the brief of an archived day without storing it
    pub async fn report_for(&self, date: NaiveDate) -> Result<Brief, StageError> {
        let today = self.archived_day(date).await;
        if today.is_empty() {
            return Err(StageError::MissingInput(format!(
                "no archived snapshots for {}",
                date.format("%Y-%m-%d")
            )));
        }
        let input = self.brief_input(date, today).await;
        Ok(self.synthesizer().synthesize(&input).await)
    }

    /// Patch the tracking document from the given day's snapshots
    pub async fn patch(&self, date: NaiveDate, day: &DayMetrics) -> Result<PatchReport, StageError> {
        let snapshots: Vec<&MetricsSnapshot> = Platform::ALL.into_iter().filter_map(|p| day.get(p)).collect();
        let report = DocumentPatcher::new(self.config.keywords.clone())
            .patch_file(&self.config.tracker_path(), &snapshots, date)
            .await?;
        tracing::info!(
            rows = report.rows_updated.len(),
            cells = report.cells_changed,
            unmatched = report.unmatched_listings.len(),
            "Tracking document patched"
        );
        Ok(report)
    }

    /// Patch the tracking document from the latest stored snapshots
    pub async fn patch_latest(&self, date: NaiveDate) -> Result<PatchReport, StageError> {
        let day = self.latest_day().await?;
        if day.is_empty() {
            return Err(StageError::MissingInput("no stored snapshots".to_string()));
        }
        self.patch(date, &day).await
    }

    /// Deliver text through the chat channel
    pub async fn send(&self, text: &str) -> Result<DeliveryReport, StageError> {
        let channel = self
            .services
            .channel
            .as_ref()
            .ok_or(StageError::NotConfigured("chat channel"))?;
        let report = Notifier::new(Arc::clone(channel), self.config.notifier.clone())
            .deliver(text)
            .await?;
        tracing::info!(
            chunks = report.chunks_sent,
            plain_text = report.plain_text_fallbacks,
            "Message delivered"
        );
        Ok(report)
    }
}
