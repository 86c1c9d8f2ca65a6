//! Run status record, persisted per run date

use crate::stage::{StageName, StageOutcome, StageRecord};
use chrono::{DateTime, NaiveDate, Utc};
use gigpulse_snapshot::{write_atomic, DataLayout, StoreError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened during one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub run_id: Uuid,
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    /// Both extractions failed and the alert went out
    pub alert_sent: bool,
    pub stages: Vec<StageRecord>,
    pub exit_code: i32,
}

impl RunStatus {
    #[must_use]
    pub fn outcome(&self, stage: StageName) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.outcome)
    }

    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// One line per stage, in run order
    #[must_use]
    pub fn status_lines(&self) -> Vec<String> {
        self.stages.iter().map(StageRecord::status_line).collect()
    }

    /// Write to `<data>/status/<date>.json`, replacing an earlier run that day
    pub async fn save(&self, layout: &DataLayout) -> Result<(), StoreError> {
        let path = layout.status_path(self.date);
        let bytes = serde_json::to_vec_pretty(self).map_err(|e| StoreError::json(&path, e))?;
        write_atomic(&path, &bytes).await
    }

    /// Status recorded for a date
    pub async fn load(layout: &DataLayout, date: NaiveDate) -> Result<Self, StoreError> {
        let path = layout.status_path(date);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::json(&path, e))
    }
}
