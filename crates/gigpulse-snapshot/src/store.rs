//! Filesystem stores
//!
//! All writes go through [`write_atomic`] so a crash mid-run never leaves a
//! half-written snapshot, session or report behind. Same-day reruns simply
//! overwrite the dated files.

use crate::error::StoreError;
use crate::platform::Platform;
use crate::session::AuthSession;
use crate::snapshot::MetricsSnapshot;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Write `bytes` to `path` via a sibling temp file and rename
///
/// Parent directories are created as needed.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| StoreError::json(path, e))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| StoreError::json(path, e))?;
    bytes.push(b'\n');
    write_atomic(path, &bytes).await
}

/// Paths of everything under the data root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn session_path(&self, platform: Platform) -> PathBuf {
        self.root.join("sessions").join(format!("{platform}.json"))
    }

    #[must_use]
    pub fn latest_snapshot_path(&self, platform: Platform) -> PathBuf {
        self.root
            .join("snapshots")
            .join(format!("{platform}-latest.json"))
    }

    #[must_use]
    pub fn history_dir(&self) -> PathBuf {
        self.root.join("history")
    }

    #[must_use]
    pub fn history_path(&self, date: NaiveDate, platform: Platform) -> PathBuf {
        self.history_dir()
            .join(date.format("%Y-%m-%d").to_string())
            .join(format!("{platform}.json"))
    }

    #[must_use]
    pub fn report_path(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join("reports")
            .join(format!("{}.txt", date.format("%Y-%m-%d")))
    }

    #[must_use]
    pub fn status_path(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join("status")
            .join(format!("{}.json", date.format("%Y-%m-%d")))
    }
}

/// Latest snapshots plus the date-keyed history archive
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    layout: DataLayout,
}

impl SnapshotStore {
    #[inline]
    #[must_use]
    pub fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    /// Write the snapshot as the platform's latest and as the archive entry for `date`
    pub async fn save(&self, snapshot: &MetricsSnapshot, date: NaiveDate) -> Result<(), StoreError> {
        let latest = self.layout.latest_snapshot_path(snapshot.platform);
        write_json(&latest, snapshot).await?;

        let archived = self.layout.history_path(date, snapshot.platform);
        write_json(&archived, snapshot).await?;

        tracing::debug!(
            platform = %snapshot.platform,
            latest = %latest.display(),
            archived = %archived.display(),
            "Snapshot saved"
        );
        Ok(())
    }

    /// Latest snapshot for platform, `None` if never written
    pub async fn load_latest(&self, platform: Platform) -> Result<Option<MetricsSnapshot>, StoreError> {
        optional(read_json(&self.layout.latest_snapshot_path(platform)).await)
    }

    /// Archived snapshot for a calendar date, `None` if absent
    pub async fn load_archived(
        &self,
        date: NaiveDate,
        platform: Platform,
    ) -> Result<Option<MetricsSnapshot>, StoreError> {
        optional(read_json(&self.layout.history_path(date, platform)).await)
    }

    /// Sorted dates that have at least one archived snapshot
    pub async fn archived_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let dir = self.layout.history_dir();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir, e)),
        };

        let mut dates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&dir, e))?
        {
            let name = entry.file_name();
            if let Some(date) = name
                .to_str()
                .and_then(|n| NaiveDate::parse_from_str(n, "%Y-%m-%d").ok())
            {
                dates.push(date);
            }
        }
        dates.sort_unstable();
        Ok(dates)
    }
}

/// Per-platform session blobs
#[derive(Debug, Clone)]
pub struct SessionStore {
    layout: DataLayout,
}

impl SessionStore {
    #[inline]
    #[must_use]
    pub fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    /// Read the session for platform
    pub async fn load(&self, platform: Platform) -> Result<AuthSession, StoreError> {
        read_json(&self.layout.session_path(platform)).await
    }

    /// Rewrite the session for platform
    pub async fn save(&self, platform: Platform, session: &AuthSession) -> Result<(), StoreError> {
        write_json(&self.layout.session_path(platform), session).await
    }
}

/// Dated plain-text reports
#[derive(Debug, Clone)]
pub struct ReportStore {
    layout: DataLayout,
}

impl ReportStore {
    #[inline]
    #[must_use]
    pub fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    /// Write the report for `date`, returning its path
    pub async fn write(&self, date: NaiveDate, text: &str) -> Result<PathBuf, StoreError> {
        let path = self.layout.report_path(date);
        write_atomic(&path, text.as_bytes()).await?;
        Ok(path)
    }

    /// Read the report for `date`
    pub async fn read(&self, date: NaiveDate) -> Result<String, StoreError> {
        let path = self.layout.report_path(date);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))
    }
}

fn optional<T>(result: Result<T, StoreError>) -> Result<Option<T>, StoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
