//! Per-platform extraction run
//!
//! Visits every section of a [`PlatformSpec`] in order with one session:
//! - Throttles between navigations
//! - Bounds each navigation with a timeout
//! - Turns a login-page landing into `AuthExpired`
//! - Absorbs every other section failure into the snapshot

use crate::error::{ExtractError, FetchError};
use crate::section::PlatformSpec;
use crate::source::PageSource;
use crate::throttle::Throttle;
use chrono::{DateTime, Utc};
use gigpulse_snapshot::{AuthSession, MetricsSnapshot, Platform, SessionStore};
use std::time::Duration;
use url::Url;

/// Per-navigation tuning
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Root all section paths are resolved against
    pub base_url: Url,
    /// Budget for one navigation
    pub section_timeout: Duration,
    /// Delay between navigations
    pub throttle: Throttle,
}

impl ExtractorConfig {
    /// Production defaults for a platform
    pub fn for_platform(platform: Platform) -> Result<Self, FetchError> {
        let spec = PlatformSpec::for_platform(platform);
        let base_url = Url::parse(spec.default_base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", spec.default_base_url)))?;
        Ok(Self {
            base_url,
            section_timeout: Duration::from_secs(30),
            throttle: Throttle::default(),
        })
    }

    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_section_timeout(mut self, timeout: Duration) -> Self {
        self.section_timeout = timeout;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }
}

/// Extracts one platform's dashboard through a [`PageSource`]
#[derive(Debug)]
pub struct Extractor<S> {
    spec: &'static PlatformSpec,
    source: S,
    config: ExtractorConfig,
}

impl<S: PageSource> Extractor<S> {
    #[must_use]
    pub fn new(platform: Platform, source: S, config: ExtractorConfig) -> Self {
        Self {
            spec: PlatformSpec::for_platform(platform),
            source,
            config,
        }
    }

    /// Platform this extractor reads
    #[inline]
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.spec.platform
    }

    /// Visit every section and build a snapshot
    ///
    /// Section failures are recorded and defaulted. Returns `AuthExpired` as
    /// soon as any navigation lands on a login page, and `NothingExtracted`
    /// when no section produced a value.
    pub async fn extract(
        &self,
        session: &mut AuthSession,
        now: DateTime<Utc>,
    ) -> Result<MetricsSnapshot, ExtractError> {
        let platform = self.spec.platform;
        if session.is_empty() {
            return Err(ExtractError::AuthExpired {
                platform,
                reason: "session has no cookies".to_string(),
            });
        }

        let mut snapshot = MetricsSnapshot::new(platform, now);
        for (idx, section) in self.spec.sections.iter().enumerate() {
            if idx > 0 {
                self.config.throttle.pause().await;
            }

            let url = match self.config.base_url.join(section.path) {
                Ok(url) => url,
                Err(e) => {
                    let err = FetchError::InvalidUrl(format!("{}: {e}", section.path));
                    tracing::warn!(%platform, section = section.name, error = %err, "Section failed");
                    snapshot.record_failure(section.name, err);
                    (section.default)(&mut snapshot);
                    continue;
                }
            };

            let fetched = tokio::time::timeout(
                self.config.section_timeout,
                self.source.fetch(&url, session),
            )
            .await
            .unwrap_or(Err(FetchError::Timeout));

            let page = match fetched {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(%platform, section = section.name, url = %url, error = %err, "Section failed");
                    snapshot.record_failure(section.name, err);
                    (section.default)(&mut snapshot);
                    continue;
                }
            };

            if self.spec.is_login(&page.final_url) {
                tracing::warn!(%platform, section = section.name, url = %page.final_url, "Redirected to login");
                return Err(ExtractError::AuthExpired {
                    platform,
                    reason: format!("redirected to {}", page.final_url.path()),
                });
            }

            if !page.is_success() {
                let err = FetchError::Status {
                    status: page.status,
                    url: page.final_url.to_string(),
                };
                tracing::warn!(%platform, section = section.name, error = %err, "Section failed");
                snapshot.record_failure(section.name, err);
                (section.default)(&mut snapshot);
                continue;
            }

            let hits = section.apply(&page.html, &page.final_url, &mut snapshot);
            if hits == 0 {
                tracing::warn!(%platform, section = section.name, url = %page.final_url, "No field recognized on page");
                snapshot.record_failure(section.name, "no field recognized on page");
                (section.default)(&mut snapshot);
            } else {
                tracing::debug!(%platform, section = section.name, hits, "Section extracted");
            }
        }

        snapshot.finalize(self.spec.sections.len());
        if !snapshot.success {
            return Err(ExtractError::NothingExtracted {
                platform,
                failures: snapshot.section_failures,
            });
        }

        tracing::info!(
            %platform,
            failures = snapshot.section_failures.len(),
            sections = self.spec.sections.len(),
            "Extraction complete"
        );
        Ok(snapshot)
    }

    /// Load the saved session, extract, and persist the refreshed session
    ///
    /// A missing session file is reported as `AuthExpired`.
    pub async fn run(
        &self,
        sessions: &SessionStore,
        now: DateTime<Utc>,
    ) -> Result<MetricsSnapshot, ExtractError> {
        let platform = self.spec.platform;
        let mut session = match sessions.load(platform).await {
            Ok(session) => session,
            Err(e) if e.is_not_found() => {
                return Err(ExtractError::AuthExpired {
                    platform,
                    reason: "no saved session".to_string(),
                })
            }
            Err(source) => return Err(ExtractError::Store { platform, source }),
        };

        let snapshot = self.extract(&mut session, now).await?;

        session.touch(now);
        if let Err(err) = sessions.save(platform, &session).await {
            tracing::warn!(%platform, error = %err, "Session refresh not saved; keeping snapshot");
        }
        Ok(snapshot)
    }
}
