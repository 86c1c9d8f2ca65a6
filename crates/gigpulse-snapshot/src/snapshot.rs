//! Metrics snapshot model
//!
//! A snapshot is a best-effort read of one marketplace dashboard. Every
//! section is independently nullable so a missing field never poisons the
//! rest of the structure:
//! - Leaf values are `Option`s (null in JSON when not extracted)
//! - Floating point leaves are forced finite through [`finite`]
//! - Whole-section failures are recorded in `section_failures`

use crate::platform::Platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keep only finite floats
///
/// NaN and infinities become `None`, so every serialized leaf is a finite
/// number or null.
#[inline]
#[must_use]
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Money figures, in the account currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Earnings {
    /// Available for withdrawal
    pub available: Option<f64>,
    /// Pending clearance
    pub pending: Option<f64>,
    /// Work in progress / in escrow
    pub in_progress: Option<f64>,
    /// Earned in the current month
    pub this_month: Option<f64>,
}

impl Earnings {
    /// Build from raw values, dropping non-finite numbers
    #[must_use]
    pub fn from_raw(
        available: Option<f64>,
        pending: Option<f64>,
        in_progress: Option<f64>,
        this_month: Option<f64>,
    ) -> Self {
        Self {
            available: available.and_then(finite),
            pending: pending.and_then(finite),
            in_progress: in_progress.and_then(finite),
            this_month: this_month.and_then(finite),
        }
    }

    /// True when nothing was extracted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available.is_none()
            && self.pending.is_none()
            && self.in_progress.is_none()
            && self.this_month.is_none()
    }
}

/// Fiverr order counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCounts {
    pub active: Option<u64>,
    pub late: Option<u64>,
    pub delivered: Option<u64>,
    pub completed: Option<u64>,
}

impl OrderCounts {
    /// Section default: every counter zero
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            active: Some(0),
            late: Some(0),
            delivered: Some(0),
            completed: Some(0),
        }
    }
}

/// Upwork proposal counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCounts {
    pub sent: Option<u64>,
    pub viewed: Option<u64>,
    pub interviewing: Option<u64>,
    pub offers: Option<u64>,
}

impl ProposalCounts {
    /// Section default: every counter zero
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            sent: Some(0),
            viewed: Some(0),
            interviewing: Some(0),
            offers: Some(0),
        }
    }
}

/// Inbox counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxCounts {
    pub unread: Option<u64>,
}

impl InboxCounts {
    /// Section default: no unread messages
    #[must_use]
    pub fn zeroed() -> Self {
        Self { unread: Some(0) }
    }
}

/// Account-level profile figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    /// Response rate in percent
    pub response_rate: Option<f64>,
    /// Average rating (0-5)
    pub rating: Option<f64>,
    /// Upwork connects balance
    pub connects: Option<u64>,
}

impl ProfileStats {
    /// Build from raw values, dropping non-finite numbers
    #[must_use]
    pub fn from_raw(response_rate: Option<f64>, rating: Option<f64>, connects: Option<u64>) -> Self {
        Self {
            response_rate: response_rate.and_then(finite),
            rating: rating.and_then(finite),
            connects,
        }
    }
}

/// One gig (Fiverr) or catalog project (Upwork)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub status: Option<String>,
    pub impressions: Option<u64>,
    pub clicks: Option<u64>,
    pub orders: Option<u64>,
}

impl Listing {
    /// Listing with only a title
    #[inline]
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// One job suggested by the marketplace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMatch {
    pub title: String,
    pub budget: Option<String>,
    pub posted: Option<String>,
    pub url: Option<String>,
}

/// A section that fell back to its default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFailure {
    pub section: String,
    pub error: String,
}

/// Point-in-time read of one marketplace dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub platform: Platform,
    pub captured_at: DateTime<Utc>,
    pub success: bool,
    #[serde(default)]
    pub earnings: Option<Earnings>,
    #[serde(default)]
    pub orders: Option<OrderCounts>,
    #[serde(default)]
    pub proposals: Option<ProposalCounts>,
    #[serde(default)]
    pub inbox: Option<InboxCounts>,
    #[serde(default)]
    pub profile: Option<ProfileStats>,
    #[serde(default)]
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub job_matches: Vec<JobMatch>,
    #[serde(default)]
    pub section_failures: Vec<SectionFailure>,
}

impl MetricsSnapshot {
    /// Empty snapshot; sections are filled in by the extractor
    #[must_use]
    pub fn new(platform: Platform, captured_at: DateTime<Utc>) -> Self {
        Self {
            platform,
            captured_at,
            success: false,
            earnings: None,
            orders: None,
            proposals: None,
            inbox: None,
            profile: None,
            listings: Vec::new(),
            job_matches: Vec::new(),
            section_failures: Vec::new(),
        }
    }

    /// Record a section that fell back to its default
    pub fn record_failure(&mut self, section: impl Into<String>, error: impl ToString) {
        self.section_failures.push(SectionFailure {
            section: section.into(),
            error: error.to_string(),
        });
    }

    /// Set `success` from how many of `sections_total` sections failed
    pub fn finalize(&mut self, sections_total: usize) {
        self.success = self.section_failures.len() < sections_total;
    }

    /// Sum of listing impressions, `None` if no listing reported any
    #[must_use]
    pub fn total_impressions(&self) -> Option<u64> {
        self.listings
            .iter()
            .filter_map(|l| l.impressions)
            .fold(None, |acc, n| Some(acc.unwrap_or(0).saturating_add(n)))
    }

    /// Unread messages, if known
    #[inline]
    #[must_use]
    pub fn unread(&self) -> Option<u64> {
        self.inbox.and_then(|i| i.unread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 3, 0, 0).unwrap()
    }

    fn assert_leaves_ok(value: &serde_json::Value) {
        match value {
            serde_json::Value::Number(n) => {
                assert!(n.as_f64().map_or(true, f64::is_finite), "non-finite leaf {n}");
            }
            serde_json::Value::Object(map) => map.values().for_each(assert_leaves_ok),
            serde_json::Value::Array(items) => items.iter().for_each(assert_leaves_ok),
            _ => {}
        }
    }

    #[test]
    fn finite_rejects_nan_and_infinity() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
        assert_eq!(finite(f64::NEG_INFINITY), None);
    }

    #[test]
    fn missing_sections_serialize_as_null() {
        let snap = MetricsSnapshot::new(Platform::Fiverr, at());
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["platform"], "fiverr");
        assert_eq!(json["success"], false);
        assert!(json["earnings"].is_null());
        assert!(json["orders"].is_null());
        assert_eq!(json["listings"], serde_json::json!([]));
    }

    #[test]
    fn old_files_without_optional_sections_still_load() {
        let raw = r#"{"platform":"upwork","captured_at":"2026-10-16T03:00:00Z","success":true}"#;
        let snap: MetricsSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snap.platform, Platform::Upwork);
        assert!(snap.listings.is_empty());
        assert!(snap.section_failures.is_empty());
    }

    #[test]
    fn finalize_fails_only_when_every_section_failed() {
        let mut snap = MetricsSnapshot::new(Platform::Fiverr, at());
        snap.record_failure("orders", "timeout");
        snap.finalize(4);
        assert!(snap.success);

        let mut snap = MetricsSnapshot::new(Platform::Fiverr, at());
        for s in ["a", "b"] {
            snap.record_failure(s, "boom");
        }
        snap.finalize(2);
        assert!(!snap.success);
    }

    #[test]
    fn total_impressions_ignores_unknown_listings() {
        let mut snap = MetricsSnapshot::new(Platform::Fiverr, at());
        assert_eq!(snap.total_impressions(), None);
        snap.listings.push(Listing {
            impressions: Some(100),
            ..Listing::titled("a")
        });
        snap.listings.push(Listing::titled("b"));
        snap.listings.push(Listing {
            impressions: Some(20),
            ..Listing::titled("c")
        });
        assert_eq!(snap.total_impressions(), Some(120));
    }

    #[test]
    fn total_impressions_saturates() {
        let mut snap = MetricsSnapshot::new(Platform::Fiverr, at());
        for title in ["a", "b"] {
            snap.listings.push(Listing {
                impressions: Some(u64::MAX - 1),
                ..Listing::titled(title)
            });
        }
        assert_eq!(snap.total_impressions(), Some(u64::MAX));
    }

    proptest! {
        #[test]
        fn prop_snapshot_leaves_are_finite_or_null(
            available in any::<f64>(),
            pending in any::<f64>(),
            rate in any::<f64>(),
            active in proptest::option::of(any::<u64>()),
            title in ".{0,40}",
        ) {
            let mut snap = MetricsSnapshot::new(Platform::Fiverr, at());
            snap.earnings = Some(Earnings::from_raw(Some(available), Some(pending), None, None));
            snap.profile = Some(ProfileStats::from_raw(Some(rate), None, None));
            snap.orders = Some(OrderCounts { active, ..OrderCounts::default() });
            snap.listings.push(Listing::titled(title));

            let json = serde_json::to_value(&snap).unwrap();
            assert_leaves_ok(&json);
        }
    }
}
