//! Day-over-day anomaly detection
//!
//! A metric is anomalous when it fell by more than the threshold relative
//! to yesterday. Metrics missing on either day are never anomalous.

use gigpulse_snapshot::{MetricsSnapshot, Platform};
use serde::Serialize;

/// Default relative drop that counts as an anomaly
pub const DEFAULT_DROP_THRESHOLD: f64 = 0.20;

/// A metric that dropped sharply since yesterday
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub platform: Platform,
    pub metric: &'static str,
    pub previous: f64,
    pub current: f64,
    /// Relative drop, `0.25` = 25%
    pub drop: f64,
}

impl Anomaly {
    /// Drop as a whole percentage
    #[must_use]
    pub fn drop_percent(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = (self.drop * 100.0).round() as u32;
        pct
    }
}

#[allow(clippy::cast_precision_loss)]
fn count(value: Option<u64>) -> Option<f64> {
    value.map(|v| v as f64)
}

/// Metrics compared across days, by display name
#[must_use]
pub fn tracked_metrics(snapshot: &MetricsSnapshot) -> Vec<(&'static str, Option<f64>)> {
    let earnings = snapshot.earnings.unwrap_or_default();
    let profile = snapshot.profile.unwrap_or_default();
    let mut metrics = vec![
        ("Available", earnings.available),
        ("Earned This Month", earnings.this_month),
    ];
    match snapshot.platform {
        Platform::Fiverr => {
            let orders = snapshot.orders.unwrap_or_default();
            metrics.extend([
                ("Active Orders", count(orders.active)),
                ("Completed Orders", count(orders.completed)),
                ("Gig Impressions", count(snapshot.total_impressions())),
                ("Response Rate", profile.response_rate),
            ]);
        }
        Platform::Upwork => {
            let proposals = snapshot.proposals.unwrap_or_default();
            metrics.extend([
                ("Proposals Sent", count(proposals.sent)),
                ("Interviews", count(proposals.interviewing)),
                ("Offers", count(proposals.offers)),
                ("Catalog Impressions", count(snapshot.total_impressions())),
            ]);
        }
    }
    metrics
}

/// Metrics of `today` that fell by more than `threshold` against `yesterday`
#[must_use]
pub fn detect_anomalies(
    today: &MetricsSnapshot,
    yesterday: &MetricsSnapshot,
    threshold: f64,
) -> Vec<Anomaly> {
    if today.platform != yesterday.platform {
        return Vec::new();
    }
    let previous = tracked_metrics(yesterday);
    tracked_metrics(today)
        .into_iter()
        .zip(previous)
        .filter_map(|((metric, current), (_, previous))| {
            let (current, previous) = (current?, previous?);
            if previous <= 0.0 {
                return None;
            }
            let drop = (previous - current) / previous;
            (drop > threshold).then_some(Anomaly {
                platform: today.platform,
                metric,
                previous,
                current,
                drop,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gigpulse_snapshot::{Earnings, OrderCounts};

    fn fiverr(available: Option<f64>, active: Option<u64>) -> MetricsSnapshot {
        let mut snap = MetricsSnapshot::new(Platform::Fiverr, Utc::now());
        snap.earnings = Some(Earnings { available, ..Earnings::default() });
        snap.orders = Some(OrderCounts { active, ..OrderCounts::default() });
        snap
    }

    #[test]
    fn flags_drop_above_threshold() {
        let anomalies = detect_anomalies(
            &fiverr(Some(70.0), Some(4)),
            &fiverr(Some(100.0), Some(4)),
            DEFAULT_DROP_THRESHOLD,
        );
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].metric, "Available");
        assert_eq!(anomalies[0].drop_percent(), 30);
    }

    #[test]
    fn exactly_threshold_is_not_flagged() {
        let anomalies = detect_anomalies(
            &fiverr(Some(80.0), None),
            &fiverr(Some(100.0), None),
            DEFAULT_DROP_THRESHOLD,
        );
        assert!(anomalies.is_empty());
    }

    #[test]
    fn missing_or_zero_baseline_is_ignored() {
        let anomalies = detect_anomalies(
            &fiverr(Some(0.0), Some(0)),
            &fiverr(None, Some(0)),
            DEFAULT_DROP_THRESHOLD,
        );
        assert!(anomalies.is_empty());
    }

    #[test]
    fn increases_are_not_anomalies() {
        let anomalies = detect_anomalies(
            &fiverr(Some(150.0), Some(9)),
            &fiverr(Some(100.0), Some(3)),
            DEFAULT_DROP_THRESHOLD,
        );
        assert!(anomalies.is_empty());
    }
}
