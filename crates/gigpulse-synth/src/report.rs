//! Report skeleton and the deterministic template
//!
//! ```text
//! GIGPULSE DAILY BRIEF | Day <n> | <YYYY-MM-DD>
//!
//! FIVERR
//! ...
//! UPWORK
//! ...
//! TOP MATCHES
//! ...
//! PRIORITIES
//! ...
//! ```

use chrono::NaiveDate;
use gigpulse_snapshot::{JobMatch, MetricsSnapshot, Platform};
use serde::Serialize;
use std::fmt::Write as _;

/// Title prefix of every report
pub const TITLE: &str = "GIGPULSE DAILY BRIEF";

/// Section headers, in order
pub const SECTION_HEADERS: [&str; 4] = ["FIVERR", "UPWORK", "TOP MATCHES", "PRIORITIES"];

/// Placeholder for a metric that was not extracted
pub const MISSING: &str = "--";

/// Line printed under a platform with no snapshot
pub const NO_DATA: &str = "No data this run.";

/// Snapshots for one calendar day
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayMetrics {
    pub fiverr: Option<MetricsSnapshot>,
    pub upwork: Option<MetricsSnapshot>,
}

impl DayMetrics {
    /// Snapshot for a platform
    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<&MetricsSnapshot> {
        match platform {
            Platform::Fiverr => self.fiverr.as_ref(),
            Platform::Upwork => self.upwork.as_ref(),
        }
    }

    /// True when neither platform has data
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fiverr.is_none() && self.upwork.is_none()
    }
}

/// Everything a brief is built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BriefInput {
    pub date: NaiveDate,
    /// 1-based day counter
    pub day: u32,
    pub today: DayMetrics,
    pub yesterday: DayMetrics,
}

impl BriefInput {
    /// First `n` Upwork job matches in page order
    #[must_use]
    pub fn top_matches(&self, n: usize) -> &[JobMatch] {
        self.today
            .upwork
            .as_ref()
            .map_or(&[][..], |s| &s.job_matches[..s.job_matches.len().min(n)])
    }
}

/// `GIGPULSE DAILY BRIEF | Day 12 | 2026-10-17`
#[must_use]
pub fn title_line(day: u32, date: NaiveDate) -> String {
    format!("{TITLE} | Day {day} | {}", date.format("%Y-%m-%d"))
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("${v:.2}"))
}

fn num(value: Option<u64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

/// Metric lines for one platform
#[must_use]
pub fn platform_lines(platform: Platform, snapshot: Option<&MetricsSnapshot>) -> Vec<String> {
    let Some(snap) = snapshot else {
        return vec![NO_DATA.to_string()];
    };
    let available = snap.earnings.and_then(|e| e.available);
    match platform {
        Platform::Fiverr => {
            let orders = snap.orders.unwrap_or_default();
            vec![
                format!("Available: {}", money(available)),
                format!("Active Orders: {}", num(orders.active)),
                format!("Late Deliveries: {}", num(orders.late)),
                format!("Unread Messages: {}", num(snap.unread())),
                format!("Gig Impressions: {}", num(snap.total_impressions())),
            ]
        }
        Platform::Upwork => {
            let proposals = snap.proposals.unwrap_or_default();
            vec![
                format!("Available: {}", money(available)),
                format!("Proposals Sent: {}", num(proposals.sent)),
                format!("Interviews: {}", num(proposals.interviewing)),
                format!("Offers: {}", num(proposals.offers)),
                format!("Unread Messages: {}", num(snap.unread())),
                format!("Connects: {}", num(snap.profile.and_then(|p| p.connects))),
            ]
        }
    }
}

fn match_line(idx: usize, job: &JobMatch) -> String {
    let mut line = format!("{}. {}", idx + 1, job.title);
    if let Some(budget) = &job.budget {
        let _ = write!(line, " ({budget})");
    }
    line
}

/// Rule-based priorities from today's numbers
#[must_use]
pub fn fallback_priorities(today: &DayMetrics) -> Vec<String> {
    let mut out = Vec::new();
    for platform in Platform::ALL {
        if today.get(platform).is_none() {
            out.push(format!("- Check the {} session: no data this run", platform.heading()));
        }
    }
    if let Some(fiverr) = &today.fiverr {
        if let Some(late) = fiverr.orders.and_then(|o| o.late).filter(|n| *n > 0) {
            out.push(format!("- Deliver {late} late Fiverr order(s) first"));
        }
        if let Some(unread) = fiverr.unread().filter(|n| *n > 0) {
            out.push(format!("- Reply to {unread} unread Fiverr message(s)"));
        }
    }
    if let Some(upwork) = &today.upwork {
        if let Some(offers) = upwork.proposals.and_then(|p| p.offers).filter(|n| *n > 0) {
            out.push(format!("- Review {offers} Upwork offer(s)"));
        }
        if let Some(unread) = upwork.unread().filter(|n| *n > 0) {
            out.push(format!("- Reply to {unread} unread Upwork message(s)"));
        }
    }
    if out.is_empty() {
        out.push("- No urgent items. Send proposals to the top matches.".to_string());
    }
    out
}

/// Deterministic report from today's numbers only
#[must_use]
pub fn render_fallback(input: &BriefInput, top_matches: usize) -> String {
    let mut lines = vec![title_line(input.day, input.date), String::new()];

    for platform in Platform::ALL {
        lines.push(platform.heading().to_string());
        lines.extend(platform_lines(platform, input.today.get(platform)));
        lines.push(String::new());
    }

    lines.push("TOP MATCHES".to_string());
    let matches = input.top_matches(top_matches);
    if matches.is_empty() {
        lines.push("No matches this run.".to_string());
    } else {
        lines.extend(matches.iter().enumerate().map(|(i, j)| match_line(i, j)));
    }
    lines.push(String::new());

    lines.push("PRIORITIES".to_string());
    lines.extend(fallback_priorities(&input.today));

    lines.join("\n")
}

fn bare(line: &str) -> &str {
    line.trim().trim_matches(|c| matches!(c, '*' | '_' | '#' | ' '))
}

/// Skeleton parts missing from `text`
///
/// Headers may carry light markdown decoration (`*FIVERR*`).
#[must_use]
pub fn missing_sections(text: &str) -> Vec<String> {
    let mut missing = Vec::new();
    let has_title = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .is_some_and(|l| bare(l).starts_with(TITLE));
    if !has_title {
        missing.push(TITLE.to_string());
    }
    for header in SECTION_HEADERS {
        if !text.lines().any(|l| bare(l).eq_ignore_ascii_case(header)) {
            missing.push(header.to_string());
        }
    }
    missing
}

/// Keep whole lines while the running word count fits `budget`
#[must_use]
pub fn trim_to_words(text: &str, budget: usize) -> String {
    if text.split_whitespace().count() <= budget {
        return text.trim_end().to_string();
    }
    let mut used = 0;
    let mut kept = Vec::new();
    for line in text.lines() {
        let words = line.split_whitespace().count();
        if used + words > budget {
            break;
        }
        used += words;
        kept.push(line);
    }
    kept.join("\n").trim_end().to_string()
}
