//! Synthetic dashboards, snapshots and documents

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gigpulse_snapshot::{
    AuthSession, Earnings, InboxCounts, JobMatch, Listing, MetricsSnapshot, OrderCounts, Platform,
    ProfileStats, ProposalCounts, SessionCookie,
};
use gigpulse_tracker::KeywordMap;

pub fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

pub fn run_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 3, 0, 0).unwrap()
}

/// Logged-in session with one cookie
pub fn session() -> AuthSession {
    AuthSession {
        cookies: vec![SessionCookie {
            name: "sid".into(),
            value: "abc123".into(),
            domain: None,
            path: Some("/".into()),
        }],
        user_agent: None,
        saved_at: None,
    }
}

pub const FIVERR_DASHBOARD: &str = r#"
<html><body>
  <div class="seller-stats">
    <div data-testid="response-rate"><span class="value">98%</span></div>
    <span data-testid="rating-score">4.9</span>
  </div>
  <div data-testid="earned-this-month">$1,250.00</div>
</body></html>"#;

pub const FIVERR_EARNINGS: &str = r#"
<html><body>
  <div data-testid="available-funds">$320.50</div>
  <div data-testid="pending-clearance">$80.00</div>
  <div data-testid="active-orders-value">$150.00</div>
</body></html>"#;

pub const FIVERR_ORDERS: &str = r#"
<html><body><nav>
  <a data-testid="tab-active">Active <span class="count">3</span></a>
  <a data-testid="tab-late">Late <span class="count">1</span></a>
  <a data-testid="tab-delivered">Delivered <span class="count">2</span></a>
  <a data-testid="tab-completed">Completed <span class="count">41</span></a>
</nav></body></html>"#;

pub const FIVERR_GIGS: &str = r#"
<html><body>
  <div data-testid="gig-row" data-status="active">
    <span data-testid="gig-title">I will build n8n workflow automation</span>
    <span data-testid="impressions">1.2K</span>
    <span data-testid="clicks">45</span>
    <span data-testid="orders">3</span>
  </div>
  <div data-testid="gig-row" data-status="paused">
    <span data-testid="gig-title">I will build a KPI dashboard in Power BI</span>
    <span data-testid="impressions">310</span>
    <span data-testid="clicks">12</span>
    <span data-testid="orders">0</span>
  </div>
</body></html>"#;

pub const FIVERR_INBOX: &str = r#"
<html><body><span data-testid="unread-count">6</span></body></html>"#;

pub fn fiverr_pages() -> Vec<(&'static str, &'static str)> {
    vec![
        ("/seller_dashboard", FIVERR_DASHBOARD),
        ("/earnings", FIVERR_EARNINGS),
        ("/manage_orders", FIVERR_ORDERS),
        ("/manage_gigs", FIVERR_GIGS),
        ("/inbox", FIVERR_INBOX),
    ]
}

pub const UPWORK_OVERVIEW: &str = r#"
<html><body>
  <span data-test="available-balance">$1,020.00</span>
  <span data-test="pending-balance">$240.00</span>
  <span data-test="work-in-progress">$75.50</span>
</body></html>"#;

pub const UPWORK_PROPOSALS: &str = r#"
<html><body>
  <div data-test="submitted-proposals">Submitted <span class="count">12</span></div>
  <div data-test="viewed-proposals">Viewed <span class="count">5</span></div>
  <div data-test="active-proposals">Active <span class="count">2</span></div>
  <div data-test="offers">Offers <span class="count">1</span></div>
  <span data-test="connects-balance">64</span>
</body></html>"#;

pub const UPWORK_BEST_MATCHES: &str = r#"
<html><body>
  <section data-test="job-tile">
    <a data-test="job-tile-title-link" href="/jobs/~01abc">n8n automation for CRM sync</a>
    <span data-test="budget">Fixed-price: $500</span>
    <span data-test="posted-on">Posted 2 hours ago</span>
  </section>
  <section data-test="job-tile">
    <a data-test="job-tile-title-link" href="/jobs/~02def">Power BI sales dashboard</a>
    <span data-test="budget">Hourly: $30-$50</span>
  </section>
  <section data-test="job-tile">
    <a data-test="job-tile-title-link" href="/jobs/~03ghi">Zapier to Make migration</a>
  </section>
  <section data-test="job-tile">
    <a data-test="job-tile-title-link" href="/jobs/~04jkl">Airtable cleanup</a>
  </section>
</body></html>"#;

pub const UPWORK_MESSAGES: &str = r#"
<html><body><span data-test="unread-rooms-count">3</span></body></html>"#;

pub const UPWORK_CATALOG: &str = r#"
<html><body>
  <div data-test="project-row" data-status="active">
    <span data-test="project-title">Automated reporting pipeline</span>
    <span data-test="impressions">88</span>
    <span data-test="orders">1</span>
  </div>
</body></html>"#;

pub fn upwork_pages() -> Vec<(&'static str, &'static str)> {
    vec![
        ("/nx/reports/overview", UPWORK_OVERVIEW),
        ("/nx/proposals/", UPWORK_PROPOSALS),
        ("/nx/find-work/best-matches", UPWORK_BEST_MATCHES),
        ("/ab/messages/rooms/", UPWORK_MESSAGES),
        ("/nx/project-dashboard/", UPWORK_CATALOG),
    ]
}

/// Snapshot matching the Fiverr fixture pages
pub fn fiverr_snapshot(captured_at: DateTime<Utc>) -> MetricsSnapshot {
    let mut snap = MetricsSnapshot::new(Platform::Fiverr, captured_at);
    snap.success = true;
    snap.earnings = Some(Earnings::from_raw(Some(320.5), Some(80.0), Some(150.0), Some(1250.0)));
    snap.orders = Some(OrderCounts {
        active: Some(3),
        late: Some(1),
        delivered: Some(2),
        completed: Some(41),
    });
    snap.inbox = Some(InboxCounts { unread: Some(6) });
    snap.profile = Some(ProfileStats::from_raw(Some(98.0), Some(4.9), None));
    snap.listings = vec![
        Listing {
            title: "I will build n8n workflow automation".into(),
            status: Some("active".into()),
            impressions: Some(1200),
            clicks: Some(45),
            orders: Some(3),
        },
        Listing {
            title: "I will build a KPI dashboard in Power BI".into(),
            status: Some("paused".into()),
            impressions: Some(310),
            clicks: Some(12),
            orders: Some(0),
        },
    ];
    snap
}

/// Snapshot matching the Upwork fixture pages
pub fn upwork_snapshot(captured_at: DateTime<Utc>) -> MetricsSnapshot {
    let mut snap = MetricsSnapshot::new(Platform::Upwork, captured_at);
    snap.success = true;
    snap.earnings = Some(Earnings::from_raw(Some(1020.0), Some(240.0), Some(75.5), None));
    snap.proposals = Some(ProposalCounts {
        sent: Some(12),
        viewed: Some(5),
        interviewing: Some(2),
        offers: Some(1),
    });
    snap.inbox = Some(InboxCounts { unread: Some(3) });
    snap.profile = Some(ProfileStats::from_raw(None, None, Some(64)));
    snap.job_matches = vec![
        JobMatch {
            title: "n8n automation for CRM sync".into(),
            budget: Some("Fixed-price: $500".into()),
            posted: Some("Posted 2 hours ago".into()),
            url: Some("https://www.upwork.com/jobs/~01abc".into()),
        },
        JobMatch {
            title: "Power BI sales dashboard".into(),
            budget: Some("Hourly: $30-$50".into()),
            ..JobMatch::default()
        },
    ];
    snap.listings = vec![Listing {
        title: "Automated reporting pipeline".into(),
        status: Some("active".into()),
        impressions: Some(88),
        clicks: None,
        orders: Some(1),
    }];
    snap
}

pub const TRACKER_DOC: &str = "\
# Listings tracker

> Last updated: 2026-10-10
> Posted: 3 | Live: 3

## Fiverr gigs

| ID | Title | Status | Posted | Impressions | Clicks | Orders | Notes |
|----|-------|--------|--------|-------------|--------|--------|-------|
| AW-01 | n8n Workflow Automation | Live    | 2026-09-20 | 900   | 30  | 2 | top gig |
| BI-01 | KPI Dashboard           | Live    | 2026-09-25 | 250   | 10  | 0 |  |
| DB-01 | Database cleanup        | Draft   | --         | 0     | 0   | 0 | later |

## Upwork catalog

| ID | Project | Status | Posted | Impressions | Orders | Notes |
|----|---------|--------|--------|-------------|--------|-------|
| UP-01 | Automated reporting pipeline | Review | -- | 40 | 0 | |

Notes: rows with unknown ids are left alone.
| ZZ-99 | Orphan row | Live | 2026-01-01 | 5 | 5 | 5 | |
";

/// Keyword rules matching the fixture listings to [`TRACKER_DOC`] rows
pub fn tracker_keywords() -> KeywordMap {
    KeywordMap::default()
        .with_rule(Platform::Fiverr, "workflow", "AW-01")
        .with_rule(Platform::Fiverr, "kpi dashboard", "BI-01")
        .with_rule(Platform::Upwork, "reporting pipeline", "UP-01")
}
