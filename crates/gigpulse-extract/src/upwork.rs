//! Upwork freelancer dashboard
//!
//! Sections: `overview`, `proposals`, `best_matches`, `messages`, `catalog`.

use crate::cascade::{Cascade, RowCascade, Strategy::*};
use crate::section::{Hits, PlatformSpec, SectionSpec};
use gigpulse_snapshot::{
    Earnings, InboxCounts, JobMatch, Listing, MetricsSnapshot, Platform, ProfileStats, ProposalCounts,
};
use scraper::Html;
use url::Url;

pub static UPWORK: PlatformSpec = PlatformSpec {
    platform: Platform::Upwork,
    default_base_url: "https://www.upwork.com/",
    login_markers: &["/account-security/login", "/login"],
    sections: &[
        SectionSpec {
            name: "overview",
            path: "/nx/reports/overview",
            parse: parse_overview,
            default: default_overview,
        },
        SectionSpec {
            name: "proposals",
            path: "/nx/proposals/",
            parse: parse_proposals,
            default: default_proposals,
        },
        SectionSpec {
            name: "best_matches",
            path: "/nx/find-work/best-matches",
            parse: parse_best_matches,
            default: default_best_matches,
        },
        SectionSpec {
            name: "messages",
            path: "/ab/messages/rooms/",
            parse: parse_messages,
            default: default_messages,
        },
        SectionSpec {
            name: "catalog",
            path: "/nx/project-dashboard/",
            parse: parse_catalog,
            default: default_catalog,
        },
    ],
};

// overview
const AVAILABLE: Cascade = Cascade::new(
    "available",
    &[
        Css("[data-test='available-balance']"),
        Css(".financial-overview .available .amount"),
        LabelNumber("Available"),
    ],
);
const PENDING: Cascade = Cascade::new(
    "pending",
    &[
        Css("[data-test='pending-balance']"),
        Css(".financial-overview .pending .amount"),
        LabelNumber("Pending"),
    ],
);
const IN_PROGRESS: Cascade = Cascade::new(
    "in_progress",
    &[
        Css("[data-test='work-in-progress']"),
        Css(".financial-overview .in-progress .amount"),
        LabelNumber("Work in progress"),
        LabelNumber("In progress"),
    ],
);
const THIS_MONTH: Cascade = Cascade::new(
    "this_month",
    &[
        Css("[data-test='earnings-this-month']"),
        LabelNumber("This month"),
    ],
);

// proposals
const SENT: Cascade = Cascade::new(
    "proposals.sent",
    &[
        Css("[data-test='submitted-proposals'] .count"),
        LabelNumber("Submitted proposals"),
        NumberLabel("submitted"),
    ],
);
const VIEWED: Cascade = Cascade::new(
    "proposals.viewed",
    &[
        Css("[data-test='viewed-proposals'] .count"),
        LabelNumber("Viewed by client"),
        NumberLabel("viewed"),
    ],
);
const INTERVIEWING: Cascade = Cascade::new(
    "proposals.interviewing",
    &[
        Css("[data-test='active-proposals'] .count"),
        LabelNumber("Active proposals"),
        LabelNumber("Interviewing"),
    ],
);
const OFFERS: Cascade = Cascade::new(
    "proposals.offers",
    &[
        Css("[data-test='offers'] .count"),
        LabelNumber("Offers"),
    ],
);
const CONNECTS: Cascade = Cascade::new(
    "profile.connects",
    &[
        Css("[data-test='connects-balance']"),
        LabelNumber("Available Connects"),
        NumberLabel("connects"),
    ],
);

// best matches
const JOB_TILES: RowCascade = RowCascade::new(
    "job_tiles",
    &["[data-test='job-tile']", "article.job-tile", "section.air3-card-section"],
);
const JOB_TITLE: Cascade = Cascade::new(
    "job.title",
    &[
        Css("[data-test='job-tile-title-link']"),
        Css("h2.job-tile-title a"),
        Css("h3 a"),
    ],
);
const JOB_LINK: Cascade = Cascade::new(
    "job.url",
    &[
        Attr("[data-test='job-tile-title-link']", "href"),
        Attr("h2.job-tile-title a", "href"),
        Attr("h3 a", "href"),
    ],
);
const JOB_BUDGET: Cascade = Cascade::new(
    "job.budget",
    &[
        Css("[data-test='budget']"),
        Css("[data-test='job-type-label']"),
        Css(".job-budget"),
    ],
);
const JOB_POSTED: Cascade = Cascade::new(
    "job.posted",
    &[
        Css("[data-test='posted-on']"),
        Css(".posted-on"),
        Css("small time"),
    ],
);

// messages
const UNREAD: Cascade = Cascade::new(
    "messages.unread",
    &[
        Css("[data-test='unread-rooms-count']"),
        Css(".rooms-unread-badge"),
        Attr("[data-unread-count]", "data-unread-count"),
        LabelNumber("Unread"),
        NumberLabel("unread"),
    ],
);

// catalog
const PROJECT_ROWS: RowCascade = RowCascade::new(
    "projects",
    &["[data-test='project-row']", "table.catalog tbody tr", ".project-card"],
);
const PROJECT_TITLE: Cascade = Cascade::new(
    "project.title",
    &[
        Css("[data-test='project-title']"),
        Css(".project-title"),
        Css("td.title"),
    ],
);
const PROJECT_STATUS: Cascade = Cascade::new(
    "project.status",
    &[
        OwnAttr("data-status"),
        Css("[data-test='project-status']"),
        Css(".project-status"),
    ],
);
const PROJECT_IMPRESSIONS: Cascade = Cascade::new(
    "project.impressions",
    &[
        Css("[data-test='impressions']"),
        Css("td.impressions"),
        LabelNumber("Impressions"),
    ],
);
const PROJECT_ORDERS: Cascade = Cascade::new(
    "project.orders",
    &[
        Css("[data-test='orders']"),
        Css("td.orders"),
        LabelNumber("Orders"),
    ],
);

fn parse_overview(doc: &Html, _url: &Url, snap: &mut MetricsSnapshot) -> usize {
    let root = doc.root_element();
    let mut hits = Hits::default();

    let earnings = snap.earnings.get_or_insert_with(Earnings::default);
    earnings.available = hits.take(AVAILABLE.money(root));
    earnings.pending = hits.take(PENDING.money(root));
    earnings.in_progress = hits.take(IN_PROGRESS.money(root));
    earnings.this_month = hits.take(THIS_MONTH.money(root));
    hits.0
}

fn default_overview(snap: &mut MetricsSnapshot) {
    snap.earnings.get_or_insert_with(Earnings::default);
}

fn parse_proposals(doc: &Html, _url: &Url, snap: &mut MetricsSnapshot) -> usize {
    let root = doc.root_element();
    let mut hits = Hits::default();

    snap.proposals = Some(ProposalCounts {
        sent: hits.take(SENT.count(root)),
        viewed: hits.take(VIEWED.count(root)),
        interviewing: hits.take(INTERVIEWING.count(root)),
        offers: hits.take(OFFERS.count(root)),
    });
    let profile = snap.profile.get_or_insert_with(ProfileStats::default);
    profile.connects = hits.take(CONNECTS.count(root));
    hits.0
}

fn default_proposals(snap: &mut MetricsSnapshot) {
    snap.proposals = Some(ProposalCounts::zeroed());
    snap.profile.get_or_insert_with(ProfileStats::default);
}

fn parse_best_matches(doc: &Html, page_url: &Url, snap: &mut MetricsSnapshot) -> usize {
    let mut hits = Hits::default();

    snap.job_matches = JOB_TILES
        .rows(doc)
        .into_iter()
        .filter_map(|tile| {
            let title = hits.take(JOB_TITLE.text(tile))?;
            let url = JOB_LINK
                .text(tile)
                .and_then(|href| page_url.join(&href).ok())
                .map(String::from);
            Some(JobMatch {
                title,
                budget: JOB_BUDGET.text(tile),
                posted: JOB_POSTED.text(tile),
                url,
            })
        })
        .collect();
    hits.0
}

fn default_best_matches(snap: &mut MetricsSnapshot) {
    snap.job_matches.clear();
}

fn parse_messages(doc: &Html, _url: &Url, snap: &mut MetricsSnapshot) -> usize {
    let mut hits = Hits::default();
    snap.inbox = Some(InboxCounts {
        unread: hits.take(UNREAD.count(doc.root_element())),
    });
    hits.0
}

fn default_messages(snap: &mut MetricsSnapshot) {
    snap.inbox = Some(InboxCounts::zeroed());
}

fn parse_catalog(doc: &Html, _url: &Url, snap: &mut MetricsSnapshot) -> usize {
    let mut hits = Hits::default();

    snap.listings = PROJECT_ROWS
        .rows(doc)
        .into_iter()
        .filter_map(|row| {
            let title = hits.take(PROJECT_TITLE.text(row))?;
            Some(Listing {
                title,
                status: PROJECT_STATUS.text(row),
                impressions: PROJECT_IMPRESSIONS.count(row),
                clicks: None,
                orders: PROJECT_ORDERS.count(row),
            })
        })
        .collect();
    hits.0
}

fn default_catalog(snap: &mut MetricsSnapshot) {
    snap.listings.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn run(section: &str, html: &str) -> (MetricsSnapshot, usize) {
        let spec = UPWORK.sections.iter().find(|s| s.name == section).unwrap();
        let mut snap = MetricsSnapshot::new(Platform::Upwork, Utc::now());
        let url = Url::parse("https://www.upwork.com/nx/find-work/best-matches").unwrap();
        let hits = spec.apply(html, &url, &mut snap);
        (snap, hits)
    }

    #[test]
    fn proposals_and_connects() {
        let html = r#"
            <section>
              <h2>Submitted proposals (12)</h2>
              <h2>Active proposals (2)</h2>
              <h2>Offers (1)</h2>
              <aside><span data-test="connects-balance">64</span></aside>
            </section>"#;
        let (snap, hits) = run("proposals", html);
        let proposals = snap.proposals.unwrap();
        assert_eq!(proposals.sent, Some(12));
        assert_eq!(proposals.interviewing, Some(2));
        assert_eq!(proposals.offers, Some(1));
        assert_eq!(proposals.viewed, None);
        assert_eq!(snap.profile.unwrap().connects, Some(64));
        assert_eq!(hits, 4);
    }

    #[test]
    fn job_tiles_resolve_relative_links() {
        let html = r#"
            <article class="job-tile">
              <h2 class="job-tile-title"><a href="/jobs/~01abc">n8n automation for CRM sync</a></h2>
              <span class="job-budget">Fixed-price: $500</span>
              <small><time>Posted 2 hours ago</time></small>
            </article>
            <article class="job-tile">
              <h2 class="job-tile-title"><a href="https://www.upwork.com/jobs/~02def">Power BI dashboard</a></h2>
            </article>"#;
        let (snap, hits) = run("best_matches", html);
        assert_eq!(hits, 2);
        let first = &snap.job_matches[0];
        assert_eq!(first.title, "n8n automation for CRM sync");
        assert_eq!(first.url.as_deref(), Some("https://www.upwork.com/jobs/~01abc"));
        assert_eq!(first.budget.as_deref(), Some("Fixed-price: $500"));
        assert_eq!(first.posted.as_deref(), Some("Posted 2 hours ago"));
        assert_eq!(snap.job_matches[1].budget, None);
    }

    #[test]
    fn overview_balances() {
        let html = r#"
            <div class="financial-overview">
              <div class="available"><span class="amount">$1,020.00</span></div>
              <div class="pending"><span class="amount">$240.00</span></div>
            </div>
            <p>Work in progress $75.50</p>"#;
        let (snap, hits) = run("overview", html);
        let earnings = snap.earnings.unwrap();
        assert_eq!(earnings.available, Some(1020.0));
        assert_eq!(earnings.pending, Some(240.0));
        assert_eq!(earnings.in_progress, Some(75.5));
        assert_eq!(earnings.this_month, None);
        assert_eq!(hits, 3);
    }

    #[test]
    fn catalog_rows_have_no_clicks() {
        let html = r#"
            <div class="project-card" data-status="active">
              <h3 class="project-title">Automated reporting pipeline</h3>
              <span>Impressions 88</span><span>Orders 1</span>
            </div>"#;
        let (snap, hits) = run("catalog", html);
        assert_eq!(hits, 1);
        let listing = &snap.listings[0];
        assert_eq!(listing.status.as_deref(), Some("active"));
        assert_eq!(listing.impressions, Some(88));
        assert_eq!(listing.orders, Some(1));
        assert_eq!(listing.clicks, None);
    }

    #[test]
    fn messages_badge_from_attribute() {
        let (snap, hits) = run("messages", r#"<nav><a data-unread-count="3">Messages</a></nav>"#);
        assert_eq!(hits, 1);
        assert_eq!(snap.unread(), Some(3));
    }

    #[test]
    fn defaults_zero_counts() {
        let mut snap = MetricsSnapshot::new(Platform::Upwork, Utc::now());
        for section in UPWORK.sections {
            (section.default)(&mut snap);
        }
        assert_eq!(snap.proposals, Some(ProposalCounts::zeroed()));
        assert_eq!(snap.unread(), Some(0));
        assert!(snap.job_matches.is_empty());
        assert!(snap.profile.is_some());
    }
}
