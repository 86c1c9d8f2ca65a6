//! Fiverr seller dashboard
//!
//! Sections: `dashboard`, `earnings`, `orders`, `gigs`, `inbox`.

use crate::cascade::{Cascade, RowCascade, Strategy::*};
use crate::section::{Hits, PlatformSpec, SectionSpec};
use gigpulse_snapshot::{Earnings, InboxCounts, Listing, MetricsSnapshot, OrderCounts, Platform, ProfileStats};
use scraper::Html;
use url::Url;

pub static FIVERR: PlatformSpec = PlatformSpec {
    platform: Platform::Fiverr,
    default_base_url: "https://www.fiverr.com/",
    login_markers: &["/login", "/join"],
    sections: &[
        SectionSpec {
            name: "dashboard",
            path: "/seller_dashboard",
            parse: parse_dashboard,
            default: default_dashboard,
        },
        SectionSpec {
            name: "earnings",
            path: "/earnings",
            parse: parse_earnings,
            default: default_earnings,
        },
        SectionSpec {
            name: "orders",
            path: "/manage_orders",
            parse: parse_orders,
            default: default_orders,
        },
        SectionSpec {
            name: "gigs",
            path: "/manage_gigs",
            parse: parse_gigs,
            default: default_gigs,
        },
        SectionSpec {
            name: "inbox",
            path: "/inbox",
            parse: parse_inbox,
            default: default_inbox,
        },
    ],
};

// dashboard
const RESPONSE_RATE: Cascade = Cascade::new(
    "response_rate",
    &[
        Css("[data-testid='response-rate'] .value"),
        Css(".seller-stats .response-rate"),
        LabelNumber("Response rate"),
    ],
);
const RATING: Cascade = Cascade::new(
    "rating",
    &[
        Css("[data-testid='rating-score']"),
        Css(".seller-stats .rating-score"),
        LabelNumber("Rating"),
    ],
);
const EARNED_THIS_MONTH: Cascade = Cascade::new(
    "earned_this_month",
    &[
        Css("[data-testid='earned-this-month']"),
        Css(".earnings-widget .this-month .amount"),
        LabelNumber("Earned in"),
    ],
);

// earnings
const AVAILABLE: Cascade = Cascade::new(
    "available",
    &[
        Css("[data-testid='available-funds']"),
        Css(".available-funds .amount"),
        LabelNumber("Available funds"),
        LabelNumber("Available for withdrawal"),
    ],
);
const PENDING: Cascade = Cascade::new(
    "pending",
    &[
        Css("[data-testid='pending-clearance']"),
        LabelNumber("Payments being cleared"),
        LabelNumber("Pending clearance"),
    ],
);
const IN_PROGRESS: Cascade = Cascade::new(
    "in_progress",
    &[
        Css("[data-testid='active-orders-value']"),
        LabelNumber("Active orders"),
    ],
);

// orders
const ACTIVE: Cascade = Cascade::new(
    "orders.active",
    &[
        Css("[data-testid='tab-active'] .count"),
        Css("a[href*='search_type=active'] .count"),
        LabelNumber("Active"),
        NumberLabel("active"),
    ],
);
const LATE: Cascade = Cascade::new(
    "orders.late",
    &[
        Css("[data-testid='tab-late'] .count"),
        Css("a[href*='search_type=late'] .count"),
        LabelNumber("Late"),
        NumberLabel("late"),
    ],
);
const DELIVERED: Cascade = Cascade::new(
    "orders.delivered",
    &[
        Css("[data-testid='tab-delivered'] .count"),
        Css("a[href*='search_type=delivered'] .count"),
        LabelNumber("Delivered"),
    ],
);
const COMPLETED: Cascade = Cascade::new(
    "orders.completed",
    &[
        Css("[data-testid='tab-completed'] .count"),
        Css("a[href*='search_type=completed'] .count"),
        LabelNumber("Completed"),
    ],
);

// gigs
const GIG_ROWS: RowCascade = RowCascade::new(
    "gigs",
    &["[data-testid='gig-row']", "table.gigs-table tbody tr", ".gig-card"],
);
const GIG_TITLE: Cascade = Cascade::new(
    "gig.title",
    &[
        Css("[data-testid='gig-title']"),
        Css(".gig-title"),
        Css("td.title a"),
        Attr("a[title]", "title"),
    ],
);
const GIG_STATUS: Cascade = Cascade::new(
    "gig.status",
    &[
        OwnAttr("data-status"),
        Css("[data-testid='gig-status']"),
        Css(".gig-status"),
    ],
);
const GIG_IMPRESSIONS: Cascade = Cascade::new(
    "gig.impressions",
    &[
        Css("[data-testid='impressions']"),
        Css("td.impressions"),
        LabelNumber("Impressions"),
    ],
);
const GIG_CLICKS: Cascade = Cascade::new(
    "gig.clicks",
    &[
        Css("[data-testid='clicks']"),
        Css("td.clicks"),
        LabelNumber("Clicks"),
    ],
);
const GIG_ORDERS: Cascade = Cascade::new(
    "gig.orders",
    &[
        Css("[data-testid='orders']"),
        Css("td.orders"),
        LabelNumber("Orders"),
    ],
);

// inbox
const UNREAD: Cascade = Cascade::new(
    "inbox.unread",
    &[
        Css("[data-testid='unread-count']"),
        Css(".inbox-unread-count"),
        Attr("[data-unread-count]", "data-unread-count"),
        LabelNumber("Unread"),
        NumberLabel("unread"),
    ],
);

fn parse_dashboard(doc: &Html, _url: &Url, snap: &mut MetricsSnapshot) -> usize {
    let root = doc.root_element();
    let mut hits = Hits::default();

    let profile = ProfileStats::from_raw(
        hits.take(RESPONSE_RATE.number(root)),
        hits.take(RATING.number(root)),
        None,
    );
    snap.profile = Some(profile);

    let earnings = snap.earnings.get_or_insert_with(Earnings::default);
    earnings.this_month = hits.take(EARNED_THIS_MONTH.money(root));
    hits.0
}

fn default_dashboard(snap: &mut MetricsSnapshot) {
    snap.profile.get_or_insert_with(ProfileStats::default);
    snap.earnings.get_or_insert_with(Earnings::default);
}

fn parse_earnings(doc: &Html, _url: &Url, snap: &mut MetricsSnapshot) -> usize {
    let root = doc.root_element();
    let mut hits = Hits::default();

    let earnings = snap.earnings.get_or_insert_with(Earnings::default);
    earnings.available = hits.take(AVAILABLE.money(root));
    earnings.pending = hits.take(PENDING.money(root));
    earnings.in_progress = hits.take(IN_PROGRESS.money(root));
    hits.0
}

fn default_earnings(snap: &mut MetricsSnapshot) {
    snap.earnings.get_or_insert_with(Earnings::default);
}

fn parse_orders(doc: &Html, _url: &Url, snap: &mut MetricsSnapshot) -> usize {
    let root = doc.root_element();
    let mut hits = Hits::default();

    snap.orders = Some(OrderCounts {
        active: hits.take(ACTIVE.count(root)),
        late: hits.take(LATE.count(root)),
        delivered: hits.take(DELIVERED.count(root)),
        completed: hits.take(COMPLETED.count(root)),
    });
    hits.0
}

fn default_orders(snap: &mut MetricsSnapshot) {
    snap.orders = Some(OrderCounts::zeroed());
}

fn parse_gigs(doc: &Html, _url: &Url, snap: &mut MetricsSnapshot) -> usize {
    let mut hits = Hits::default();

    snap.listings = GIG_ROWS
        .rows(doc)
        .into_iter()
        .filter_map(|row| {
            let title = hits.take(GIG_TITLE.text(row))?;
            Some(Listing {
                title,
                status: GIG_STATUS.text(row),
                impressions: GIG_IMPRESSIONS.count(row),
                clicks: GIG_CLICKS.count(row),
                orders: GIG_ORDERS.count(row),
            })
        })
        .collect();
    hits.0
}

fn default_gigs(snap: &mut MetricsSnapshot) {
    snap.listings.clear();
}

fn parse_inbox(doc: &Html, _url: &Url, snap: &mut MetricsSnapshot) -> usize {
    let mut hits = Hits::default();
    snap.inbox = Some(InboxCounts {
        unread: hits.take(UNREAD.count(doc.root_element())),
    });
    hits.0
}

fn default_inbox(snap: &mut MetricsSnapshot) {
    snap.inbox = Some(InboxCounts::zeroed());
}
