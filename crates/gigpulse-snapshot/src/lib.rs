//! gigpulse Snapshot - data model and on-disk stores
//!
//! Owns everything the pipeline persists between runs:
//! - `MetricsSnapshot` (one per marketplace per run)
//! - The date-keyed history archive
//! - Per-marketplace `AuthSession` blobs
//! - Dated report files
//!
//! # Layout
//!
//! ```text
//! <data>/sessions/<platform>.json
//! <data>/snapshots/<platform>-latest.json
//! <data>/history/<YYYY-MM-DD>/<platform>.json
//! <data>/reports/<YYYY-MM-DD>.txt
//! <data>/status/<YYYY-MM-DD>.json
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod platform;
pub mod session;
pub mod snapshot;
pub mod store;

pub use error::StoreError;
pub use platform::{ParsePlatformError, Platform};
pub use session::{AuthSession, SessionCookie};
pub use snapshot::{
    finite, Earnings, InboxCounts, JobMatch, Listing, MetricsSnapshot, OrderCounts, ProfileStats,
    ProposalCounts, SectionFailure,
};
pub use store::{write_atomic, DataLayout, ReportStore, SessionStore, SnapshotStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
