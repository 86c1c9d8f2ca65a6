//! gigpulse Tracker - keep the tracking document current
//!
//! Rewrites only what the snapshots know about:
//! - Metric and status cells of rows mapped from listing titles
//! - The `Last updated` date
//! - The `Posted | Live` aggregate line
//!
//! Everything else in the document survives byte for byte.

#![warn(unreachable_pub)]

pub mod document;
pub mod error;
pub mod patcher;
pub mod table;

pub use document::{rewrite_cell, Document, Line};
pub use error::TrackerError;
pub use patcher::{DocumentPatcher, PatchReport, Patched};
pub use table::{is_row_id, map_status, Column, KeywordMap, KeywordRule, TableKind};
