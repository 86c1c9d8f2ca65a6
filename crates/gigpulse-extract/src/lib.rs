//! gigpulse Extract - dashboard metrics from Fiverr and Upwork
//!
//! Pulls a [`MetricsSnapshot`](gigpulse_snapshot::MetricsSnapshot) out of a
//! logged-in seller dashboard:
//! - Every metric is a [`Cascade`] of selector and text strategies
//! - Every page is a [`SectionSpec`] with a pure parser and a default
//! - One section failing never fails the platform
//! - Only a login redirect or an empty result escapes as an error
//!
//! # Example
//!
//! ```rust,ignore
//! use gigpulse_extract::{Extractor, ExtractorConfig, HttpPageSource};
//!
//! let config = ExtractorConfig::for_platform(Platform::Upwork)?;
//! let extractor = Extractor::new(Platform::Upwork, HttpPageSource::new(config.section_timeout)?, config);
//! let snapshot = extractor.run(&sessions, Utc::now()).await?;
//! ```

#![warn(unreachable_pub)]

pub mod cascade;
pub mod error;
pub mod extractor;
pub mod fiverr;
pub mod parse;
pub mod section;
pub mod source;
pub mod throttle;
pub mod upwork;

pub use cascade::{Cascade, RowCascade, Strategy};
pub use error::{ExtractError, FetchError};
pub use extractor::{Extractor, ExtractorConfig};
pub use section::{PlatformSpec, SectionSpec};
pub use source::{HttpPageSource, Page, PageSource, DEFAULT_USER_AGENT};
pub use throttle::Throttle;
