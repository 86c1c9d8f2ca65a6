//! gigpulse Synth - the daily brief
//!
//! Turns today's (and yesterday's) snapshots into a short report with a fixed
//! skeleton:
//! - Primary path: a generative-text service, prompted with the skeleton,
//!   word budget and locally detected anomalies
//! - Fallback path: a deterministic template over today's numbers
//!
//! [`Synthesizer::synthesize`] never fails; every primary-path error selects
//! the template and is reported in [`Brief::source`].

#![warn(unreachable_pub)]

pub mod anomaly;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod report;
pub mod synthesizer;

pub use anomaly::{detect_anomalies, Anomaly, DEFAULT_DROP_THRESHOLD};
pub use error::SynthError;
pub use generator::{
    GenerationRequest, MessagesClient, TextGenerator, API_VERSION, DEFAULT_API_BASE, DEFAULT_MODEL,
};
pub use report::{render_fallback, title_line, trim_to_words, BriefInput, DayMetrics};
pub use synthesizer::{Brief, BriefSource, SynthConfig, Synthesizer};
