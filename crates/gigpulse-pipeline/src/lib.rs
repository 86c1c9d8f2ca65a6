//! gigpulse nightly pipeline
//!
//! Runs the fixed stage table once per night:
//! - `extract_fiverr` and `extract_upwork`, individually non-fatal
//! - `synthesize`, `patch_tracker` and `notify`, gated on any extraction
//!   having succeeded
//!
//! Configuration comes from the environment with an optional TOML overlay;
//! network collaborators are injected through [`Services`].

pub mod config;
pub mod error;
pub mod pipeline;
pub mod stage;
pub mod status;

pub use config::{BaseUrls, PipelineConfig, Secret, Timeouts, TRACKER_FILE};
pub use error::{ConfigError, StageError};
pub use pipeline::{Pipeline, RunOptions, RunOutcome, Services};
pub use stage::{FailurePolicy, Requirement, StageName, StageOutcome, StageRecord, StageSpec, NIGHTLY};
pub use status::RunStatus;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
