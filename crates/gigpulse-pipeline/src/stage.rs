//! Declarative stage table
//!
//! The nightly run is data: an ordered list of [`StageSpec`]s, each naming
//! the stage, what its failure means for the run, and which earlier stages
//! must have succeeded for it to run at all.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    ExtractFiverr,
    ExtractUpwork,
    Synthesize,
    PatchTracker,
    Notify,
}

impl StageName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::ExtractFiverr => "extract_fiverr",
            StageName::ExtractUpwork => "extract_upwork",
            StageName::Synthesize => "synthesize",
            StageName::PatchTracker => "patch_tracker",
            StageName::Notify => "notify",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a stage failure means for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Recorded; later stages still run
    Continue,
    /// Recorded; decides the exit code
    Terminal,
}

/// Precondition on earlier stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Always,
    /// At least one of these succeeded
    AnyOf(&'static [StageName]),
}

impl Requirement {
    /// Whether the precondition holds given the records so far
    #[must_use]
    pub fn is_met(&self, records: &[StageRecord]) -> bool {
        match self {
            Requirement::Always => true,
            Requirement::AnyOf(names) => records
                .iter()
                .any(|r| names.contains(&r.stage) && r.outcome.is_ok()),
        }
    }
}

/// One row of the stage table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpec {
    pub name: StageName,
    pub policy: FailurePolicy,
    pub requires: Requirement,
}

const EXTRACTIONS: &[StageName] = &[StageName::ExtractFiverr, StageName::ExtractUpwork];

/// The nightly run, in order
pub const NIGHTLY: [StageSpec; 5] = [
    StageSpec {
        name: StageName::ExtractFiverr,
        policy: FailurePolicy::Continue,
        requires: Requirement::Always,
    },
    StageSpec {
        name: StageName::ExtractUpwork,
        policy: FailurePolicy::Continue,
        requires: Requirement::Always,
    },
    StageSpec {
        name: StageName::Synthesize,
        policy: FailurePolicy::Continue,
        requires: Requirement::AnyOf(EXTRACTIONS),
    },
    StageSpec {
        name: StageName::PatchTracker,
        policy: FailurePolicy::Continue,
        requires: Requirement::AnyOf(EXTRACTIONS),
    },
    StageSpec {
        name: StageName::Notify,
        policy: FailurePolicy::Terminal,
        requires: Requirement::AnyOf(EXTRACTIONS),
    },
];

/// How a stage ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    Ok,
    Failed { error: String },
    Skipped,
}

impl StageOutcome {
    #[must_use]
    pub fn failed(error: impl ToString) -> Self {
        StageOutcome::Failed {
            error: error.to_string(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, StageOutcome::Ok)
    }
}

/// `[ok]`, `[failed] <error>`, `[skipped]`
impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOutcome::Ok => f.write_str("[ok]"),
            StageOutcome::Failed { error } => write!(f, "[failed] {error}"),
            StageOutcome::Skipped => f.write_str("[skipped]"),
        }
    }
}

/// Outcome and duration of one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: StageName,
    #[serde(flatten)]
    pub outcome: StageOutcome,
    pub duration_ms: u64,
}

impl StageRecord {
    #[must_use]
    pub fn new(stage: StageName, outcome: StageOutcome, elapsed: Duration) -> Self {
        Self {
            stage,
            outcome,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    #[must_use]
    pub fn skipped(stage: StageName) -> Self {
        Self::new(stage, StageOutcome::Skipped, Duration::ZERO)
    }

    /// One stdout status line
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("{:<14} {}", self.stage.as_str(), self.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(stage: StageName, outcome: StageOutcome) -> StageRecord {
        StageRecord::new(stage, outcome, Duration::from_millis(5))
    }

    #[test]
    fn nightly_order_ends_with_notify() {
        let names: Vec<_> = NIGHTLY.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                StageName::ExtractFiverr,
                StageName::ExtractUpwork,
                StageName::Synthesize,
                StageName::PatchTracker,
                StageName::Notify,
            ]
        );
        let terminal: Vec<_> = NIGHTLY
            .iter()
            .filter(|s| s.policy == FailurePolicy::Terminal)
            .collect();
        assert_eq!(terminal.len(), 1);
        assert_eq!(terminal[0].name, StageName::Notify);
    }

    #[test]
    fn any_extraction_opens_the_gate() {
        let gate = Requirement::AnyOf(EXTRACTIONS);
        let failed = StageOutcome::failed("session expired");

        assert!(!gate.is_met(&[]));
        assert!(!gate.is_met(&[
            record(StageName::ExtractFiverr, failed.clone()),
            record(StageName::ExtractUpwork, failed.clone()),
        ]));
        assert!(gate.is_met(&[
            record(StageName::ExtractFiverr, failed),
            record(StageName::ExtractUpwork, StageOutcome::Ok),
        ]));
        assert!(Requirement::Always.is_met(&[]));
    }

    #[test]
    fn status_lines() {
        assert_eq!(record(StageName::Notify, StageOutcome::Ok).status_line(), "notify         [ok]");
        assert_eq!(
            record(StageName::Synthesize, StageOutcome::failed("boom")).status_line(),
            "synthesize     [failed] boom"
        );
        assert_eq!(StageRecord::skipped(StageName::PatchTracker).status_line(), "patch_tracker  [skipped]");
    }

    #[test]
    fn record_json_shape() {
        let json = serde_json::to_value(record(StageName::ExtractUpwork, StageOutcome::failed("x"))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"stage": "extract_upwork", "outcome": "failed", "error": "x", "duration_ms": 5})
        );
        let ok = serde_json::to_value(record(StageName::Notify, StageOutcome::Ok)).unwrap();
        assert_eq!(ok, serde_json::json!({"stage": "notify", "outcome": "ok", "duration_ms": 5}));
    }
}
