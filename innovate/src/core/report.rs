//! Per-step outcomes collected into a run report.
//!
//! The executor never returns an error for a failed step; it records one of
//! these instead, so callers can tell a full, partial, or failed run apart
//! without scraping the run log.

use serde::{Deserialize, Serialize};

use super::step::StepKind;

/// What happened when a step was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// The effect was applied. `detail` is the message written to the run log.
    Applied { detail: String },
    /// The kind is recognised but has no effect (`[EDIT]`).
    Unsupported,
    /// The effect raised an error; later steps still ran.
    Failed { reason: String },
}

impl StepStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed { .. })
    }
}

/// Outcome of one attempted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// 1-based position in the step sequence.
    pub index: usize,
    pub kind: StepKind,
    pub argument: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

/// Outcomes of a whole step sequence, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
}

impl RunReport {
    /// Number of steps attempted. Always equals the number of parsed steps.
    pub fn attempted(&self) -> usize {
        self.steps.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| step.status.is_failure())
    }

    /// True when no step failed. Unsupported steps do not count as failures.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}
