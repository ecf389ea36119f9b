use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened when a merge tool was run on a scenario.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Produced a merge with no conflict markers.
    Success,
    /// Terminated reporting a merge conflict.
    Conflict,
    /// Errored before producing any usable output.
    Failed,
    /// No record exists for this tool and scenario.
    NoOutput,
    /// The status string was not recognized.
    Unknown,
}

impl ExecutionStatus {
    /// Normalize a raw runner status by substring containment.
    ///
    /// The runner annotates statuses (`"FAILED (exit 1)"`, `"CONFLICTS (exit 1)"`),
    /// so exact matching is not enough. Checks run FAILED, SUCCESS, CONFLICT,
    /// NO_OUTPUT in that order; a string carrying several markers resolves to
    /// the first one hit.
    pub fn normalize(raw: &str) -> Self {
        if raw.contains("FAILED") {
            ExecutionStatus::Failed
        } else if raw.contains("SUCCESS") {
            ExecutionStatus::Success
        } else if raw.contains("CONFLICT") {
            ExecutionStatus::Conflict
        } else if raw.contains("NO_OUTPUT") {
            ExecutionStatus::NoOutput
        } else {
            ExecutionStatus::Unknown
        }
    }

    /// The tool could not produce a judgment at all.
    pub fn is_unusable(&self) -> bool {
        match self {
            ExecutionStatus::Failed | ExecutionStatus::NoOutput | ExecutionStatus::Unknown => true,
            ExecutionStatus::Success | ExecutionStatus::Conflict => false,
        }
    }

    /// The tool auto-merged instead of reporting a conflict.
    pub fn made_merge(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExecutionStatus::Success => "SUCCESS",
            ExecutionStatus::Conflict => "CONFLICT",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::NoOutput => "NO_OUTPUT",
            ExecutionStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a tool's output compared to the expected merge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonStatus {
    Match,
    Differ,
    NoOutput,
}

impl ComparisonStatus {
    /// Normalize a raw comparison string. Anything that is neither a match
    /// nor a diff (including `"DRY_RUN"`) has no comparable output.
    pub fn normalize(raw: &str) -> Self {
        if raw.contains("MATCH") {
            ComparisonStatus::Match
        } else if raw.contains("DIFFER") {
            ComparisonStatus::Differ
        } else {
            ComparisonStatus::NoOutput
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, ComparisonStatus::Match)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ComparisonStatus::Match => "MATCH",
            ComparisonStatus::Differ => "DIFFER",
            ComparisonStatus::NoOutput => "NO_OUTPUT",
        }
    }
}

impl fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tool's outcome on one scenario.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ScenarioResult {
    pub execution: ExecutionStatus,
    pub comparison: ComparisonStatus,
}

impl ScenarioResult {
    /// Stand-in for a tool/scenario pair with no record.
    pub const MISSING: ScenarioResult = ScenarioResult {
        execution: ExecutionStatus::Unknown,
        comparison: ComparisonStatus::NoOutput,
    };

    pub fn new(execution: ExecutionStatus, comparison: ComparisonStatus) -> Self {
        Self {
            execution,
            comparison,
        }
    }

    /// Build from the runner's raw status strings.
    pub fn from_raw(execution: &str, comparison: &str) -> Self {
        Self::new(
            ExecutionStatus::normalize(execution),
            ComparisonStatus::normalize(comparison),
        )
    }
}

impl fmt::Display for ScenarioResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.execution, self.comparison)
    }
}
