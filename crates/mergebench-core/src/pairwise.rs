//! Pairwise relative-advantage statistics.
//!
//! The confusion matrix judges a tool in isolation. This module looks only at
//! scenarios where two tools' correctness diverged and credits the tool that
//! got it right (aTP/aTN) while blaming the one that did not (aFP/aFN).
//! A tool is never blamed for a scenario the other tool could not even run.
//!
//! Routing, per scenario:
//!
//! 1. Exactly one side is unusable (failed, missing, unknown). The unusable
//!    side is not scored. The other side earns credit only if it matched.
//! 2. Both sides unusable: nothing to compare.
//! 3. Identical execution and comparison: no differential information.
//! 4. Same execution, different comparison: a same-path divergence.
//! 5. Different execution: a different-path divergence.
//!
//! Divergences (4 and 5) share one award rule: each tool is judged on its
//! own comparison, credited if it matched and blamed otherwise, so both
//! tools always get exactly one bucket. The two cases differ only in the
//! [`Divergence`] tag carried on the [`Decision`].

use crate::bucket::MetricBucket;
use crate::scenario::{lookup, ToolTable, Universe};
use crate::status::{ExecutionStatus, ScenarioResult};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvantageBucket {
    #[serde(rename = "aTP")]
    TruePositive,
    #[serde(rename = "aTN")]
    TrueNegative,
    #[serde(rename = "aFP")]
    FalsePositive,
    #[serde(rename = "aFN")]
    FalseNegative,
}

impl AdvantageBucket {
    pub const ALL: [AdvantageBucket; 4] = [
        AdvantageBucket::TruePositive,
        AdvantageBucket::TrueNegative,
        AdvantageBucket::FalsePositive,
        AdvantageBucket::FalseNegative,
    ];

    /// Bucket for a tool whose output matched the expected result.
    pub fn credit(execution: ExecutionStatus) -> Self {
        if execution.made_merge() {
            AdvantageBucket::TrueNegative
        } else {
            AdvantageBucket::TruePositive
        }
    }

    /// Bucket for a tool whose output did not match.
    pub fn blame(execution: ExecutionStatus) -> Self {
        if execution.made_merge() {
            AdvantageBucket::FalseNegative
        } else {
            AdvantageBucket::FalsePositive
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AdvantageBucket::TruePositive => "aTP",
            AdvantageBucket::TrueNegative => "aTN",
            AdvantageBucket::FalsePositive => "aFP",
            AdvantageBucket::FalseNegative => "aFN",
        }
    }
}

impl fmt::Display for AdvantageBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tool's side of a pairwise comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvantageStats {
    #[serde(skip)]
    pub tool: String,
    #[serde(rename = "aTP")]
    pub true_positive: MetricBucket,
    #[serde(rename = "aTN")]
    pub true_negative: MetricBucket,
    #[serde(rename = "aFP")]
    pub false_positive: MetricBucket,
    #[serde(rename = "aFN")]
    pub false_negative: MetricBucket,
}

impl AdvantageStats {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            ..Default::default()
        }
    }

    pub fn bucket(&self, bucket: AdvantageBucket) -> &MetricBucket {
        match bucket {
            AdvantageBucket::TruePositive => &self.true_positive,
            AdvantageBucket::TrueNegative => &self.true_negative,
            AdvantageBucket::FalsePositive => &self.false_positive,
            AdvantageBucket::FalseNegative => &self.false_negative,
        }
    }

    fn bucket_mut(&mut self, bucket: AdvantageBucket) -> &mut MetricBucket {
        match bucket {
            AdvantageBucket::TruePositive => &mut self.true_positive,
            AdvantageBucket::TrueNegative => &mut self.true_negative,
            AdvantageBucket::FalsePositive => &mut self.false_positive,
            AdvantageBucket::FalseNegative => &mut self.false_negative,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AdvantageBucket, &MetricBucket)> {
        AdvantageBucket::ALL.into_iter().map(move |b| (b, self.bucket(b)))
    }

    pub fn total(&self) -> usize {
        self.iter().map(|(_, b)| b.count()).sum()
    }

    /// The bucket holding `scenario`, if any.
    pub fn bucket_of(&self, scenario: &str) -> Option<AdvantageBucket> {
        self.iter()
            .find(|(_, b)| b.contains(scenario))
            .map(|(kind, _)| kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Divergence {
    /// Both tools took the same merge-vs-conflict path but compared differently.
    SamePath,
    /// The tools took different paths.
    DifferentPath,
}

/// Which routing rule a scenario took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Route {
    OneSidedFailure { failed: Side },
    BothUnusable,
    Agreement,
    Divergence { kind: Divergence },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Award {
    pub tool: String,
    pub bucket: AdvantageBucket,
}

/// Audit record for one scenario of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub scenario: String,
    pub expected: String,
    pub a: ScenarioResult,
    pub b: ScenarioResult,
    #[serde(flatten)]
    pub route: Route,
    pub awards: Vec<Award>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairwiseResult {
    pub stats_a: AdvantageStats,
    pub stats_b: AdvantageStats,
    /// One entry per scenario in the universe, in universe order.
    pub decisions: Vec<Decision>,
}

impl PairwiseResult {
    pub fn tool_a(&self) -> &str {
        &self.stats_a.tool
    }

    pub fn tool_b(&self) -> &str {
        &self.stats_b.tool
    }

    pub fn stats_for(&self, tool: &str) -> Option<&AdvantageStats> {
        if self.stats_a.tool == tool {
            Some(&self.stats_a)
        } else if self.stats_b.tool == tool {
            Some(&self.stats_b)
        } else {
            None
        }
    }
}

struct StatsByTool<'a>(&'a AdvantageStats, &'a AdvantageStats);

impl Serialize for StatsByTool<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(&self.0.tool, self.0)?;
        map.serialize_entry(&self.1.tool, self.1)?;
        map.end()
    }
}

impl Serialize for PairwiseResult {
    /// `{"tools": [a, b], "stats": {a: {...}, b: {...}}, "decisions": [...]}`;
    /// `decisions` is omitted when empty.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.decisions.is_empty() { 2 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("tools", &[self.tool_a(), self.tool_b()])?;
        map.serialize_entry("stats", &StatsByTool(&self.stats_a, &self.stats_b))?;
        if !self.decisions.is_empty() {
            map.serialize_entry("decisions", &self.decisions)?;
        }
        map.end()
    }
}

/// Decide the route and the awards for one scenario.
///
/// Returns the route plus the bucket for A and for B, either of which may be
/// absent. Swapping `a` and `b` swaps the awards.
pub fn route(
    a: ScenarioResult,
    b: ScenarioResult,
) -> (Route, Option<AdvantageBucket>, Option<AdvantageBucket>) {
    match (a.execution.is_unusable(), b.execution.is_unusable()) {
        (true, false) => {
            let award_b = b
                .comparison
                .is_match()
                .then(|| AdvantageBucket::credit(b.execution));
            (Route::OneSidedFailure { failed: Side::A }, None, award_b)
        }
        (false, true) => {
            let award_a = a
                .comparison
                .is_match()
                .then(|| AdvantageBucket::credit(a.execution));
            (Route::OneSidedFailure { failed: Side::B }, award_a, None)
        }
        (true, true) => (Route::BothUnusable, None, None),
        (false, false) => {
            if a == b {
                return (Route::Agreement, None, None);
            }
            let kind = if a.execution == b.execution {
                Divergence::SamePath
            } else {
                Divergence::DifferentPath
            };
            let (award_a, award_b) = award_divergence(a, b);
            (Route::Divergence { kind }, award_a, award_b)
        }
    }
}

/// Shared award rule for both divergence kinds.
fn award_divergence(
    a: ScenarioResult,
    b: ScenarioResult,
) -> (Option<AdvantageBucket>, Option<AdvantageBucket>) {
    (Some(award(a)), Some(award(b)))
}

fn award(result: ScenarioResult) -> AdvantageBucket {
    if result.comparison.is_match() {
        AdvantageBucket::credit(result.execution)
    } else {
        AdvantageBucket::blame(result.execution)
    }
}

/// Compare `tool_a` against `tool_b` over every scenario in `universe`.
///
/// Tools or scenarios absent from `data` read as `(UNKNOWN, NO_OUTPUT)`.
/// `tool_a` and `tool_b` must differ: a self-pair awards nothing and its
/// serialized stats would collide on one key. `Settings::validate` rejects
/// self-pairs before they reach here.
pub fn compare(tool_a: &str, tool_b: &str, data: &ToolTable, universe: &Universe) -> PairwiseResult {
    let mut result = PairwiseResult {
        stats_a: AdvantageStats::new(tool_a),
        stats_b: AdvantageStats::new(tool_b),
        decisions: Vec::with_capacity(universe.len()),
    };

    for (scenario, expected) in universe.iter() {
        let a = lookup(data, tool_a, scenario);
        let b = lookup(data, tool_b, scenario);
        let (route, award_a, award_b) = route(a, b);

        let mut awards = Vec::new();
        if let Some(bucket) = award_a {
            result.stats_a.bucket_mut(bucket).push(scenario);
            awards.push(Award {
                tool: tool_a.to_string(),
                bucket,
            });
        }
        if let Some(bucket) = award_b {
            result.stats_b.bucket_mut(bucket).push(scenario);
            awards.push(Award {
                tool: tool_b.to_string(),
                bucket,
            });
        }

        log_decision(tool_a, tool_b, scenario, expected, a, b, &route, &awards);

        result.decisions.push(Decision {
            scenario: scenario.to_string(),
            expected: expected.to_string(),
            a,
            b,
            route,
            awards,
        });
    }

    tracing::info!(
        tool_a,
        tool_b,
        scenarios = universe.len(),
        awarded_a = result.stats_a.total(),
        awarded_b = result.stats_b.total(),
        "Pairwise comparison complete"
    );

    result
}

#[allow(clippy::too_many_arguments)]
fn log_decision(
    tool_a: &str,
    tool_b: &str,
    scenario: &str,
    expected: &str,
    a: ScenarioResult,
    b: ScenarioResult,
    route: &Route,
    awards: &[Award],
) {
    match route {
        Route::OneSidedFailure { failed } => {
            let (failed_tool, other_tool) = match failed {
                Side::A => (tool_a, tool_b),
                Side::B => (tool_b, tool_a),
            };
            if awards.is_empty() {
                tracing::debug!(
                    scenario,
                    failed = failed_tool,
                    other = other_tool,
                    "Other tool ran where this one failed, but its output differs"
                );
            } else {
                tracing::debug!(
                    scenario,
                    failed = failed_tool,
                    other = other_tool,
                    "Other tool ran where this one failed and produced the expected output"
                );
            }
        }
        Route::BothUnusable => {
            tracing::debug!(scenario, %a, %b, "Neither tool produced a usable result");
        }
        Route::Agreement => {
            tracing::debug!(scenario, result = %a, "Both tools produced the same result");
        }
        Route::Divergence { kind } => {
            tracing::debug!(
                scenario,
                expected,
                ?kind,
                tool_a,
                a = %a,
                tool_b,
                b = %b,
                awards = awards.len(),
                "Divergence detected"
            );
        }
    }
}
