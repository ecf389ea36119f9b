//! Single-tool confusion matrix.
//!
//! A "positive" is a reported conflict: the tool declined to auto-merge.
//! A "negative" is a clean merge. Correctness comes from the comparison
//! against the expected result, so a conflict whose output matches the
//! expected conflict is a true positive and a clean merge that differs is a
//! false negative.

use crate::bucket::MetricBucket;
use crate::scenario::ToolResults;
use crate::status::ScenarioResult;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfusionBucket {
    TruePositive,
    TrueNegative,
    FalsePositive,
    FalseNegative,
    Error,
}

impl ConfusionBucket {
    pub const ALL: [ConfusionBucket; 5] = [
        ConfusionBucket::TruePositive,
        ConfusionBucket::TrueNegative,
        ConfusionBucket::FalsePositive,
        ConfusionBucket::FalseNegative,
        ConfusionBucket::Error,
    ];

    /// Route one result. Unusable executions win over any comparison value.
    pub fn classify(result: &ScenarioResult) -> Self {
        if result.execution.is_unusable() {
            return ConfusionBucket::Error;
        }
        match (result.execution.made_merge(), result.comparison.is_match()) {
            (true, true) => ConfusionBucket::TrueNegative,
            (true, false) => ConfusionBucket::FalseNegative,
            (false, true) => ConfusionBucket::TruePositive,
            (false, false) => ConfusionBucket::FalsePositive,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConfusionBucket::TruePositive => "TP",
            ConfusionBucket::TrueNegative => "TN",
            ConfusionBucket::FalsePositive => "FP",
            ConfusionBucket::FalseNegative => "FN",
            ConfusionBucket::Error => "error",
        }
    }
}

impl fmt::Display for ConfusionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tool: String,
    #[serde(rename = "TP")]
    pub true_positive: MetricBucket,
    #[serde(rename = "TN")]
    pub true_negative: MetricBucket,
    #[serde(rename = "FP")]
    pub false_positive: MetricBucket,
    #[serde(rename = "FN")]
    pub false_negative: MetricBucket,
    pub error: MetricBucket,
}

impl ConfusionMatrix {
    pub fn compute(results: &ToolResults) -> Self {
        let mut matrix = ConfusionMatrix {
            tool: results.tool.clone(),
            ..Default::default()
        };

        for (scenario, result) in results.iter() {
            let bucket = ConfusionBucket::classify(result);
            tracing::trace!(tool = %results.tool, scenario, %result, %bucket, "Classified");
            matrix.bucket_mut(bucket).push(scenario);
        }

        tracing::debug!(
            tool = %matrix.tool,
            tp = matrix.true_positive.count(),
            tn = matrix.true_negative.count(),
            fp = matrix.false_positive.count(),
            fn_ = matrix.false_negative.count(),
            error = matrix.error.count(),
            "Confusion matrix computed"
        );

        matrix
    }

    pub fn bucket(&self, bucket: ConfusionBucket) -> &MetricBucket {
        match bucket {
            ConfusionBucket::TruePositive => &self.true_positive,
            ConfusionBucket::TrueNegative => &self.true_negative,
            ConfusionBucket::FalsePositive => &self.false_positive,
            ConfusionBucket::FalseNegative => &self.false_negative,
            ConfusionBucket::Error => &self.error,
        }
    }

    fn bucket_mut(&mut self, bucket: ConfusionBucket) -> &mut MetricBucket {
        match bucket {
            ConfusionBucket::TruePositive => &mut self.true_positive,
            ConfusionBucket::TrueNegative => &mut self.true_negative,
            ConfusionBucket::FalsePositive => &mut self.false_positive,
            ConfusionBucket::FalseNegative => &mut self.false_negative,
            ConfusionBucket::Error => &mut self.error,
        }
    }

    /// Buckets in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ConfusionBucket, &MetricBucket)> {
        ConfusionBucket::ALL.into_iter().map(move |b| (b, self.bucket(b)))
    }

    pub fn total(&self) -> usize {
        self.iter().map(|(_, b)| b.count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{ComparisonStatus, ExecutionStatus};

    fn results(tool: &str, rows: &[(&str, ExecutionStatus, ComparisonStatus)]) -> ToolResults {
        let mut r = ToolResults::new(tool);
        for (scenario, execution, comparison) in rows {
            r.add_output(*scenario, ScenarioResult::new(*execution, *comparison));
        }
        r
    }

    #[test]
    fn test_basic_routing() {
        use ComparisonStatus::*;
        use ExecutionStatus::*;
        let r = results(
            "diff3",
            &[
                ("s1", Success, Match),
                ("s2", Success, Differ),
                ("s3", Conflict, Match),
                ("s4", Conflict, Differ),
            ],
        );
        let m = ConfusionMatrix::compute(&r);
        assert_eq!(m.true_negative.scenarios(), ["s1".to_string()]);
        assert_eq!(m.false_negative.scenarios(), ["s2".to_string()]);
        assert_eq!(m.true_positive.scenarios(), ["s3".to_string()]);
        assert_eq!(m.false_positive.scenarios(), ["s4".to_string()]);
        assert!(m.error.is_empty());
    }

    #[test]
    fn test_unusable_always_error() {
        for execution in [ExecutionStatus::Failed, ExecutionStatus::NoOutput, ExecutionStatus::Unknown] {
            for comparison in [ComparisonStatus::Match, ComparisonStatus::Differ, ComparisonStatus::NoOutput] {
                let bucket = ConfusionBucket::classify(&ScenarioResult::new(execution, comparison));
                assert_eq!(bucket, ConfusionBucket::Error, "{execution}/{comparison}");
            }
        }
    }

    #[test]
    fn test_no_output_comparison_is_incorrect() {
        let merged = ScenarioResult::new(ExecutionStatus::Success, ComparisonStatus::NoOutput);
        assert_eq!(ConfusionBucket::classify(&merged), ConfusionBucket::FalseNegative);
        let conflicted = ScenarioResult::new(ExecutionStatus::Conflict, ComparisonStatus::NoOutput);
        assert_eq!(ConfusionBucket::classify(&conflicted), ConfusionBucket::FalsePositive);
    }

    #[test]
    fn test_buckets_partition_scenarios() {
        use ComparisonStatus as C;
        use ExecutionStatus as E;
        let executions = [E::Success, E::Conflict, E::Failed, E::NoOutput, E::Unknown];
        let comparisons = [C::Match, C::Differ, C::NoOutput];
        let mut r = ToolResults::new("mergiraf");
        let mut n = 0;
        for e in executions {
            for c in comparisons {
                r.add_output(format!("s{n}"), ScenarioResult::new(e, c));
                n += 1;
            }
        }
        let m = ConfusionMatrix::compute(&r);
        assert_eq!(m.total(), n);
        assert_eq!(m.error.count(), 9);

        for (scenario, _) in r.iter() {
            let hits = m.iter().filter(|(_, b)| b.contains(scenario)).count();
            assert_eq!(hits, 1, "{scenario} in {hits} buckets");
        }
    }

    #[test]
    fn test_serializes_with_bucket_names() {
        let r = results("diff3", &[("s1", ExecutionStatus::Success, ComparisonStatus::Match)]);
        let json = serde_json::to_value(ConfusionMatrix::compute(&r)).unwrap();
        assert_eq!(json["TN"]["count"], 1);
        assert_eq!(json["TN"]["scenarios"][0], "s1");
        assert_eq!(json["error"]["count"], 0);
        assert_eq!(json["tool"], "diff3");
    }
}
