//! Assemble matrices and comparisons into a single structured report.

use crate::config::ToolPair;
use crate::confusion::ConfusionMatrix;
use crate::pairwise::{compare, PairwiseResult};
use crate::scenario::{ScenarioTable, ToolTable, Universe};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Keep the per-scenario routing decisions in the output.
    pub include_decisions: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub scenario_count: usize,
    pub matrices: Vec<ConfusionMatrix>,
    pub comparisons: Vec<PairwiseResult>,
}

impl Report {
    /// Compute every matrix and every pair on the current thread.
    pub fn build(
        table: &ScenarioTable,
        tools: &[String],
        pairs: &[ToolPair],
        options: ReportOptions,
    ) -> Self {
        let data = table.tool_table(tools);
        let universe = table.universe();

        let comparisons = pairs
            .iter()
            .map(|pair| run_pair(pair, &data, &universe, options))
            .collect();

        Self {
            generated_at: Utc::now(),
            scenario_count: table.len(),
            matrices: matrices(tools, &data),
            comparisons,
        }
    }

    /// Like [`Report::build`], but each pair runs on its own blocking task.
    /// Comparisons come back in `pairs` order.
    pub async fn build_parallel(
        table: &ScenarioTable,
        tools: &[String],
        pairs: &[ToolPair],
        options: ReportOptions,
    ) -> anyhow::Result<Self> {
        let data = Arc::new(table.tool_table(tools));
        let universe = Arc::new(table.universe());

        let handles: Vec<_> = pairs
            .iter()
            .cloned()
            .map(|pair| {
                let data = Arc::clone(&data);
                let universe = Arc::clone(&universe);
                tokio::task::spawn_blocking(move || run_pair(&pair, &data, &universe, options))
            })
            .collect();

        let mut comparisons = Vec::with_capacity(handles.len());
        for handle in handles {
            comparisons.push(handle.await?);
        }

        Ok(Self {
            generated_at: Utc::now(),
            scenario_count: table.len(),
            matrices: matrices(tools, &data),
            comparisons,
        })
    }

    pub fn matrix(&self, tool: &str) -> Option<&ConfusionMatrix> {
        self.matrices.iter().find(|m| m.tool == tool)
    }

    pub fn comparison(&self, tool_a: &str, tool_b: &str) -> Option<&PairwiseResult> {
        self.comparisons
            .iter()
            .find(|c| c.tool_a() == tool_a && c.tool_b() == tool_b)
    }
}

fn matrices(tools: &[String], data: &ToolTable) -> Vec<ConfusionMatrix> {
    tools
        .iter()
        .filter_map(|tool| data.get(tool))
        .map(ConfusionMatrix::compute)
        .collect()
}

fn run_pair(
    pair: &ToolPair,
    data: &ToolTable,
    universe: &Universe,
    options: ReportOptions,
) -> PairwiseResult {
    let mut result = compare(&pair.tool_a, &pair.tool_b, data, universe);
    if !options.include_decisions {
        result.decisions.clear();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairwise::AdvantageBucket;

    const SCENARIOS: &str = r#"{
        "s1": {
            "expected": "clean merge",
            "A": { "execution": "SUCCESS", "comparison": "DIFFER" },
            "B": { "execution": "CONFLICTS (exit 1)", "comparison": "MATCH" }
        },
        "s2": {
            "expected": "conflict on imports",
            "A": { "execution": "CONFLICTS (exit 1)", "comparison": "DIFFER" },
            "B": { "execution": "CONFLICTS (exit 1)", "comparison": "MATCH" }
        },
        "s3": {
            "expected": "clean merge",
            "A": { "execution": "SUCCESS", "comparison": "MATCH" },
            "B": { "execution": "FAILED (exit 1)", "comparison": "DIFFER" }
        }
    }"#;

    fn tools() -> Vec<String> {
        vec!["A".into(), "B".into()]
    }

    #[test]
    fn test_end_to_end() {
        let table = ScenarioTable::from_json_str(SCENARIOS).unwrap();
        let report = Report::build(
            &table,
            &tools(),
            &[ToolPair::new("A", "B")],
            ReportOptions::default(),
        );
        assert_eq!(report.scenario_count, 3);

        let a = report.matrix("A").unwrap();
        assert_eq!(a.false_negative.scenarios(), ["s1".to_string()]);
        assert_eq!(a.false_positive.scenarios(), ["s2".to_string()]);
        assert_eq!(a.true_negative.scenarios(), ["s3".to_string()]);
        assert_eq!(report.matrix("B").unwrap().error.scenarios(), ["s3".to_string()]);

        let pair = report.comparison("A", "B").unwrap();
        assert_eq!(pair.stats_a.bucket_of("s1"), Some(AdvantageBucket::FalseNegative));
        assert_eq!(pair.stats_b.bucket_of("s1"), Some(AdvantageBucket::TruePositive));
        assert_eq!(pair.stats_a.bucket_of("s2"), Some(AdvantageBucket::FalsePositive));
        assert_eq!(pair.stats_b.bucket_of("s2"), Some(AdvantageBucket::TruePositive));
        // B failed on s3 and A matched
        assert_eq!(pair.stats_a.bucket_of("s3"), Some(AdvantageBucket::TrueNegative));
        assert_eq!(pair.stats_b.bucket_of("s3"), None);
        assert!(pair.decisions.is_empty());
    }

    #[test]
    fn test_decisions_kept_on_request() {
        let table = ScenarioTable::from_json_str(SCENARIOS).unwrap();
        let report = Report::build(
            &table,
            &tools(),
            &[ToolPair::new("A", "B")],
            ReportOptions {
                include_decisions: true,
            },
        );
        let pair = report.comparison("A", "B").unwrap();
        assert_eq!(pair.decisions.len(), 3);
        assert_eq!(pair.decisions[0].expected, "clean merge");
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let table = ScenarioTable::from_json_str(SCENARIOS).unwrap();
        let pairs = [ToolPair::new("A", "B"), ToolPair::new("B", "A")];
        let sequential = Report::build(&table, &tools(), &pairs, ReportOptions::default());
        let parallel = Report::build_parallel(&table, &tools(), &pairs, ReportOptions::default())
            .await
            .unwrap();

        assert_eq!(parallel.comparisons, sequential.comparisons);
        assert_eq!(parallel.matrices, sequential.matrices);
        assert_eq!(parallel.comparisons[1].tool_a(), "B");
    }

    #[test]
    fn test_report_json_shape() {
        let table = ScenarioTable::from_json_str(SCENARIOS).unwrap();
        let report = Report::build(
            &table,
            &tools(),
            &[ToolPair::new("A", "B")],
            ReportOptions::default(),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["scenario_count"], 3);
        assert_eq!(json["matrices"][0]["tool"], "A");
        assert_eq!(json["comparisons"][0]["stats"]["B"]["aTP"]["count"], 2);
        assert!(json["generated_at"].is_string());
    }
}
