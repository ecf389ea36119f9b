//! The scenario results table handed over by the merge runner.
//!
//! On disk this is a JSON object keyed by scenario name:
//!
//! ```json
//! {
//!   "closure_reorder": {
//!     "expected": "CLEAN",
//!     "diff3": { "execution": "CONFLICTS (exit 1)", "comparison": "DIFFER" },
//!     "mergiraf": { "execution": "SUCCESS", "comparison": "MATCH" }
//!   }
//! }
//! ```
//!
//! Every key other than `expected` is a tool entry. Scenarios are kept in
//! name order, which is also the order scenario lists come out in.

use crate::error::LoadError;
use crate::status::ScenarioResult;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const NO_OUTPUT: &str = "NO_OUTPUT";
const EXPECTED_KEY: &str = "expected";

/// One tool's results, keyed by scenario.
#[derive(Debug, Clone, Default)]
pub struct ToolResults {
    pub tool: String,
    outputs: BTreeMap<String, ScenarioResult>,
}

impl ToolResults {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn add_output(&mut self, scenario: impl Into<String>, result: ScenarioResult) {
        self.outputs.insert(scenario.into(), result);
    }

    pub fn get(&self, scenario: &str) -> Option<&ScenarioResult> {
        self.outputs.get(scenario)
    }

    /// Total lookup: a scenario with no record reads as [`ScenarioResult::MISSING`].
    pub fn get_or_missing(&self, scenario: &str) -> ScenarioResult {
        self.outputs
            .get(scenario)
            .copied()
            .unwrap_or(ScenarioResult::MISSING)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScenarioResult)> {
        self.outputs.iter().map(|(s, r)| (s.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Results for every tool under evaluation.
pub type ToolTable = BTreeMap<String, ToolResults>;

/// Look up a tool/scenario pair, defaulting at both levels.
pub fn lookup(data: &ToolTable, tool: &str, scenario: &str) -> ScenarioResult {
    data.get(tool)
        .map(|results| results.get_or_missing(scenario))
        .unwrap_or(ScenarioResult::MISSING)
}

/// The scenarios a pairwise comparison walks, with their expected labels.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    expected: BTreeMap<String, String>,
}

impl Universe {
    pub fn insert(&mut self, scenario: impl Into<String>, expected: impl Into<String>) {
        self.expected.insert(scenario.into(), expected.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.expected.iter().map(|(s, e)| (s.as_str(), e.as_str()))
    }

    pub fn expected(&self, scenario: &str) -> Option<&str> {
        self.expected.get(scenario).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.expected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Universe {
    /// Build a universe from bare scenario ids; labels default to `NO_OUTPUT`.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut universe = Universe::default();
        for scenario in iter {
            universe.insert(scenario, NO_OUTPUT);
        }
        universe
    }
}

/// A tool's raw status strings as the runner wrote them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutcome {
    pub execution: String,
    pub comparison: String,
}

impl RawOutcome {
    fn missing() -> Self {
        Self {
            execution: NO_OUTPUT.into(),
            comparison: NO_OUTPUT.into(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let field = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .unwrap_or(NO_OUTPUT)
                .to_string()
        };
        Some(Self {
            execution: field("execution"),
            comparison: field("comparison"),
        })
    }

    pub fn normalize(&self) -> ScenarioResult {
        ScenarioResult::from_raw(&self.execution, &self.comparison)
    }
}

#[derive(Debug, Clone)]
struct ScenarioRecord {
    expected: String,
    tools: BTreeMap<String, RawOutcome>,
}

impl ScenarioRecord {
    fn from_object(name: &str, obj: Map<String, Value>) -> Self {
        let mut expected = NO_OUTPUT.to_string();
        let mut tools = BTreeMap::new();
        for (key, value) in obj {
            if key == EXPECTED_KEY {
                expected = match value {
                    Value::String(s) => s,
                    Value::Null => NO_OUTPUT.to_string(),
                    other => other.to_string(),
                };
                continue;
            }
            match RawOutcome::from_value(&value) {
                Some(outcome) => {
                    tools.insert(key, outcome);
                }
                None => {
                    tracing::warn!(scenario = name, key = %key, "Ignoring non-object tool entry");
                }
            }
        }
        Self { expected, tools }
    }
}

/// All scenarios from one runner pass.
#[derive(Debug, Clone, Default)]
pub struct ScenarioTable {
    scenarios: BTreeMap<String, ScenarioRecord>,
}

impl ScenarioTable {
    pub fn from_json_str(content: &str) -> Result<Self, LoadError> {
        let raw: BTreeMap<String, Map<String, Value>> = serde_json::from_str(content)?;
        let scenarios = raw
            .into_iter()
            .map(|(name, obj)| {
                let record = ScenarioRecord::from_object(&name, obj);
                (name, record)
            })
            .collect();
        Ok(Self { scenarios })
    }

    pub async fn load(path: &Path) -> Result<Self, LoadError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let table = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            scenarios = table.len(),
            "Loaded scenario results"
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn scenario_ids(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn expected(&self, scenario: &str) -> Option<&str> {
        self.scenarios.get(scenario).map(|r| r.expected.as_str())
    }

    pub fn raw_outcome(&self, scenario: &str, tool: &str) -> Option<&RawOutcome> {
        self.scenarios.get(scenario)?.tools.get(tool)
    }

    /// Every tool name mentioned by at least one scenario.
    pub fn tools_seen(&self) -> BTreeSet<&str> {
        self.scenarios
            .values()
            .flat_map(|r| r.tools.keys().map(String::as_str))
            .collect()
    }

    pub fn universe(&self) -> Universe {
        let mut universe = Universe::default();
        for (name, record) in &self.scenarios {
            universe.insert(name.clone(), record.expected.clone());
        }
        universe
    }

    /// Normalized results for one tool. A scenario without an entry for the
    /// tool is recorded as `NO_OUTPUT` so it still counts against the tool.
    pub fn tool_results(&self, tool: &str) -> ToolResults {
        let mut results = ToolResults::new(tool);
        for (name, record) in &self.scenarios {
            let result = match record.tools.get(tool) {
                Some(raw) => raw.normalize(),
                None => RawOutcome::missing().normalize(),
            };
            results.add_output(name.clone(), result);
        }
        results
    }

    pub fn tool_table<S: AsRef<str>>(&self, tools: &[S]) -> ToolTable {
        tools
            .iter()
            .map(|t| (t.as_ref().to_string(), self.tool_results(t.as_ref())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{ComparisonStatus, ExecutionStatus};

    const SAMPLE: &str = r#"{
        "b_scenario": {
            "expected": "CLEAN",
            "diff3": { "execution": "CONFLICTS (exit 1)", "comparison": "DIFFER" },
            "mergiraf": { "execution": "SUCCESS", "comparison": "MATCH" }
        },
        "a_scenario": {
            "diff3": { "execution": "FAILED (exit 2)" },
            "notes": "hand-checked"
        }
    }"#;

    #[test]
    fn test_parse_normalizes_statuses() {
        let table = ScenarioTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);

        let diff3 = table.tool_results("diff3");
        assert_eq!(
            diff3.get_or_missing("b_scenario"),
            ScenarioResult::new(ExecutionStatus::Conflict, ComparisonStatus::Differ)
        );
        assert_eq!(
            diff3.get_or_missing("a_scenario"),
            ScenarioResult::new(ExecutionStatus::Failed, ComparisonStatus::NoOutput)
        );
    }

    #[test]
    fn test_absent_tool_reads_as_no_output() {
        let table = ScenarioTable::from_json_str(SAMPLE).unwrap();
        let mergiraf = table.tool_results("mergiraf");
        assert_eq!(mergiraf.len(), 2);
        assert_eq!(
            mergiraf.get_or_missing("a_scenario"),
            ScenarioResult::new(ExecutionStatus::NoOutput, ComparisonStatus::NoOutput)
        );
    }

    #[test]
    fn test_expected_defaults_and_order() {
        let table = ScenarioTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(table.expected("b_scenario"), Some("CLEAN"));
        assert_eq!(table.expected("a_scenario"), Some("NO_OUTPUT"));
        let ids: Vec<_> = table.scenario_ids().collect();
        assert_eq!(ids, ["a_scenario", "b_scenario"]);
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let table = ScenarioTable::from_json_str(SAMPLE).unwrap();
        let seen = table.tools_seen();
        assert!(seen.contains("diff3"));
        assert!(seen.contains("mergiraf"));
        assert!(!seen.contains("notes"));
    }

    #[test]
    fn test_lookup_defaults_for_unknown_tool() {
        let table = ScenarioTable::from_json_str(SAMPLE).unwrap();
        let data = table.tool_table(&["diff3"]);
        assert_eq!(lookup(&data, "kdiff3", "a_scenario"), ScenarioResult::MISSING);
        assert_eq!(lookup(&data, "diff3", "missing"), ScenarioResult::MISSING);
    }

    #[test]
    fn test_rejects_non_object_scenario() {
        let err = ScenarioTable::from_json_str(r#"{"s1": 3}"#).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let table = ScenarioTable::load(&path).await.unwrap();
        assert_eq!(table.universe().len(), 2);

        let err = ScenarioTable::load(&dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
