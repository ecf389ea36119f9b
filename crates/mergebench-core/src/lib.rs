//! Confusion matrices and pairwise relative-advantage statistics for
//! three-way merge tools scored against expected results.

pub mod bucket;
pub mod config;
pub mod confusion;
pub mod error;
pub mod logging;
pub mod pairwise;
pub mod report;
pub mod scenario;
pub mod status;

pub use bucket::MetricBucket;
pub use config::{Settings, ToolPair};
pub use confusion::{ConfusionBucket, ConfusionMatrix};
pub use error::{ConfigError, LoadError};
pub use pairwise::{compare, AdvantageBucket, AdvantageStats, Decision, PairwiseResult};
pub use report::{Report, ReportOptions};
pub use scenario::{ScenarioTable, ToolResults, ToolTable, Universe};
pub use status::{ComparisonStatus, ExecutionStatus, ScenarioResult};
