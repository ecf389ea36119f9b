use std::path::PathBuf;

/// Failure to read or parse a scenario results file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tool/pair configuration that cannot be evaluated.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no tools configured")]
    EmptyTools,
    #[error("pair ({tool_a}, {tool_b}) references unknown tool '{unknown}'")]
    UnknownTool {
        tool_a: String,
        tool_b: String,
        unknown: String,
    },
    #[error("tool '{0}' cannot be compared against itself")]
    SelfPair(String),
}
