use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_tools")]
    pub tools: Vec<String>,
    #[serde(default = "default_pairs")]
    pub pairs: Vec<ToolPair>,
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tools: default_tools(),
            pairs: default_pairs(),
            input: InputSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Two tools to compare head to head. Order only affects output layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPair {
    pub tool_a: String,
    pub tool_b: String,
}

impl ToolPair {
    pub fn new(tool_a: impl Into<String>, tool_b: impl Into<String>) -> Self {
        Self {
            tool_a: tool_a.into(),
            tool_b: tool_b.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(default = "default_scenarios")]
    pub scenarios: PathBuf,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            scenarios: default_scenarios(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Also write logs to `mergebench.log` in this directory.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_tools() -> Vec<String> {
    vec!["diff3".into(), "mergiraf-semi".into(), "mergiraf".into()]
}
fn default_pairs() -> Vec<ToolPair> {
    vec![
        ToolPair::new("diff3", "mergiraf"),
        ToolPair::new("diff3", "mergiraf-semi"),
        ToolPair::new("mergiraf-semi", "mergiraf"),
    ]
}
fn default_scenarios() -> PathBuf {
    PathBuf::from("examples/swift/scenarios.json")
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write the built-in defaults to `path`, ignoring any loaded or
    /// overridden values.
    pub fn write_default(path: &Path) -> anyhow::Result<Self> {
        let settings = Self::default();
        settings.save(path)?;
        Ok(settings)
    }

    /// Every pair must name two distinct configured tools.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tools.is_empty() {
            return Err(ConfigError::EmptyTools);
        }
        for pair in &self.pairs {
            if pair.tool_a == pair.tool_b {
                return Err(ConfigError::SelfPair(pair.tool_a.clone()));
            }
            for tool in [&pair.tool_a, &pair.tool_b] {
                if !self.tools.contains(tool) {
                    return Err(ConfigError::UnknownTool {
                        tool_a: pair.tool_a.clone(),
                        tool_b: pair.tool_b.clone(),
                        unknown: tool.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
