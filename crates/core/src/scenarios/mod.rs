//! Verification scenarios: which methods are expected hot and what the hot
//! segment should look like for one run.
//!
//! Scenarios are plain serde structs so they can live next to captured
//! diagnostic output as JSON or YAML files. A handful of presets cover the
//! standard placement runs (compile-command file, directives file, segmented
//! without tiering, unsegmented cache, zero-sized and undersized hot heap).

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::verifier::{HotExpectation, PlacementPolicy};

/// Package prefix the standard presets mark as hot.
pub const DEFAULT_HOT_PREFIX: &str = "java";

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Invalid scenario: {0}")]
    Invalid(String),
    #[error("Unknown scenario preset '{name}'. Available: {available}")]
    UnknownPreset { name: String, available: String },
    #[error("Failed to read scenario file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse scenario YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid method name pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Predicate over a method's qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NamePredicate {
    Prefix { prefix: String },
    Exact { name: String },
    Pattern { pattern: String },
}

impl NamePredicate {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        NamePredicate::Prefix { prefix: prefix.into() }
    }

    pub fn compile(&self) -> Result<NameMatcher, ScenarioError> {
        Ok(match self {
            NamePredicate::Prefix { prefix } => NameMatcher::Prefix(prefix.clone()),
            NamePredicate::Exact { name } => NameMatcher::Exact(name.clone()),
            NamePredicate::Pattern { pattern } => NameMatcher::Pattern(Regex::new(pattern)?),
        })
    }

    fn describe(&self) -> String {
        match self {
            NamePredicate::Prefix { prefix } => format!("name starts with '{prefix}'"),
            NamePredicate::Exact { name } => format!("name is '{name}'"),
            NamePredicate::Pattern { pattern } => format!("name matches /{pattern}/"),
        }
    }
}

/// Compiled form of [`NamePredicate`].
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Prefix(String),
    Exact(String),
    Pattern(Regex),
}

impl NameMatcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Prefix(prefix) => name.starts_with(prefix.as_str()),
            NameMatcher::Exact(expected) => name == expected,
            NameMatcher::Pattern(re) => re.is_match(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub expected_hot: NamePredicate,
    #[serde(default)]
    pub hot: HotExpectation,
    #[serde(default)]
    pub capacity_constrained: bool,
}

impl Scenario {
    pub fn new(name: impl Into<String>, expected_hot: NamePredicate) -> Self {
        Self {
            name: name.into(),
            description: None,
            expected_hot,
            hot: HotExpectation::NonEmpty,
            capacity_constrained: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_hot(mut self, hot: HotExpectation) -> Self {
        self.hot = hot;
        self
    }

    pub fn with_capacity_constrained(mut self, capacity_constrained: bool) -> Self {
        self.capacity_constrained = capacity_constrained;
        self
    }

    pub fn policy(&self) -> PlacementPolicy {
        PlacementPolicy { hot: self.hot, capacity_constrained: self.capacity_constrained }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.name.trim().is_empty() {
            return Err(ScenarioError::Invalid("'name' is required".into()));
        }
        match &self.expected_hot {
            NamePredicate::Prefix { prefix } if prefix.is_empty() => {
                return Err(ScenarioError::Invalid("expected_hot prefix must not be empty".into()))
            }
            NamePredicate::Exact { name } if name.is_empty() => {
                return Err(ScenarioError::Invalid("expected_hot name must not be empty".into()))
            }
            NamePredicate::Pattern { pattern } => {
                Regex::new(pattern)?;
            }
            _ => {}
        }
        if self.capacity_constrained && self.hot == HotExpectation::Empty {
            return Err(ScenarioError::Invalid(
                "a capacity-constrained hot segment cannot also be expected empty".into(),
            ));
        }
        Ok(())
    }

    /// One-line summary for listings.
    pub fn summary(&self) -> String {
        let mut parts = vec![self.expected_hot.describe(), format!("hot {}", self.hot.as_str())];
        if self.capacity_constrained {
            parts.push("capacity-constrained".into());
        }
        parts.join(", ")
    }

    pub fn from_json_str(body: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(body)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_yaml_str(body: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_yaml::from_str(body)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load a scenario file; `.json` is parsed as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        let body = std::fs::read_to_string(path)
            .map_err(|source| ScenarioError::Io { path: path.to_path_buf(), source })?;
        if is_json_path(path) {
            Self::from_json_str(&body)
        } else {
            Self::from_yaml_str(&body)
        }
    }

    /// Serialize in the format implied by `path`'s extension.
    pub fn to_string_for_path(&self, path: &Path) -> Result<String, ScenarioError> {
        if is_json_path(path) {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(serde_yaml::to_string(self)?)
        }
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Built-in scenarios, sorted by name.
pub fn presets() -> Vec<Scenario> {
    let java = || NamePredicate::prefix(DEFAULT_HOT_PREFIX);
    let mut all = vec![
        Scenario::new("command-file", java())
            .with_description("Hot placement requested through a compile-command file"),
        Scenario::new("directives-file", java())
            .with_description("Hot placement requested through a compiler directives file"),
        Scenario::new("segmented-non-tiered", java())
            .with_description("Segmented code cache with tiered compilation disabled"),
        Scenario::new("non-segmented", java())
            .with_description("Unsegmented code cache with an extra-hot cache"),
        Scenario::new("empty-hot-segment", java())
            .with_description("Hot heap sized too small for any method; nothing marked hot")
            .with_hot(HotExpectation::Empty),
        Scenario::new("small-hot-segment", java())
            .with_description("Undersized hot heap; remaining hot methods overflow")
            .with_capacity_constrained(true),
    ];
    all.sort_by(|a, b| a.name.cmp(&b.name));
    all
}

pub fn preset(name: &str) -> Result<Scenario, ScenarioError> {
    let all = presets();
    let names = all.iter().map(|s| s.name.clone()).collect::<Vec<_>>().join(", ");
    all.into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| ScenarioError::UnknownPreset { name: name.to_string(), available: names })
}
