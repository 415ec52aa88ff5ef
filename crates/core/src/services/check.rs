use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::codeheap::SegmentEntry;
use crate::model::{MethodRecord, SegmentKind};
use crate::scenarios::{NameMatcher, Scenario, ScenarioError};
use crate::services::parser::OutputParser;
use crate::services::verifier::{PlacementVerifier, Violation};

#[derive(Debug, Error)]
pub enum CheckError {
    /// The segment and method streams disagree about the memory layout.
    #[error("{}", unclassifiable_message(.0))]
    UnclassifiableMethods(Vec<MethodRecord>),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

fn unclassifiable_message(methods: &[MethodRecord]) -> String {
    match methods.first() {
        Some(first) => format!(
            "{} optimized method(s) do not belong to any code-cache segment (first: {} at 0x{:x})",
            methods.len(),
            first.name,
            first.address
        ),
        None => "optimized methods do not belong to any code-cache segment".to_string(),
    }
}

impl CheckError {
    pub fn unclassifiable(methods: Vec<MethodRecord>) -> Self {
        CheckError::UnclassifiableMethods(methods)
    }

    /// Records that could not be placed, if that is what went wrong.
    pub fn unclassified_methods(&self) -> &[MethodRecord] {
        match self {
            CheckError::UnclassifiableMethods(methods) => methods,
            CheckError::Scenario(_) => &[],
        }
    }
}

/// Outcome of one verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub scenario: String,
    pub segments: Vec<SegmentEntry>,
    pub methods: BTreeMap<SegmentKind, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_segments: Vec<String>,
    pub violations: Vec<Violation>,
}

impl PlacementReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn methods_in(&self, kind: SegmentKind) -> &[String] {
        self.methods.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Ties a scenario to the parser and verifier for one capture.
pub struct PlacementCheck<'a> {
    scenario: &'a Scenario,
    matcher: NameMatcher,
}

impl<'a> PlacementCheck<'a> {
    pub fn new(scenario: &'a Scenario) -> Result<Self, CheckError> {
        scenario.validate()?;
        let matcher = scenario.expected_hot.compile()?;
        Ok(Self { scenario, matcher })
    }

    pub fn run(&self, text: &str) -> Result<PlacementReport, CheckError> {
        self.run_lines(text.lines())
    }

    pub fn run_lines<I, S>(&self, lines: I) -> Result<PlacementReport, CheckError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = OutputParser::parse(lines);
        let ignored_segments = parsed.ignored_segments.clone();
        let table = parsed.into_table()?;

        let verifier =
            PlacementVerifier::new(self.scenario.policy(), |name: &str| self.matcher.matches(name));
        let violations = verifier.verify(&table);

        info!(
            scenario = %self.scenario.name,
            segments = table.segments().len(),
            methods = table.method_count(),
            violations = violations.len(),
            "placement check finished"
        );

        Ok(PlacementReport {
            scenario: self.scenario.name.clone(),
            segments: table.segments(),
            methods: table.method_lists(),
            ignored_segments,
            violations,
        })
    }
}
