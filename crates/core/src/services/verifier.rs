use serde::{Deserialize, Serialize};

use crate::codeheap::SegmentTable;
use crate::model::SegmentKind;

/// What the caller expects of the hot segment's method list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotExpectation {
    /// Hot placement must have happened.
    #[default]
    NonEmpty,
    /// Nothing may be placed in the hot segment (e.g. its capacity is configured to zero).
    Empty,
    /// Emptiness is not checked; only predicate placement is.
    Unchecked,
}

impl HotExpectation {
    pub fn as_str(self) -> &'static str {
        match self {
            HotExpectation::NonEmpty => "non-empty",
            HotExpectation::Empty => "empty",
            HotExpectation::Unchecked => "unchecked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "non-empty" | "non_empty" => Some(HotExpectation::NonEmpty),
            "empty" => Some(HotExpectation::Empty),
            "unchecked" => Some(HotExpectation::Unchecked),
            _ => None,
        }
    }
}

/// Per-run placement rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacementPolicy {
    #[serde(default)]
    pub hot: HotExpectation,
    /// The hot segment is deliberately small; expected-hot methods may overflow
    /// into the non-profiled or profiled segment, and at least one must.
    #[serde(default)]
    pub capacity_constrained: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    HotSegmentEmpty,
    HotSegmentNotEmpty,
    UnexpectedInHot,
    ExpectedHotOutside,
    MissingSpillover,
}

/// One placement problem.
///
/// `expected: None` on a method-level violation means "any segment but hot".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub expected: Option<SegmentKind>,
    pub actual: Option<SegmentKind>,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Checks the hot/non-hot invariant over a populated segment table.
///
/// Every violation is collected; nothing here aborts.
pub struct PlacementVerifier<P> {
    policy: PlacementPolicy,
    is_expected_hot: P,
}

impl<P> PlacementVerifier<P>
where
    P: Fn(&str) -> bool,
{
    pub fn new(policy: PlacementPolicy, is_expected_hot: P) -> Self {
        Self { policy, is_expected_hot }
    }

    pub fn verify(&self, table: &SegmentTable) -> Vec<Violation> {
        let mut violations = Vec::new();
        let hot = table.methods(SegmentKind::Hot);

        match self.policy.hot {
            HotExpectation::NonEmpty if hot.is_empty() => violations.push(Violation {
                kind: ViolationKind::HotSegmentEmpty,
                method: None,
                expected: Some(SegmentKind::Hot),
                actual: None,
                message: "hot segment is empty".to_string(),
            }),
            HotExpectation::Empty => {
                violations.extend(hot.iter().map(|name| Violation {
                    kind: ViolationKind::HotSegmentNotEmpty,
                    method: Some(name.clone()),
                    expected: None,
                    actual: Some(SegmentKind::Hot),
                    message: format!("hot segment must be empty, found: {name}"),
                }));
                // No method is expected hot in this mode.
                return violations;
            }
            _ => {}
        }

        for name in hot.iter().filter(|name| !(self.is_expected_hot)(name.as_str())) {
            violations.push(Violation {
                kind: ViolationKind::UnexpectedInHot,
                method: Some(name.clone()),
                expected: None,
                actual: Some(SegmentKind::Hot),
                message: format!("hot segment contains wrong method: {name}"),
            });
        }

        let mut spilled = 0usize;
        for kind in [SegmentKind::NonProfiled, SegmentKind::Profiled] {
            let methods = table.methods(kind);
            for name in methods.iter().filter(|name| (self.is_expected_hot)(name.as_str())) {
                if self.policy.capacity_constrained {
                    spilled += 1;
                    continue;
                }
                violations.push(Violation {
                    kind: ViolationKind::ExpectedHotOutside,
                    method: Some(name.clone()),
                    expected: Some(SegmentKind::Hot),
                    actual: Some(kind),
                    message: format!("{} segment contains wrong method: {name}", kind.label()),
                });
            }
        }

        if self.policy.capacity_constrained && spilled == 0 {
            violations.push(Violation {
                kind: ViolationKind::MissingSpillover,
                method: None,
                expected: None,
                actual: None,
                message: "hot segment is capacity-constrained but no expected-hot method spilled \
                          into the non-profiled or profiled segment"
                    .to_string(),
            });
        }

        violations
    }
}
