//! Core data model for code-cache segments and compiled-method records.
//!
//! The diagnostic output names segments with raw labels that depend on how the
//! runtime was configured (segmented or not, extra-hot heap enabled or not).
//! Everything downstream works with the canonical [`SegmentKind`] instead.

use serde::{Deserialize, Serialize};

/// Canonical code-cache segment.
///
/// Declaration order is the classification order used by the segment table:
/// the first segment whose bounds contain an address wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Extra-hot segment reserved for methods marked for preferential placement.
    Hot,
    /// Non-profiled nmethods (also the bucket for an unsegmented code cache).
    NonProfiled,
    /// Profiled nmethods.
    Profiled,
    /// Non-nmethod code (stubs, adapters, interpreter).
    NonMethod,
}

impl SegmentKind {
    /// Lookup order for classification; overlapping ranges resolve to the earliest entry.
    pub const CLASSIFY_ORDER: [SegmentKind; 4] =
        [SegmentKind::Hot, SegmentKind::NonProfiled, SegmentKind::Profiled, SegmentKind::NonMethod];

    /// Label the runtime uses for this segment in segmented mode.
    pub fn label(self) -> &'static str {
        match self {
            SegmentKind::Hot => "extra-hot",
            SegmentKind::NonProfiled => "non-profiled nmethods",
            SegmentKind::Profiled => "profiled nmethods",
            SegmentKind::NonMethod => "non-nmethods",
        }
    }

    /// Short identifier used in reports and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Hot => "hot",
            SegmentKind::NonProfiled => "non_profiled",
            SegmentKind::Profiled => "profiled",
            SegmentKind::NonMethod => "non_method",
        }
    }

    /// Resolve a raw segment label through the alias table.
    pub fn from_label(label: &str) -> Option<SegmentKind> {
        SEGMENT_ALIASES.iter().find(|(raw, _)| *raw == label).map(|(_, kind)| *kind)
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw label -> canonical segment.
///
/// `CodeCache` and `ExtraHotCache` are what the runtime reports when the code
/// cache is not segmented; the whole cache is treated as non-profiled.
pub static SEGMENT_ALIASES: &[(&str, SegmentKind)] = &[
    ("extra-hot", SegmentKind::Hot),
    ("non-profiled nmethods", SegmentKind::NonProfiled),
    ("profiled nmethods", SegmentKind::Profiled),
    ("non-nmethods", SegmentKind::NonMethod),
    ("CodeCache", SegmentKind::NonProfiled),
    ("ExtraHotCache", SegmentKind::Hot),
];

/// Label reported for addresses outside every known segment.
pub const UNKNOWN_SEGMENT: &str = "UNKNOWN";

/// Compilation tier of the fully optimizing compiler; the only tier whose
/// placement is checked.
pub const OPTIMIZED_TIER: u32 = 4;

/// Inclusive address bounds of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBounds {
    pub start: u64,
    pub end: u64,
}

impl SegmentBounds {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Returns true if `start <= addr <= end`.
    pub fn contains(&self, addr: u64) -> bool {
        self.start <= addr && addr <= self.end
    }
}

/// One compiled-method line from the code list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub compile_id: u64,
    pub tier: u32,
    pub state: u32,
    /// Dot-qualified name without its signature.
    pub name: String,
    /// Entry address (first value of the bracket group).
    pub address: u64,
}

impl MethodRecord {
    pub fn is_optimized(&self) -> bool {
        self.tier == OPTIMIZED_TIER
    }
}

/// Parse a `0x`-prefixed (or bare) hexadecimal address.
pub fn parse_hex_address(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}
