//! Segment table: address bounds per canonical segment plus the methods
//! classified into each one.
//!
//! A table belongs to a single verification run. It is built from scratch by
//! the parser and handed to the verifier; nothing is shared between runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{SegmentBounds, SegmentKind, UNKNOWN_SEGMENT};

/// Serializable view of one registered segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentEntry {
    pub kind: SegmentKind,
    pub label: String,
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentTable {
    bounds: BTreeMap<SegmentKind, SegmentBounds>,
    methods: BTreeMap<SegmentKind, Vec<String>>,
}

impl SegmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bounds for a raw segment label.
    ///
    /// The label is resolved through the alias table. Unknown labels are
    /// reported and dropped; some runtime configurations legitimately announce
    /// segments this checker does not track. A repeated announcement for the
    /// same canonical segment replaces the earlier bounds.
    pub fn add_segment(&mut self, label: &str, start: u64, end: u64) -> Option<SegmentKind> {
        let Some(kind) = SegmentKind::from_label(label) else {
            warn!(label, "unexpected code-cache segment; ignoring");
            return None;
        };
        let bounds = SegmentBounds::new(start, end);
        if let Some(previous) = self.bounds.insert(kind, bounds) {
            if previous != bounds {
                debug!(
                    segment = kind.as_str(),
                    old_start = previous.start,
                    old_end = previous.end,
                    start,
                    end,
                    "segment re-announced; keeping latest bounds"
                );
            }
        }
        Some(kind)
    }

    /// Segment containing `address`, checked hot, non-profiled, profiled, then non-method.
    pub fn classify(&self, address: u64) -> Option<SegmentKind> {
        SegmentKind::CLASSIFY_ORDER
            .into_iter()
            .find(|kind| self.bounds.get(kind).is_some_and(|b| b.contains(address)))
    }

    /// Human-readable segment label for `address`, or `"UNKNOWN"`.
    pub fn segment_name_for(&self, address: u64) -> &'static str {
        self.classify(address).map(SegmentKind::label).unwrap_or(UNKNOWN_SEGMENT)
    }

    /// Classify `address` and append `name` to that segment's method list.
    ///
    /// Returns `None` (and records nothing) when no segment contains the address.
    pub fn add_method(&mut self, address: u64, name: &str) -> Option<SegmentKind> {
        let kind = self.classify(address)?;
        self.methods.entry(kind).or_default().push(name.to_string());
        Some(kind)
    }

    pub fn bounds(&self, kind: SegmentKind) -> Option<SegmentBounds> {
        self.bounds.get(&kind).copied()
    }

    /// Methods classified into `kind`, in input order.
    pub fn methods(&self, kind: SegmentKind) -> &[String] {
        self.methods.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Registered segments in classification order.
    pub fn segments(&self) -> Vec<SegmentEntry> {
        self.bounds
            .iter()
            .map(|(kind, b)| SegmentEntry {
                kind: *kind,
                label: kind.label().to_string(),
                start: b.start,
                end: b.end,
            })
            .collect()
    }

    /// Per-segment method lists, including empty lists for registered segments.
    pub fn method_lists(&self) -> BTreeMap<SegmentKind, Vec<String>> {
        let mut lists: BTreeMap<SegmentKind, Vec<String>> =
            self.bounds.keys().map(|kind| (*kind, Vec::new())).collect();
        for (kind, names) in &self.methods {
            lists.insert(*kind, names.clone());
        }
        lists
    }

    pub fn method_count(&self) -> usize {
        self.methods.values().map(Vec::len).sum()
    }
}
