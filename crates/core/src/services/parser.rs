use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::codeheap::SegmentTable;
use crate::model::{parse_hex_address, MethodRecord, SegmentBounds};
use crate::services::check::CheckError;

/// `<id> <tier> <state> <qualified.name>(<sig>)<ret> [0xADDR, ...`
static METHOD_RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(\d+)\s+(\d+)\s+(\d+)\s+([^\s(\[]+)\([^)]*\)\S*\s+\[\s*(0[xX][0-9A-Fa-f]+)\s*[,\]]",
    )
    .expect("method record pattern is valid")
});

const HEAP_HEADER_PREFIX: &str = "CodeHeap '";
const UNSEGMENTED_HEADER_MARKER: &str = "Cache: size=";

/// Classification of a single line of diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticLine<'a> {
    /// First half of a segment announcement; carries the raw segment label.
    /// The line that follows it is always the bounds line.
    SegmentHeader(&'a str),
    Method(MethodRecord),
    Other,
}

/// A segment announcement: header label plus the bounds from the following line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentAnnouncement {
    pub label: String,
    pub bounds: SegmentBounds,
}

/// Everything extracted from one diagnostic capture.
#[derive(Debug, Clone, Default)]
pub struct ParsedOutput {
    pub table: SegmentTable,
    /// Optimized methods whose address fell outside every announced segment.
    pub unclassified: Vec<MethodRecord>,
    /// Announced labels that are not in the alias table.
    pub ignored_segments: Vec<String>,
    /// Method records below the optimized tier.
    pub lower_tier_records: usize,
    pub skipped_lines: usize,
}

impl ParsedOutput {
    /// Hand over the table, failing if any optimized method could not be placed.
    pub fn into_table(self) -> Result<SegmentTable, CheckError> {
        if self.unclassified.is_empty() {
            Ok(self.table)
        } else {
            Err(CheckError::unclassifiable(self.unclassified))
        }
    }
}

/// Parser for the combined output of the code-cache and code-list diagnostic commands.
pub struct OutputParser;

impl OutputParser {
    pub fn parse_str(text: &str) -> ParsedOutput {
        Self::parse(text.lines())
    }

    /// Walk the lines once, registering segments and classifying optimized
    /// methods against the segments announced so far.
    pub fn parse<I, S>(lines: I) -> ParsedOutput
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = ParsedOutput::default();
        let mut lines = lines.into_iter();

        while let Some(raw) = lines.next() {
            let line = raw.as_ref();
            match recognize(line) {
                DiagnosticLine::SegmentHeader(_) => {
                    let Some(bounds_raw) = lines.next() else {
                        debug!(header = line, "segment header at end of input; no bounds line");
                        out.skipped_lines += 1;
                        break;
                    };
                    match parse_announcement(line, bounds_raw.as_ref()) {
                        Some(ann) => {
                            let accepted =
                                out.table.add_segment(&ann.label, ann.bounds.start, ann.bounds.end);
                            if accepted.is_none() {
                                out.ignored_segments.push(ann.label);
                            }
                        }
                        None => {
                            debug!(
                                header = line,
                                bounds = bounds_raw.as_ref(),
                                "malformed segment bounds; skipping"
                            );
                            out.skipped_lines += 2;
                        }
                    }
                }
                DiagnosticLine::Method(record) => {
                    if !record.is_optimized() {
                        out.lower_tier_records += 1;
                        continue;
                    }
                    match out.table.add_method(record.address, &record.name) {
                        Some(kind) => {
                            trace!(
                                method = %record.name,
                                address = record.address,
                                segment = kind.as_str(),
                                "classified"
                            );
                        }
                        None => {
                            debug!(
                                method = %record.name,
                                address = record.address,
                                "optimized method outside every known segment"
                            );
                            out.unclassified.push(record);
                        }
                    }
                }
                DiagnosticLine::Other => out.skipped_lines += 1,
            }
        }

        out
    }
}

/// Decide which grammar rule, if any, a line starts.
pub fn recognize(line: &str) -> DiagnosticLine<'_> {
    if let Some(label) = parse_segment_header(line) {
        return DiagnosticLine::SegmentHeader(label);
    }
    match parse_method_record(line) {
        Some(record) => DiagnosticLine::Method(record),
        None => DiagnosticLine::Other,
    }
}

/// Extract the raw segment label from a header line.
///
/// Segmented caches report `CodeHeap 'non-profiled nmethods': size=...`;
/// unsegmented ones report `CodeCache: size=...` or `ExtraHotCache: size=...`.
pub fn parse_segment_header(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if let Some(rest) = line.strip_prefix(HEAP_HEADER_PREFIX) {
        return rest.split('\'').next().filter(|label| !label.is_empty());
    }
    if line.contains(UNSEGMENTED_HEADER_MARKER) {
        let end = line.find(": ")?;
        let label = line[..end].trim();
        return (!label.is_empty()).then_some(label);
    }
    None
}

/// Parse `bounds [0xSTART, 0xMID, 0xEND]` into inclusive start/end.
pub fn parse_bounds(line: &str) -> Option<SegmentBounds> {
    let open = line.find('[')?;
    let rest = &line[open + 1..];
    let close = rest.find(']')?;
    let values: Vec<&str> = rest[..close].split(',').map(str::trim).collect();
    if values.len() < 3 {
        return None;
    }
    let start = parse_hex_address(values[0])?;
    let end = parse_hex_address(values[2])?;
    (start <= end).then(|| SegmentBounds::new(start, end))
}

/// Two-line announcement rule: header line followed by its bounds line.
pub fn parse_announcement(header: &str, bounds_line: &str) -> Option<SegmentAnnouncement> {
    let label = parse_segment_header(header)?;
    let bounds = parse_bounds(bounds_line)?;
    Some(SegmentAnnouncement { label: label.to_string(), bounds })
}

/// Parse one code-list line such as
/// `11 4 0 java.lang.Enum.ordinal()I [0x00007f91e0ac9610, 0x00007f91e0ac97a0 - ...]`.
pub fn parse_method_record(line: &str) -> Option<MethodRecord> {
    let caps = METHOD_RECORD.captures(line)?;
    Some(MethodRecord {
        compile_id: caps[1].parse().ok()?,
        tier: caps[2].parse().ok()?,
        state: caps[3].parse().ok()?,
        name: caps[4].to_string(),
        address: parse_hex_address(&caps[5])?,
    })
}
