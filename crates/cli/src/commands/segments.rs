use std::collections::BTreeMap;

use anyhow::{Context, Result};
use codeheap_core::codeheap::SegmentEntry;
use codeheap_core::model::{MethodRecord, SegmentKind};
use codeheap_core::services::OutputParser;
use serde::Serialize;

use crate::{parse_address_arg, read_input};

#[derive(Debug, Serialize)]
pub struct SegmentsOutput {
    pub segments: Vec<SegmentEntry>,
    pub methods: BTreeMap<SegmentKind, Vec<String>>,
    pub unclassified: Vec<MethodRecord>,
    pub ignored_segments: Vec<String>,
    pub lower_tier_records: usize,
    /// Lines that were neither a segment announcement nor a method record.
    pub skipped_lines: usize,
}

/// Parse captured output into a segment summary without verifying placement.
pub fn collect_segments(text: &str) -> SegmentsOutput {
    let parsed = OutputParser::parse_str(text);
    SegmentsOutput {
        segments: parsed.table.segments(),
        methods: parsed.table.method_lists(),
        unclassified: parsed.unclassified,
        ignored_segments: parsed.ignored_segments,
        lower_tier_records: parsed.lower_tier_records,
        skipped_lines: parsed.skipped_lines,
    }
}

/// Show the segment table and per-segment methods.
pub fn segments_command(input: &str, json: bool) -> Result<()> {
    let text = read_input(input)?;
    let output = collect_segments(&text);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize segments to JSON")?
        );
        return Ok(());
    }

    println!("Segments ({}):", output.segments.len());
    if output.segments.is_empty() {
        println!("  (none)");
    }
    for seg in &output.segments {
        println!("  - {} [0x{:x} - 0x{:x}]", seg.label, seg.start, seg.end);
        for name in output.methods.get(&seg.kind).into_iter().flatten() {
            println!("      {name}");
        }
    }
    println!(
        "Lower-tier records: {}, skipped lines: {}",
        output.lower_tier_records, output.skipped_lines
    );
    if !output.ignored_segments.is_empty() {
        println!("Ignored segments: {}", output.ignored_segments.join(", "));
    }
    if !output.unclassified.is_empty() {
        println!("Unclassifiable ({}):", output.unclassified.len());
        for method in &output.unclassified {
            println!("  - {} at 0x{:x}", method.name, method.address);
        }
    }
    Ok(())
}

/// Report which segment an address falls in.
pub fn classify_command(input: &str, address: &str) -> Result<()> {
    let addr = parse_address_arg(address)?;
    let text = read_input(input)?;
    let parsed = OutputParser::parse_str(&text);
    println!("0x{:x}: {}", addr, parsed.table.segment_name_for(addr));
    Ok(())
}
