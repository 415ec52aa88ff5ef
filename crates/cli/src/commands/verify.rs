use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use codeheap_core::model::SegmentKind;
use codeheap_core::scenarios::{self, NamePredicate, Scenario};
use codeheap_core::services::{CheckError, HotExpectation, PlacementCheck, PlacementReport};
use serde::Serialize;
use tracing::info;

use crate::{read_input, sha256_bytes};

/// Name given to scenarios assembled purely from command-line flags.
pub const AD_HOC_SCENARIO: &str = "ad-hoc";

/// Scenario selection and overrides as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ScenarioArgs {
    pub scenario_file: Option<String>,
    pub preset: Option<String>,
    pub prefix: Option<String>,
    pub expect_hot: Option<String>,
    pub capacity_constrained: bool,
}

#[derive(Debug, Serialize)]
pub struct VerifyOutput {
    pub generated_at: String,
    pub input: String,
    pub input_sha256: String,
    #[serde(flatten)]
    pub report: PlacementReport,
}

/// Build the scenario for a run: file or preset first, then flag overrides.
pub fn resolve_scenario(args: &ScenarioArgs) -> Result<Scenario> {
    let mut scenario = match (&args.scenario_file, &args.preset) {
        (Some(_), Some(_)) => {
            return Err(anyhow!("--scenario and --preset are mutually exclusive"));
        }
        (Some(file), None) => Scenario::from_path(Path::new(file))
            .with_context(|| format!("Failed to load scenario from {file}"))?,
        (None, Some(name)) => scenarios::preset(name)?,
        (None, None) => Scenario::new(
            AD_HOC_SCENARIO,
            NamePredicate::prefix(scenarios::DEFAULT_HOT_PREFIX),
        ),
    };

    if let Some(prefix) = &args.prefix {
        scenario.expected_hot = NamePredicate::prefix(prefix.clone());
    }
    if let Some(expect) = &args.expect_hot {
        scenario.hot = HotExpectation::parse(expect).ok_or_else(|| {
            anyhow!("Invalid hot expectation '{}'. Allowed: non-empty, empty, unchecked", expect)
        })?;
    }
    if args.capacity_constrained {
        scenario.capacity_constrained = true;
    }
    scenario.validate()?;
    Ok(scenario)
}

/// Parse and verify captured output against a scenario.
pub fn verify_text(text: &str, scenario: &Scenario) -> Result<PlacementReport, CheckError> {
    PlacementCheck::new(scenario)?.run(text)
}

/// Verify captured diagnostic output; fails when any violation is found.
pub fn verify_command(input: &str, args: &ScenarioArgs, json: bool) -> Result<()> {
    let scenario = resolve_scenario(args)?;
    let text = read_input(input)?;
    info!(scenario = %scenario.name, input, bytes = text.len(), "verifying placement");

    let report = match verify_text(&text, &scenario) {
        Ok(report) => report,
        Err(err) => {
            for method in err.unclassified_methods() {
                eprintln!(
                    "unclassifiable: {} at 0x{:x} (tier {})",
                    method.name, method.address, method.tier
                );
            }
            return Err(err.into());
        }
    };

    let violation_count = report.violations.len();
    if json {
        let output = VerifyOutput {
            generated_at: Utc::now().to_rfc3339(),
            input: input.to_string(),
            input_sha256: sha256_bytes(text.as_bytes()),
            report,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize report to JSON")?
        );
    } else {
        print_report(&report, &scenario);
    }

    if violation_count > 0 {
        return Err(anyhow!(
            "{} placement violation(s) in scenario '{}'",
            violation_count,
            scenario.name
        ));
    }
    Ok(())
}

fn print_report(report: &PlacementReport, scenario: &Scenario) {
    println!("Scenario: {} ({})", scenario.name, scenario.summary());
    println!("Segments ({}):", report.segments.len());
    for seg in &report.segments {
        println!(
            "  - {} [0x{:x} - 0x{:x}] methods={}",
            seg.label,
            seg.start,
            seg.end,
            report.methods_in(seg.kind).len()
        );
    }
    for label in &report.ignored_segments {
        println!("  - {label} (ignored)");
    }
    let hot = report.methods_in(SegmentKind::Hot);
    println!("Hot methods ({}):", hot.len());
    for name in hot {
        println!("  - {name}");
    }

    if report.is_clean() {
        println!("Placement OK");
        return;
    }
    println!("Violations ({}):", report.violations.len());
    for violation in &report.violations {
        println!("  - {violation}");
    }
}
