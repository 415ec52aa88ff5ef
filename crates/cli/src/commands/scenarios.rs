use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use codeheap_core::scenarios::{self, Scenario};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ScenarioInfo {
    pub name: String,
    pub description: Option<String>,
    pub summary: String,
}

impl From<&Scenario> for ScenarioInfo {
    fn from(scenario: &Scenario) -> Self {
        Self {
            name: scenario.name.clone(),
            description: scenario.description.clone(),
            summary: scenario.summary(),
        }
    }
}

/// List the built-in scenario presets.
pub fn list_scenarios_command(json: bool) -> Result<()> {
    let entries: Vec<ScenarioInfo> = scenarios::presets().iter().map(ScenarioInfo::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Scenarios:");
    for entry in entries {
        match entry.description {
            Some(desc) => println!("- {}: {} [{}]", entry.name, desc, entry.summary),
            None => println!("- {} [{}]", entry.name, entry.summary),
        }
    }
    Ok(())
}

/// Write a scenario file (JSON or YAML by extension) seeded from a preset.
pub fn init_scenario_command(path: &str, preset: Option<&str>, force: bool) -> Result<()> {
    let target = Path::new(path);
    if target.exists() && !force {
        return Err(anyhow!(
            "Scenario file already exists at {} (use --force to overwrite)",
            target.display()
        ));
    }

    let scenario = scenarios::preset(preset.unwrap_or("directives-file"))?;
    let body = scenario.to_string_for_path(target)?;
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(target, body)
        .with_context(|| format!("Failed to write scenario file at {}", target.display()))?;

    println!("Wrote scenario '{}' to {}", scenario.name, target.display());
    Ok(())
}
