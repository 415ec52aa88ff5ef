use anyhow::Result;
use clap::{Parser, Subcommand};

use codeheap_check::commands::{
    classify_command, init_scenario_command, list_scenarios_command, segments_command,
    verify_command, ScenarioArgs,
};
use codeheap_check::{init_tracing, STDIN_INPUT};

/// Code-cache segment placement checker.
///
/// This CLI is a thin wrapper around `codeheap-core`. It reads output captured
/// from the runtime's code-cache and code-list diagnostic commands and checks
/// which segment each optimized method was installed in.
#[derive(Parser, Debug)]
#[command(
    name = "codeheap-check",
    version,
    about = "Verify hot code-cache segment placement from captured diagnostic output",
    long_about = None
)]
struct Cli {
    /// Log parser decisions to stderr (RUST_LOG overrides).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify hot-segment placement for a scenario.
    ///
    /// Exits non-zero when any violation is found or when an optimized method
    /// lies outside every announced segment.
    Verify {
        /// Captured diagnostic output, or `-` for stdin.
        #[arg(long, default_value = STDIN_INPUT)]
        input: String,

        /// Scenario file (JSON or YAML).
        #[arg(long)]
        scenario: Option<String>,

        /// Built-in scenario preset (see `scenarios`).
        #[arg(long)]
        preset: Option<String>,

        /// Qualified-name prefix of methods expected in the hot segment.
        #[arg(long)]
        prefix: Option<String>,

        /// Expected state of the hot segment: non-empty, empty, or unchecked.
        #[arg(long)]
        expect_hot: Option<String>,

        /// The hot segment is undersized; expected-hot methods may overflow.
        #[arg(long, default_value_t = false)]
        capacity_constrained: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show parsed segments and the optimized methods classified into each.
    Segments {
        /// Captured diagnostic output, or `-` for stdin.
        #[arg(long, default_value = STDIN_INPUT)]
        input: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Report which segment contains an address.
    Classify {
        /// Captured diagnostic output, or `-` for stdin.
        #[arg(long, default_value = STDIN_INPUT)]
        input: String,

        /// Hexadecimal address, e.g. 0x00007f764cac9000.
        #[arg(long)]
        address: String,
    },

    /// List built-in scenario presets.
    Scenarios {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write an editable scenario file seeded from a preset.
    InitScenario {
        /// Destination path; `.json` writes JSON, anything else YAML.
        #[arg(long)]
        path: String,

        /// Preset to start from. Defaults to `directives-file`.
        #[arg(long)]
        preset: Option<String>,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Verify {
            input,
            scenario,
            preset,
            prefix,
            expect_hot,
            capacity_constrained,
            json,
        } => {
            let args = ScenarioArgs {
                scenario_file: scenario,
                preset,
                prefix,
                expect_hot,
                capacity_constrained,
            };
            verify_command(&input, &args, json)?
        }
        Command::Segments { input, json } => segments_command(&input, json)?,
        Command::Classify { input, address } => classify_command(&input, &address)?,
        Command::Scenarios { json } => list_scenarios_command(json)?,
        Command::InitScenario { path, preset, force } => {
            init_scenario_command(&path, preset.as_deref(), force)?
        }
    }

    Ok(())
}
