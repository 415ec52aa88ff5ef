use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

pub mod commands;

/// Input path meaning "read from stdin".
pub const STDIN_INPUT: &str = "-";

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown unless
/// `verbose` asks for debug output.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when commands run in-process (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read captured diagnostic output from a file, or from stdin for `-`.
///
/// Invalid UTF-8 is replaced rather than rejected in both cases.
pub fn read_input(input: &str) -> Result<String> {
    let bytes = if input == STDIN_INPUT {
        let mut body = Vec::new();
        std::io::stdin()
            .read_to_end(&mut body)
            .context("Failed to read diagnostic output from stdin")?;
        body
    } else {
        let path = Path::new(input);
        fs::read(path)
            .with_context(|| format!("Failed to read diagnostic output at {}", path.display()))?
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// SHA-256 of a byte slice as lowercase hex.
pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Parse a command-line address (`0x`-prefixed hex).
pub fn parse_address_arg(value: &str) -> Result<u64> {
    codeheap_core::model::parse_hex_address(value).ok_or_else(|| {
        anyhow!("Invalid address '{}'. Expected hexadecimal such as 0x7f00ab000000", value)
    })
}
