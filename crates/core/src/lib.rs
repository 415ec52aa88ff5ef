//! codeheap-core
//!
//! Core library for checking where compiled methods landed in a segmented
//! code cache.
//!
//! It parses captured diagnostic output (code-cache segment bounds and the
//! compiled-method list), classifies every fully optimized method into the
//! segment whose address range contains it, and verifies the hot-segment
//! placement rules for a scenario. Launching the runtime and capturing its
//! output is left to the caller.

pub mod codeheap;
pub mod model;
pub mod scenarios;
pub mod services;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
