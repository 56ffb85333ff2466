//! Scenario runner for the hive hook system.
//!
//! Runs named scenarios against [`hive_graph`]'s hook dispatcher and prints a
//! status line per scenario:
//!
//! ```text
//! === Running Hook System Tests ===
//! Basic Hooks          PASSED (0.1ms)
//! Skip Short-Circuit   PASSED (0.0ms)
//!
//! ✅ All hook system tests passed!
//! ```
//!
//! The `hook-harness` binary exits with 0 when every scenario passed, 1 when
//! any did not, and 2 on invalid arguments.

/// Command-line configuration.
pub mod config;

/// Scenario execution and reporting.
pub mod runner;

/// Built-in scenarios.
pub mod scenarios;

pub use config::{ConfigError, HarnessConfig};
pub use runner::{
    Scenario, ScenarioError, ScenarioOutcome, ScenarioStatus, SuiteReport,
    install_quiet_panic_hook, run_scenarios,
};
pub use scenarios::default_scenarios;
