//! Hook system scenario runner.
//!
//! # Usage
//!
//! ```bash
//! hook-harness [--debug] [--log-format pretty|compact|json] [--log-level LEVEL] [SCENARIO...]
//! ```
//!
//! # Example
//!
//! ```bash
//! hook-harness --debug "Skip Short-Circuit"
//! ```

use std::io::Write;

use hook_harness::config::USAGE;
use hook_harness::{HarnessConfig, default_scenarios, install_quiet_panic_hook, run_scenarios};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match HarnessConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    config.tracing_config().init();
    install_quiet_panic_hook();

    let scenarios = match config.select(default_scenarios()) {
        Ok(scenarios) => scenarios,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let mut stdout = std::io::stdout().lock();
    let outcome = run_scenarios(&scenarios, &config, &mut stdout)
        .await
        .and_then(|report| stdout.flush().map(|()| report));

    match outcome {
        Ok(report) => std::process::exit(report.exit_code()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
