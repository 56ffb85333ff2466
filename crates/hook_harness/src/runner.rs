//! Scenario execution and reporting.

use core::fmt;
use core::future::Future;
use core::panic::AssertUnwindSafe;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::config::HarnessConfig;

/// Banner printed before the first scenario.
pub const BANNER: &str = "\n=== Running Hook System Tests ===";

/// Summary line when every scenario passed.
pub const ALL_PASSED: &str = "✅ All hook system tests passed!";

/// Summary line when any scenario did not pass.
pub const SOME_FAILED: &str = "❌ Some tests failed";

// ─────────────────────────────────────────────────────────────────────────────
// ScenarioError
// ─────────────────────────────────────────────────────────────────────────────

/// Why a scenario did not pass.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// An observed value differed from the expected one.
    #[error("{what}: expected {expected}, got {actual}")]
    Mismatch {
        /// What was being checked.
        what: &'static str,
        /// Expected value, debug-formatted.
        expected: String,
        /// Observed value, debug-formatted.
        actual: String,
    },

    /// A condition the scenario relies on did not hold.
    #[error("check failed: {0}")]
    Check(String),

    /// The scenario panicked.
    #[error("scenario panicked: {0}")]
    Panicked(String),
}

impl ScenarioError {
    /// Fails with a [`ScenarioError::Mismatch`] unless `expected == actual`.
    ///
    /// # Errors
    ///
    /// Returns the mismatch when the values differ.
    pub fn ensure_eq<T, U>(what: &'static str, expected: T, actual: U) -> Result<(), Self>
    where
        T: fmt::Debug + PartialEq<U>,
        U: fmt::Debug,
    {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::Mismatch {
                what,
                expected: format!("{expected:?}"),
                actual: format!("{actual:?}"),
            })
        }
    }

    /// Fails with a [`ScenarioError::Check`] unless `condition` holds.
    ///
    /// # Errors
    ///
    /// Returns the check failure when `condition` is false.
    pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), Self> {
        if condition {
            Ok(())
        } else {
            Err(Self::Check(message.into()))
        }
    }

    fn from_panic(payload: &(dyn core::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        Self::Panicked(message)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario
// ─────────────────────────────────────────────────────────────────────────────

type ScenarioFn = Box<dyn Fn() -> BoxFuture<'static, Result<(), ScenarioError>> + Send + Sync>;

/// A named, self-contained check of the hook system.
pub struct Scenario {
    name: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    /// Creates a scenario from an async function.
    pub fn new<F, Fut>(name: &'static str, run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ScenarioError>> + Send + 'static,
    {
        Self {
            name,
            run: Box::new(move || run().boxed()),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the scenario, turning a panic into [`ScenarioError::Panicked`].
    pub async fn run(&self) -> Result<(), ScenarioError> {
        let run = &self.run;
        AssertUnwindSafe(async move { run().await })
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ScenarioError::from_panic(payload.as_ref())))
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario").field("name", &self.name).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Report
// ─────────────────────────────────────────────────────────────────────────────

/// How a single scenario ended.
#[derive(Debug)]
pub enum ScenarioStatus {
    /// Every check held.
    Passed,
    /// A check did not hold.
    Failed(ScenarioError),
    /// The scenario panicked.
    Errored(ScenarioError),
}

/// The outcome of one scenario.
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub name: &'static str,
    /// How it ended.
    pub status: ScenarioStatus,
    /// Wall-clock time spent running it.
    pub elapsed: Duration,
}

impl ScenarioOutcome {
    /// Whether the scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self.status, ScenarioStatus::Passed)
    }

    /// The error, if the scenario did not pass.
    #[must_use]
    pub fn error(&self) -> Option<&ScenarioError> {
        match &self.status {
            ScenarioStatus::Passed => None,
            ScenarioStatus::Failed(err) | ScenarioStatus::Errored(err) => Some(err),
        }
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.elapsed.as_secs_f64() * 1000.0;
        match &self.status {
            ScenarioStatus::Passed => write!(f, "{:<20} PASSED ({millis:.1}ms)", self.name),
            ScenarioStatus::Failed(err) => {
                write!(f, "{:<20} FAILED ({millis:.1}ms): {err}", self.name)
            }
            ScenarioStatus::Errored(err) => write!(f, "{:<20} ERROR: {err}", self.name),
        }
    }
}

/// Outcomes of a harness run, in execution order.
#[derive(Debug, Default)]
pub struct SuiteReport {
    /// One entry per scenario run.
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    /// Whether every scenario passed. An empty run counts as passing.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(ScenarioOutcome::passed)
    }

    /// Number of scenarios that passed.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.passed()).count()
    }

    /// Number of scenarios that did not pass.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.passed_count()
    }

    /// Process exit code: 0 when everything passed, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() { 0 } else { 1 }
    }

    /// The closing summary line.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        if self.all_passed() {
            ALL_PASSED
        } else {
            SOME_FAILED
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// run_scenarios
// ─────────────────────────────────────────────────────────────────────────────

/// Runs each scenario in order, writing one status line per scenario and a
/// closing summary to `out`.
///
/// A failing or panicking scenario does not stop the run. With
/// [`HarnessConfig::debug`] set, each failure is followed by its debug form
/// and source chain.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails.
pub async fn run_scenarios<W: Write>(
    scenarios: &[Scenario],
    config: &HarnessConfig,
    out: &mut W,
) -> io::Result<SuiteReport> {
    writeln!(out, "{BANNER}")?;

    let mut report = SuiteReport::default();
    for scenario in scenarios {
        let start = Instant::now();
        let result = scenario.run().await;
        let elapsed = start.elapsed();

        let status = match result {
            Ok(()) => ScenarioStatus::Passed,
            Err(err @ ScenarioError::Panicked(_)) => ScenarioStatus::Errored(err),
            Err(err) => ScenarioStatus::Failed(err),
        };
        let outcome = ScenarioOutcome {
            name: scenario.name(),
            status,
            elapsed,
        };

        writeln!(out, "{outcome}")?;
        if config.debug
            && let Some(err) = outcome.error()
        {
            write_debug_detail(out, err)?;
        }

        tracing::debug!(
            scenario = outcome.name,
            passed = outcome.passed(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "scenario finished"
        );
        report.outcomes.push(outcome);
    }

    writeln!(out)?;
    writeln!(out, "{}", report.summary())?;
    Ok(report)
}

/// Routes panic messages to `tracing` at debug level instead of stderr.
///
/// Hook panics are reported by dispatch and scenario panics by
/// [`run_scenarios`], so the default hook's output would repeat them.
pub fn install_quiet_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::debug!(panic = %info, "panic caught");
    }));
}

fn write_debug_detail<W: Write>(out: &mut W, err: &ScenarioError) -> io::Result<()> {
    writeln!(out, "    {err:?}")?;
    let mut source = core::error::Error::source(err);
    while let Some(cause) = source {
        writeln!(out, "    caused by: {cause}")?;
        source = cause.source();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(report_config: &HarnessConfig, scenarios: &[Scenario]) -> (SuiteReport, String) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("tokio runtime");
        let mut out = Vec::new();
        let report = runtime
            .block_on(run_scenarios(scenarios, report_config, &mut out))
            .expect("writing to a Vec cannot fail");
        (report, String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn ensure_eq_reports_both_sides() {
        let err = ScenarioError::ensure_eq("log", vec!["a"], vec!["b"]).unwrap_err();
        assert_eq!(err.to_string(), r#"log: expected ["a"], got ["b"]"#);
        assert!(ScenarioError::ensure_eq("count", 2_u32, 2_u32).is_ok());
    }

    #[test]
    fn ensure_checks_condition() {
        assert!(ScenarioError::ensure(true, "fine").is_ok());
        assert_eq!(
            ScenarioError::ensure(false, "hooks remain").unwrap_err().to_string(),
            "check failed: hooks remain"
        );
    }

    fn explode() -> ScenarioError {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn scenario_panic_becomes_error() {
        let scenario = Scenario::new("Boom", || async { Err(explode()) });
        let err = scenario.run().await.unwrap_err();
        assert!(matches!(err, ScenarioError::Panicked(ref msg) if msg == "kaboom"));
    }

    #[test]
    fn mixed_run_reports_each_scenario() {
        let scenarios = vec![
            Scenario::new("Passing", || async { Ok(()) }),
            Scenario::new("Mismatched", || async {
                ScenarioError::ensure_eq("count", 1_u32, 2_u32)
            }),
            Scenario::new("Exploding", || async { Err(explode()) }),
        ];

        let (report, output) = render(&HarnessConfig::default(), &scenarios);
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "=== Running Hook System Tests ===");
        assert!(lines[2].starts_with("Passing              PASSED ("));
        assert!(lines[2].ends_with("ms)"));
        assert!(lines[3].starts_with("Mismatched           FAILED ("));
        assert!(lines[3].ends_with("ms): count: expected 1, got 2"));
        assert_eq!(lines[4], "Exploding            ERROR: scenario panicked: kaboom");
        assert_eq!(lines.last().copied(), Some(SOME_FAILED));

        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 2);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn all_passing_run_exits_zero() {
        let scenarios = vec![Scenario::new("Passing", || async { Ok(()) })];
        let (report, output) = render(&HarnessConfig::default(), &scenarios);

        assert!(report.all_passed());
        assert_eq!(report.exit_code(), 0);
        assert!(output.ends_with(&format!("\n\n{ALL_PASSED}\n")));
    }

    #[test]
    fn debug_adds_error_detail() {
        let scenarios = vec![Scenario::new("Mismatched", || async {
            ScenarioError::ensure_eq("count", 1_u32, 2_u32)
        })];
        let config = HarnessConfig {
            debug: true,
            ..HarnessConfig::default()
        };

        let (_, output) = render(&config, &scenarios);
        assert!(output.contains("    Mismatch { what: \"count\""));
    }

    #[test]
    fn empty_run_passes() {
        let report = SuiteReport::default();
        assert!(report.all_passed());
        assert_eq!(report.summary(), ALL_PASSED);
    }
}
