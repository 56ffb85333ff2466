//! End-to-end runs of the harness through its public API.

use hook_harness::runner::{ALL_PASSED, SOME_FAILED};
use hook_harness::{
    HarnessConfig, Scenario, ScenarioError, ScenarioStatus, SuiteReport, default_scenarios,
    run_scenarios,
};

async fn run(scenarios: &[Scenario], config: &HarnessConfig) -> (SuiteReport, String) {
    let mut out = Vec::new();
    let report = run_scenarios(scenarios, config, &mut out).await.unwrap();
    (report, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn filtered_run_only_runs_selected_scenarios() {
    let config =
        HarnessConfig::from_args(["--debug", "skip short-circuit", "Basic Hooks"]).unwrap();
    let scenarios = config.select(default_scenarios()).unwrap();

    let (report, output) = run(&scenarios, &config).await;

    let names: Vec<_> = report.outcomes.iter().map(|outcome| outcome.name).collect();
    assert_eq!(names, vec!["Basic Hooks", "Skip Short-Circuit"]);
    assert!(report.all_passed());
    assert!(output.starts_with("\n=== Running Hook System Tests ===\n"));
    assert!(output.contains("Skip Short-Circuit   PASSED ("));
    assert!(output.trim_end().ends_with(ALL_PASSED));
}

#[tokio::test]
async fn one_failure_fails_the_suite_but_not_the_run() {
    let mut scenarios = vec![Scenario::new("Broken", || async {
        ScenarioError::ensure(false, "hook never ran")
    })];
    scenarios.extend(default_scenarios());

    let config = HarnessConfig::from_args(["--debug"]).unwrap();
    let (report, output) = run(&scenarios, &config).await;

    assert_eq!(report.outcomes.len(), 9);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.exit_code(), 1);
    assert!(matches!(report.outcomes[0].status, ScenarioStatus::Failed(_)));
    assert!(output.contains("check failed: hook never ran"));
    assert!(output.contains("    Check(\"hook never ran\")"));
    assert!(output.trim_end().ends_with(SOME_FAILED));
}
