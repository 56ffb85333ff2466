//! The built-in hook system scenarios.
//!
//! Each scenario builds a fresh executor, registers recording hooks, and
//! checks the recorded order against what dispatch promises.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hive_graph::hooks::PreExecutionHook;
use hive_graph::{
    BoxFuture, GraphExecutor, HookAction, HookError, HookFlow, HookResult, NodeHooks,
    NodeInputs, NodeResult, NodeSpec, handler_fn,
};
use parking_lot::Mutex;

use crate::runner::{Scenario, ScenarioError};

/// Node id every scenario dispatches for.
const NODE_ID: &str = "test_node";

/// All built-in scenarios, in the order the harness runs them.
#[must_use]
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("Basic Hooks", basic_hooks),
        Scenario::new("Skip Short-Circuit", skip_short_circuit),
        Scenario::new("Failure Isolation", failure_isolation),
        Scenario::new("Panic Isolation", panic_isolation),
        Scenario::new("Clear Pre Only", clear_pre_only),
        Scenario::new("Clear Idempotent", clear_idempotent),
        Scenario::new("Duplicate Hooks", duplicate_hooks),
        Scenario::new("Guarded Execution", guarded_execution),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Shared, ordered record of hook invocations.
#[derive(Clone, Default)]
struct ExecutionLog(Arc<Mutex<Vec<String>>>);

impl ExecutionLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

fn test_node() -> (NodeSpec, NodeInputs) {
    (NodeSpec::new(NODE_ID), NodeInputs::new())
}

/// Registers a pre-execution hook that records `label` and returns `outcome`.
fn recording_pre<F>(hooks: &NodeHooks, log: &ExecutionLog, label: &'static str, outcome: F)
where
    F: Fn() -> HookResult + Send + Sync + 'static,
{
    let log = log.clone();
    let outcome = Arc::new(outcome);
    hooks.add_pre_execution_hook(move |_node_id, _spec, _inputs| {
        let log = log.clone();
        let outcome = Arc::clone(&outcome);
        Box::pin(async move {
            log.push(label);
            outcome()
        })
    });
}

/// Registers a post-execution hook that records `label` and continues.
fn recording_post(hooks: &NodeHooks, log: &ExecutionLog, label: &'static str) {
    let log = log.clone();
    hooks.add_post_execution_hook(move |_node_id, _spec, _inputs, _result| {
        let log = log.clone();
        Box::pin(async move {
            log.push(label);
            Ok(HookAction::Continue)
        })
    });
}

/// Renders a flag as `True`/`False`, the form the execution log records.
fn flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn proceed() -> HookResult {
    Ok(HookAction::Continue)
}

/// Runs the pre- then post-execution hooks once each for [`NODE_ID`].
async fn dispatch_both(hooks: &NodeHooks) -> (HookFlow, HookFlow) {
    let (spec, inputs) = test_node();
    let result = NodeResult::success(NodeInputs::new());
    let pre = hooks.dispatch(NODE_ID, &spec, &inputs, None).await;
    let post = hooks.dispatch(NODE_ID, &spec, &inputs, Some(&result)).await;
    (pre, post)
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

/// A pre-hook and a post-hook each record the node they saw.
async fn basic_hooks() -> Result<(), ScenarioError> {
    let executor = GraphExecutor::new();
    let log = ExecutionLog::default();

    let pre_log = log.clone();
    executor.add_pre_execution_hook(move |node_id, _spec, _inputs| {
        let log = pre_log.clone();
        let entry = format!("PRE: {node_id}");
        Box::pin(async move {
            log.push(entry);
            Ok(HookAction::Continue)
        })
    });

    let post_log = log.clone();
    executor.add_post_execution_hook(move |node_id, _spec, _inputs, result| {
        let log = post_log.clone();
        let entry = format!("POST: {node_id} (success: {})", flag(result.success));
        Box::pin(async move {
            log.push(entry);
            Ok(HookAction::Continue)
        })
    });

    let (spec, inputs) = test_node();
    let result = NodeResult::success(NodeInputs::new());

    let pre = executor
        .execute_node_hooks(NODE_ID, &spec, &inputs, None)
        .await;
    let post = executor
        .execute_node_hooks(NODE_ID, &spec, &inputs, Some(&result))
        .await;

    ScenarioError::ensure_eq("pre flow", HookFlow::Continue, pre)?;
    ScenarioError::ensure_eq("post flow", HookFlow::Continue, post)?;
    ScenarioError::ensure_eq(
        "execution log",
        vec!["PRE: test_node", "POST: test_node (success: True)"],
        log.entries(),
    )
}

/// A skip from the second of three pre-hooks stops the third.
async fn skip_short_circuit() -> Result<(), ScenarioError> {
    let hooks = NodeHooks::new();
    let log = ExecutionLog::default();
    let cached = NodeResult::success(NodeInputs::new()).with_output("answer", 42);

    recording_pre(&hooks, &log, "first", proceed);
    let skip_with = cached.clone();
    recording_pre(&hooks, &log, "second", move || {
        Ok(HookAction::Skip(skip_with.clone()))
    });
    recording_pre(&hooks, &log, "third", proceed);

    let (spec, inputs) = test_node();
    let flow = hooks.run_pre_hooks(NODE_ID, &spec, &inputs).await;

    ScenarioError::ensure_eq("flow", HookFlow::Skip(cached), flow)?;
    ScenarioError::ensure_eq("execution log", vec!["first", "second"], log.entries())
}

/// A failing hook is logged and the hooks after it still run.
async fn failure_isolation() -> Result<(), ScenarioError> {
    let hooks = NodeHooks::new();
    let log = ExecutionLog::default();

    recording_pre(&hooks, &log, "before", proceed);
    recording_pre(&hooks, &log, "failing", || Err(HookError::msg("audit sink offline")));
    recording_pre(&hooks, &log, "after", proceed);

    let (spec, inputs) = test_node();
    let flow = hooks.run_pre_hooks(NODE_ID, &spec, &inputs).await;

    ScenarioError::ensure_eq("flow", HookFlow::Continue, flow)?;
    ScenarioError::ensure_eq(
        "execution log",
        vec!["before", "failing", "after"],
        log.entries(),
    )
}

/// A panicking hook is contained like a failing one.
async fn panic_isolation() -> Result<(), ScenarioError> {
    let hooks = NodeHooks::new();
    let log = ExecutionLog::default();

    recording_pre(&hooks, &log, "panicking", || panic!("hook bug"));
    recording_pre(&hooks, &log, "after", proceed);
    recording_post(&hooks, &log, "post");

    let (pre, post) = dispatch_both(&hooks).await;

    ScenarioError::ensure_eq("pre flow", HookFlow::Continue, pre)?;
    ScenarioError::ensure_eq("post flow", HookFlow::Continue, post)?;
    ScenarioError::ensure_eq(
        "execution log",
        vec!["panicking", "after", "post"],
        log.entries(),
    )
}

/// Clearing only the pre-hooks leaves the post-hooks registered.
async fn clear_pre_only() -> Result<(), ScenarioError> {
    let executor = GraphExecutor::new();
    let log = ExecutionLog::default();
    recording_pre(executor.hooks(), &log, "pre", proceed);
    recording_post(executor.hooks(), &log, "post");

    executor.clear_hooks(true, false);

    ScenarioError::ensure_eq("pre count", 0_usize, executor.hooks().pre_hook_count())?;
    ScenarioError::ensure_eq("post count", 1_usize, executor.hooks().post_hook_count())?;

    let _ = dispatch_both(executor.hooks()).await;
    ScenarioError::ensure_eq("execution log", vec!["post"], log.entries())
}

/// Clearing twice is the same as clearing once, and cleared hooks stay gone.
async fn clear_idempotent() -> Result<(), ScenarioError> {
    let hooks = NodeHooks::new();
    let log = ExecutionLog::default();
    recording_pre(&hooks, &log, "pre", proceed);
    recording_post(&hooks, &log, "post");

    hooks.clear(true, true);
    hooks.clear(true, true);
    ScenarioError::ensure(hooks.is_empty(), "hooks remain after clearing twice")?;

    let (pre, post) = dispatch_both(&hooks).await;
    ScenarioError::ensure_eq("pre flow", HookFlow::Continue, pre)?;
    ScenarioError::ensure_eq("post flow", HookFlow::Continue, post)?;
    ScenarioError::ensure(log.entries().is_empty(), "cleared hooks ran")
}

/// Counts its own invocations.
struct Counter(AtomicUsize);

impl PreExecutionHook for Counter {
    fn call<'a>(
        &'a self,
        _node_id: &'a str,
        _spec: &'a NodeSpec,
        _inputs: &'a NodeInputs,
    ) -> BoxFuture<'a, HookResult> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(HookAction::Continue) })
    }
}

/// Registering the same hook twice runs it twice.
async fn duplicate_hooks() -> Result<(), ScenarioError> {
    let hooks = NodeHooks::new();
    let counter = Arc::new(Counter(AtomicUsize::new(0)));
    hooks.add_boxed_pre_execution_hook(Arc::clone(&counter) as _);
    hooks.add_boxed_pre_execution_hook(Arc::clone(&counter) as _);

    let (spec, inputs) = test_node();
    let _ = hooks.run_pre_hooks(NODE_ID, &spec, &inputs).await;

    ScenarioError::ensure_eq("pre count", 2_usize, hooks.pre_hook_count())?;
    ScenarioError::ensure_eq("invocations", 2_usize, counter.0.load(Ordering::SeqCst))
}

/// A pre-hook skip keeps the handler and the post-hooks from running.
async fn guarded_execution() -> Result<(), ScenarioError> {
    let executor = GraphExecutor::new();
    let log = ExecutionLog::default();
    let calls = Arc::new(AtomicUsize::new(0));

    let handler_calls = Arc::clone(&calls);
    let handler = handler_fn(move |_spec, _inputs| {
        handler_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(NodeResult::success(NodeInputs::new())) })
    });

    let (spec, inputs) = test_node();
    let ran = executor.execute_node(&spec, &inputs, &handler).await;
    ScenarioError::ensure(ran.success, "unguarded node failed")?;
    ScenarioError::ensure_eq("handler calls", 1_usize, calls.load(Ordering::SeqCst))?;

    let blocked = NodeResult::failure("blocked by policy");
    let skip_with = blocked.clone();
    recording_pre(executor.hooks(), &log, "guard", move || {
        Ok(HookAction::Skip(skip_with.clone()))
    });
    recording_post(executor.hooks(), &log, "post");

    let guarded = executor.execute_node(&spec, &inputs, &handler).await;
    ScenarioError::ensure_eq("guarded result", blocked, guarded)?;
    ScenarioError::ensure_eq("handler calls", 1_usize, calls.load(Ordering::SeqCst))?;
    ScenarioError::ensure_eq("execution log", vec!["guard"], log.entries())
}
