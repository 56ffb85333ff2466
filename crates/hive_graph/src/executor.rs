//! Hook-guarded node execution.
//!
//! The [`GraphExecutor`] owns the node hooks and wraps the execution of a
//! single node with them:
//!
//! 1. Pre-execution hooks run. A skip returns the hook's result as-is; the
//!    handler and post-execution hooks do not run.
//! 2. The [`NodeHandler`] runs, optionally under a timeout. Errors and
//!    timeouts become failed [`NodeResult`]s.
//! 3. Post-execution hooks run with the result. A skip here replaces the
//!    returned result with the hook's.
//!
//! # Example
//!
//! ```
//! use hive_graph::executor::{GraphExecutor, handler_fn};
//! use hive_graph::hooks::HookAction;
//! use hive_graph::node::{NodeInputs, NodeResult, NodeSpec};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let executor = GraphExecutor::new();
//! executor.add_post_execution_hook(|node_id, _spec, _inputs, result| {
//!     Box::pin(async move {
//!         assert_eq!(node_id, "double");
//!         assert!(result.success);
//!         Ok(HookAction::Continue)
//!     })
//! });
//!
//! let double = handler_fn(|_spec, inputs| {
//!     Box::pin(async move {
//!         let value = inputs.get("value").and_then(|v| v.as_i64()).unwrap_or(0);
//!         Ok(NodeResult::success(NodeInputs::new()).with_output("value", value * 2))
//!     })
//! });
//!
//! let mut inputs = NodeInputs::new();
//! inputs.insert("value".into(), 21.into());
//! let result = executor.execute_node(&NodeSpec::new("double"), &inputs, &double).await;
//! assert_eq!(result.output["value"], 42);
//! # });
//! ```

use core::fmt;
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;

use crate::hooks::{HookFlow, HookResult, NodeHooks, PostExecutionHook, PreExecutionHook};
use crate::node::{NodeInputs, NodeResult, NodeSpec};

// ─────────────────────────────────────────────────────────────────────────────
// NodeHandler
// ─────────────────────────────────────────────────────────────────────────────

/// Errors a node handler can report.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// A declared input was not provided.
    #[error("missing input '{0}'")]
    MissingInput(String),

    /// The handler failed with a message.
    #[error("{0}")]
    Failed(String),

    /// The handler did not finish within the executor's node timeout.
    #[error("node timed out after {0:?}")]
    Timeout(Duration),

    /// The handler failed with an underlying error.
    #[error(transparent)]
    Other(#[from] Box<dyn core::error::Error + Send + Sync>),
}

/// The work a node performs.
pub trait NodeHandler: Send + Sync {
    /// Executes the node.
    fn execute<'a>(
        &'a self,
        spec: &'a NodeSpec,
        inputs: &'a NodeInputs,
    ) -> BoxFuture<'a, Result<NodeResult, NodeError>>;
}

impl<F> NodeHandler for F
where
    F: for<'a> Fn(&'a NodeSpec, &'a NodeInputs) -> BoxFuture<'a, Result<NodeResult, NodeError>>
        + Send
        + Sync,
{
    fn execute<'a>(
        &'a self,
        spec: &'a NodeSpec,
        inputs: &'a NodeInputs,
    ) -> BoxFuture<'a, Result<NodeResult, NodeError>> {
        self(spec, inputs)
    }
}

/// Pins down a closure's signature so it can be used as a [`NodeHandler`].
///
/// Closure parameter lifetimes are only inferred as higher-ranked when the
/// closure is passed straight to an `Fn` bound; this function is that bound.
pub fn handler_fn<F>(handler: F) -> F
where
    F: for<'a> Fn(&'a NodeSpec, &'a NodeInputs) -> BoxFuture<'a, Result<NodeResult, NodeError>>
        + Send
        + Sync,
{
    handler
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphExecutor
// ─────────────────────────────────────────────────────────────────────────────

/// Executes nodes with pre- and post-execution hooks.
///
/// Graph traversal and scheduling live outside this type; it is handed one
/// node at a time.
pub struct GraphExecutor {
    /// Registered hooks.
    hooks: NodeHooks,
    /// Upper bound on handler run time.
    node_timeout: Option<Duration>,
}

impl Default for GraphExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GraphExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphExecutor")
            .field("hooks", &self.hooks)
            .field("node_timeout", &self.node_timeout)
            .finish()
    }
}

impl GraphExecutor {
    /// Creates an executor with no hooks and no node timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hooks: NodeHooks::new(),
            node_timeout: None,
        }
    }

    /// Fails any node whose handler runs longer than `timeout`.
    #[must_use]
    pub fn with_node_timeout(mut self, timeout: Duration) -> Self {
        self.node_timeout = Some(timeout);
        self
    }

    /// Returns the configured node timeout.
    #[must_use]
    pub fn node_timeout(&self) -> Option<Duration> {
        self.node_timeout
    }

    /// Returns the executor's hook registry.
    #[must_use]
    pub fn hooks(&self) -> &NodeHooks {
        &self.hooks
    }

    /// Adds a pre-execution hook. See [`NodeHooks::add_pre_execution_hook`].
    pub fn add_pre_execution_hook<F>(&self, hook: F) -> &Self
    where
        F: for<'a> Fn(&'a str, &'a NodeSpec, &'a NodeInputs) -> BoxFuture<'a, HookResult>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.add_pre_execution_hook(hook);
        self
    }

    /// Adds a post-execution hook. See [`NodeHooks::add_post_execution_hook`].
    pub fn add_post_execution_hook<F>(&self, hook: F) -> &Self
    where
        F: for<'a> Fn(
                &'a str,
                &'a NodeSpec,
                &'a NodeInputs,
                &'a NodeResult,
            ) -> BoxFuture<'a, HookResult>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.add_post_execution_hook(hook);
        self
    }

    /// Adds a shared pre-execution hook.
    pub fn add_boxed_pre_execution_hook(&self, hook: Arc<dyn PreExecutionHook>) -> &Self {
        self.hooks.add_boxed_pre_execution_hook(hook);
        self
    }

    /// Adds a shared post-execution hook.
    pub fn add_boxed_post_execution_hook(&self, hook: Arc<dyn PostExecutionHook>) -> &Self {
        self.hooks.add_boxed_post_execution_hook(hook);
        self
    }

    /// Clears registered hooks.
    pub fn clear_hooks(&self, pre: bool, post: bool) {
        self.hooks.clear(pre, post);
    }

    /// Runs the pre-execution hooks when `result` is `None`, the
    /// post-execution hooks otherwise.
    pub async fn execute_node_hooks(
        &self,
        node_id: &str,
        spec: &NodeSpec,
        inputs: &NodeInputs,
        result: Option<&NodeResult>,
    ) -> HookFlow {
        self.hooks.dispatch(node_id, spec, inputs, result).await
    }

    /// Executes one node, surrounded by its hooks.
    ///
    /// Never fails: handler errors and timeouts are reported through a
    /// result with `success == false`.
    pub async fn execute_node<H>(
        &self,
        spec: &NodeSpec,
        inputs: &NodeInputs,
        handler: &H,
    ) -> NodeResult
    where
        H: NodeHandler + ?Sized,
    {
        let node_id = spec.id.as_str();

        if let HookFlow::Skip(result) = self.hooks.run_pre_hooks(node_id, spec, inputs).await {
            tracing::debug!(node_id, "node skipped by pre-execution hook");
            return result;
        }

        let start = Instant::now();
        let outcome = match self.node_timeout {
            Some(timeout) => tokio::time::timeout(timeout, handler.execute(spec, inputs))
                .await
                .unwrap_or(Err(NodeError::Timeout(timeout))),
            None => handler.execute(spec, inputs).await,
        };
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let result = match outcome {
            Ok(result) => result.with_latency_ms(latency_ms),
            Err(err) => {
                tracing::warn!(node_id, error = %err, "node failed");
                NodeResult::failure(err.to_string()).with_latency_ms(latency_ms)
            }
        };

        match self
            .hooks
            .run_post_hooks(node_id, spec, inputs, &result)
            .await
        {
            HookFlow::Skip(replacement) => {
                tracing::debug!(node_id, "node result replaced by post-execution hook");
                replacement
            }
            HookFlow::Continue => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookAction, HookError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn counting_handler(calls: &Arc<AtomicUsize>) -> impl NodeHandler + use<> {
        let calls = Arc::clone(calls);
        handler_fn(move |spec, _inputs| {
            calls.fetch_add(1, Ordering::SeqCst);
            let id = spec.id.clone();
            Box::pin(async move {
                Ok(NodeResult::success(NodeInputs::new())
                    .with_output("node", id)
                    .with_tokens_used(3))
            })
        })
    }

    #[test]
    fn executor_creation() {
        let executor = GraphExecutor::new();
        assert!(executor.hooks().is_empty());
        assert_eq!(executor.node_timeout(), None);

        let executor = executor.with_node_timeout(Duration::from_secs(5));
        assert_eq!(executor.node_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn node_error_display() {
        assert_eq!(
            NodeError::MissingInput("query".into()).to_string(),
            "missing input 'query'"
        );
        assert_eq!(
            NodeError::Timeout(Duration::from_millis(10)).to_string(),
            "node timed out after 10ms"
        );
    }

    #[tokio::test]
    async fn execute_node_runs_handler() {
        let executor = GraphExecutor::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(&calls);

        let result = executor
            .execute_node(&NodeSpec::new("n1"), &NodeInputs::new(), &handler)
            .await;

        assert!(result.success);
        assert_eq!(result.output["node"], "n1");
        assert_eq!(result.tokens_used, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pre_hook_skip_bypasses_handler_and_post_hooks() {
        let executor = GraphExecutor::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let post_calls = Arc::new(AtomicUsize::new(0));
        let post_calls_clone = Arc::clone(&post_calls);

        executor
            .add_pre_execution_hook(|_, _, _| {
                Box::pin(async {
                    Ok(HookAction::Skip(
                        NodeResult::success(NodeInputs::new()).with_output("cached", true),
                    ))
                })
            })
            .add_post_execution_hook(move |_, _, _, _| {
                post_calls_clone.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Ok(HookAction::Continue) })
            });

        let result = executor
            .execute_node(&NodeSpec::new("n1"), &NodeInputs::new(), &counting_handler(&calls))
            .await;

        assert_eq!(result.output["cached"], true);
        assert_eq!(result.latency_ms, 0, "skipped nodes are not timed");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(post_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_error_becomes_failed_result() {
        let executor = GraphExecutor::new();
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);
        executor.add_post_execution_hook(move |_, _, _, result| {
            *seen_clone.lock().unwrap() = Some(result.clone());
            Box::pin(async { Ok(HookAction::Continue) })
        });

        let handler = handler_fn(|spec, inputs| {
            Box::pin(async move {
                for key in &spec.input_keys {
                    if !inputs.contains_key(key) {
                        return Err(NodeError::MissingInput(key.clone()));
                    }
                }
                Ok(NodeResult::success(NodeInputs::new()))
            })
        });

        let spec = NodeSpec::new("search").with_input_keys(["query"]);
        let result = executor
            .execute_node(&spec, &NodeInputs::new(), &handler)
            .await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("missing input 'query'"));
        assert_eq!(seen.lock().unwrap().as_ref(), Some(&result));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handler_times_out() {
        let executor = GraphExecutor::new().with_node_timeout(Duration::from_millis(50));
        let handler = handler_fn(|_, _| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(NodeResult::success(NodeInputs::new()))
            })
        });

        let result = executor
            .execute_node(&NodeSpec::new("slow"), &NodeInputs::new(), &handler)
            .await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("node timed out after 50ms"));
    }

    #[tokio::test]
    async fn post_hook_skip_replaces_result() {
        let executor = GraphExecutor::new();
        executor.add_post_execution_hook(|_, _, _, result| {
            let redacted = NodeResult {
                output: NodeInputs::new(),
                ..result.clone()
            };
            Box::pin(async move { Ok(HookAction::Skip(redacted)) })
        });

        let calls = Arc::new(AtomicUsize::new(0));
        let result = executor
            .execute_node(&NodeSpec::new("n1"), &NodeInputs::new(), &counting_handler(&calls))
            .await;

        assert!(result.success);
        assert!(result.output.is_empty());
        assert_eq!(result.tokens_used, 3);
    }

    #[tokio::test]
    async fn failing_hooks_do_not_affect_result() {
        let executor = GraphExecutor::new();
        executor
            .add_pre_execution_hook(|_, _, _| Box::pin(async { Err(HookError::msg("pre broke")) }))
            .add_post_execution_hook(|_, _, _, _| {
                Box::pin(async { Err(HookError::msg("post broke")) })
            });

        let calls = Arc::new(AtomicUsize::new(0));
        let result = executor
            .execute_node(&NodeSpec::new("n1"), &NodeInputs::new(), &counting_handler(&calls))
            .await;

        assert!(result.success);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clear_hooks_delegates_to_registry() {
        let executor = GraphExecutor::new();
        executor
            .add_pre_execution_hook(|_, _, _| Box::pin(async { Ok(HookAction::Continue) }))
            .add_post_execution_hook(|_, _, _, _| Box::pin(async { Ok(HookAction::Continue) }));

        executor.clear_hooks(false, true);
        assert_eq!(executor.hooks().pre_hook_count(), 1);
        assert_eq!(executor.hooks().post_hook_count(), 0);

        executor.clear_hooks(true, true);
        assert!(executor.hooks().is_empty());
    }
}
