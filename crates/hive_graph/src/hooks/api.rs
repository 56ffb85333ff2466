//! Hook registration and dispatch.
//!
//! [`NodeHooks`] keeps two ordered hook sequences, one run before a node
//! executes and one run after. Hooks are awaited one at a time in
//! registration order.
//!
//! # Failure Policy
//!
//! - A hook returning [`HookAction::Skip`] stops the sequence; dispatch
//!   returns [`HookFlow::Skip`] with the hook's result.
//! - A hook returning an error, or panicking, is logged with
//!   `tracing::error!` and the next hook runs.
//!
//! # Example
//!
//! ```
//! use hive_graph::hooks::{HookAction, HookFlow, NodeHooks};
//! use hive_graph::node::{NodeInputs, NodeResult, NodeSpec};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let hooks = NodeHooks::new();
//!
//! hooks.add_pre_execution_hook(|node_id, _spec, _inputs| {
//!     Box::pin(async move {
//!         if node_id == "cached" {
//!             Ok(HookAction::Skip(NodeResult::success(NodeInputs::new())))
//!         } else {
//!             Ok(HookAction::Continue)
//!         }
//!     })
//! });
//!
//! let spec = NodeSpec::new("cached");
//! let flow = hooks.run_pre_hooks("cached", &spec, &NodeInputs::new()).await;
//! assert!(flow.is_skip());
//! # });
//! ```

use core::any::Any;
use core::fmt;
use core::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;

use super::outcome::{HookAction, HookError, HookFlow, HookResult, HookStage};
use crate::node::{NodeInputs, NodeResult, NodeSpec};

// ─────────────────────────────────────────────────────────────────────────────
// Hook traits
// ─────────────────────────────────────────────────────────────────────────────

/// A hook invoked before a node executes.
///
/// Closures of the shape
/// `for<'a> Fn(&'a str, &'a NodeSpec, &'a NodeInputs) -> BoxFuture<'a, HookResult>`
/// implement this trait automatically.
pub trait PreExecutionHook: Send + Sync {
    /// Runs the hook for the node about to execute.
    fn call<'a>(
        &'a self,
        node_id: &'a str,
        spec: &'a NodeSpec,
        inputs: &'a NodeInputs,
    ) -> BoxFuture<'a, HookResult>;
}

impl<F> PreExecutionHook for F
where
    F: for<'a> Fn(&'a str, &'a NodeSpec, &'a NodeInputs) -> BoxFuture<'a, HookResult>
        + Send
        + Sync,
{
    fn call<'a>(
        &'a self,
        node_id: &'a str,
        spec: &'a NodeSpec,
        inputs: &'a NodeInputs,
    ) -> BoxFuture<'a, HookResult> {
        self(node_id, spec, inputs)
    }
}

/// A hook invoked after a node executes, with its result.
///
/// Closures of the shape
/// `for<'a> Fn(&'a str, &'a NodeSpec, &'a NodeInputs, &'a NodeResult) -> BoxFuture<'a, HookResult>`
/// implement this trait automatically.
pub trait PostExecutionHook: Send + Sync {
    /// Runs the hook for the node that just executed.
    fn call<'a>(
        &'a self,
        node_id: &'a str,
        spec: &'a NodeSpec,
        inputs: &'a NodeInputs,
        result: &'a NodeResult,
    ) -> BoxFuture<'a, HookResult>;
}

impl<F> PostExecutionHook for F
where
    F: for<'a> Fn(&'a str, &'a NodeSpec, &'a NodeInputs, &'a NodeResult) -> BoxFuture<'a, HookResult>
        + Send
        + Sync,
{
    fn call<'a>(
        &'a self,
        node_id: &'a str,
        spec: &'a NodeSpec,
        inputs: &'a NodeInputs,
        result: &'a NodeResult,
    ) -> BoxFuture<'a, HookResult> {
        self(node_id, spec, inputs, result)
    }
}

/// Shared handle to a pre-execution hook.
pub type ArcPreHook = Arc<dyn PreExecutionHook>;

/// Shared handle to a post-execution hook.
pub type ArcPostHook = Arc<dyn PostExecutionHook>;

// ─────────────────────────────────────────────────────────────────────────────
// NodeHooks
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered pre- and post-execution hook sequences.
///
/// # Thread Safety
///
/// Registration and clearing take `&self` and go through a [`RwLock`].
/// Dispatch copies the sequence before running it, so a `clear` issued while
/// hooks are running only affects later dispatches.
#[derive(Default)]
pub struct NodeHooks {
    pre: RwLock<Vec<ArcPreHook>>,
    post: RwLock<Vec<ArcPostHook>>,
}

impl fmt::Debug for NodeHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHooks")
            .field("pre", &self.pre_hook_count())
            .field("post", &self.post_hook_count())
            .finish()
    }
}

impl NodeHooks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pre-execution hook.
    ///
    /// The same hook may be registered more than once; it then runs once per
    /// registration.
    pub fn add_pre_execution_hook<F>(&self, hook: F) -> &Self
    where
        F: for<'a> Fn(&'a str, &'a NodeSpec, &'a NodeInputs) -> BoxFuture<'a, HookResult>
            + Send
            + Sync
            + 'static,
    {
        self.add_boxed_pre_execution_hook(Arc::new(hook))
    }

    /// Appends a post-execution hook.
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
        self.add_boxed_post_execution_hook(Arc::new(hook))
    }

    /// Appends an already shared pre-execution hook.
    pub fn add_boxed_pre_execution_hook(&self, hook: ArcPreHook) -> &Self {
        self.pre.write().push(hook);
        self
    }

    /// Appends an already shared post-execution hook.
    pub fn add_boxed_post_execution_hook(&self, hook: ArcPostHook) -> &Self {
        self.post.write().push(hook);
        self
    }

    /// Removes the selected hook sequences.
    ///
    /// Clearing an empty sequence is a no-op.
    pub fn clear(&self, pre: bool, post: bool) {
        if pre {
            self.pre.write().clear();
        }
        if post {
            self.post.write().clear();
        }
    }

    /// Returns the number of registered pre-execution hooks.
    #[must_use]
    pub fn pre_hook_count(&self) -> usize {
        self.pre.read().len()
    }

    /// Returns the number of registered post-execution hooks.
    #[must_use]
    pub fn post_hook_count(&self) -> usize {
        self.post.read().len()
    }

    /// Returns `true` if neither sequence has hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pre.read().is_empty() && self.post.read().is_empty()
    }

    /// Runs the pre-execution sequence when `result` is `None`, otherwise the
    /// post-execution sequence.
    pub async fn dispatch(
        &self,
        node_id: &str,
        spec: &NodeSpec,
        inputs: &NodeInputs,
        result: Option<&NodeResult>,
    ) -> HookFlow {
        match result {
            None => self.run_pre_hooks(node_id, spec, inputs).await,
            Some(result) => self.run_post_hooks(node_id, spec, inputs, result).await,
        }
    }

    /// Runs every pre-execution hook in registration order.
    pub async fn run_pre_hooks(
        &self,
        node_id: &str,
        spec: &NodeSpec,
        inputs: &NodeInputs,
    ) -> HookFlow {
        let hooks = self.pre.read().clone();

        for (position, hook) in hooks.iter().enumerate() {
            // Invoke inside the future so a panic while building it is caught too.
            let outcome = AssertUnwindSafe(async { hook.call(node_id, spec, inputs).await })
                .catch_unwind()
                .await;

            if let Some(result) = settle(HookStage::PreExecution, node_id, position, outcome) {
                return HookFlow::Skip(result);
            }
        }

        HookFlow::Continue
    }

    /// Runs every post-execution hook in registration order.
    pub async fn run_post_hooks(
        &self,
        node_id: &str,
        spec: &NodeSpec,
        inputs: &NodeInputs,
        result: &NodeResult,
    ) -> HookFlow {
        let hooks = self.post.read().clone();

        for (position, hook) in hooks.iter().enumerate() {
            let outcome =
                AssertUnwindSafe(async { hook.call(node_id, spec, inputs, result).await })
                    .catch_unwind()
                    .await;

            if let Some(result) = settle(HookStage::PostExecution, node_id, position, outcome) {
                return HookFlow::Skip(result);
            }
        }

        HookFlow::Continue
    }
}

/// Interprets one hook outcome, returning the substitute result on skip.
fn settle(
    stage: HookStage,
    node_id: &str,
    position: usize,
    outcome: Result<HookResult, Box<dyn Any + Send>>,
) -> Option<NodeResult> {
    let error = match outcome {
        Ok(Ok(HookAction::Continue)) => return None,
        Ok(Ok(HookAction::Skip(result))) => {
            tracing::debug!(
                node_id,
                stage = %stage,
                hook = position,
                success = result.success,
                "hook requested skip"
            );
            return Some(result);
        }
        Ok(Err(error)) => error,
        Err(payload) => HookError::from_panic(payload.as_ref()),
    };

    tracing::error!(
        node_id,
        stage = %stage,
        hook = position,
        error = %error,
        "hook failed"
    );
    None
}
