//! Node execution hooks for the hive graph executor.
//!
//! `hive_graph` lets callers observe and guard every node execution:
//!
//! - [`NodeSpec`], [`NodeResult`] - What a node is and what it produced
//! - [`NodeHooks`] - Ordered pre-/post-execution hook sequences and dispatch
//! - [`GraphExecutor`] - Runs a node between its hooks
//!
//! # Example
//!
//! ```ignore
//! use hive_graph::{GraphExecutor, HookAction, NodeResult};
//!
//! let executor = GraphExecutor::new();
//!
//! // Serve repeated requests from a cache instead of running the node.
//! executor.add_pre_execution_hook(move |node_id, _spec, inputs| {
//!     let cached = cache.lookup(node_id, inputs);
//!     Box::pin(async move {
//!         Ok(match cached {
//!             Some(result) => HookAction::Skip(result),
//!             None => HookAction::Continue,
//!         })
//!     })
//! });
//!
//! let result = executor.execute_node(&spec, &inputs, &handler).await;
//! ```

/// Node specs, inputs, and results.
pub mod node;

/// Hook traits, registry, and dispatch.
pub mod hooks;

/// Hook-guarded node execution.
pub mod executor;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::executor::{GraphExecutor, NodeError, NodeHandler, handler_fn};
    pub use crate::hooks::{
        HookAction, HookError, HookFlow, HookResult, HookStage, NodeHooks, PostExecutionHook,
        PreExecutionHook,
    };
    pub use crate::node::{NodeInputs, NodeOutput, NodeResult, NodeSpec};
}

// Re-export key types at crate root for convenience
pub use executor::{GraphExecutor, NodeError, NodeHandler, handler_fn};
pub use futures::future::BoxFuture;
pub use hooks::{HookAction, HookError, HookFlow, HookResult, NodeHooks};
pub use node::{NodeInputs, NodeOutput, NodeResult, NodeSpec};
