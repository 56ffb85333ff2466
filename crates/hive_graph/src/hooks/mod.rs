//! Node execution hooks.
//!
//! Hooks are caller-supplied async callbacks run around each node execution:
//!
//! - **Pre-execution hooks** receive `(node_id, spec, inputs)` before the node
//!   runs and may skip it by returning [`HookAction::Skip`] with a substitute
//!   result.
//! - **Post-execution hooks** receive `(node_id, spec, inputs, result)` after
//!   the node runs.
//!
//! # Design Principles
//!
//! - Hooks execute in registration order, one at a time
//! - A skip ends the sequence and hands its result to the caller
//! - A failing or panicking hook is logged and never aborts dispatch
//!
//! # Architecture
//!
//! - **Outcomes** ([`outcome`]): what hooks return and what dispatch yields
//! - **API** ([`api`]): hook traits, registration, and dispatch
//!
//! # Example
//!
//! ```ignore
//! use hive_graph::hooks::{HookAction, NodeHooks};
//! use hive_graph::node::NodeResult;
//!
//! let hooks = NodeHooks::new();
//!
//! // Guard: refuse nodes that are missing declared inputs.
//! hooks.add_pre_execution_hook(|node_id, spec, inputs| {
//!     Box::pin(async move {
//!         match spec.input_keys.iter().find(|key| !inputs.contains_key(*key)) {
//!             Some(key) => Ok(HookAction::Skip(NodeResult::failure(format!(
//!                 "{node_id}: missing input '{key}'"
//!             )))),
//!             None => Ok(HookAction::Continue),
//!         }
//!     })
//! });
//!
//! // Observer: record usage.
//! hooks.add_post_execution_hook(|node_id, _spec, _inputs, result| {
//!     Box::pin(async move {
//!         tracing::info!(node_id, tokens = result.tokens_used, "node finished");
//!         Ok(HookAction::Continue)
//!     })
//! });
//! ```

pub mod api;
pub mod outcome;

pub use api::{ArcPostHook, ArcPreHook, NodeHooks, PostExecutionHook, PreExecutionHook};
pub use outcome::{HookAction, HookError, HookFlow, HookResult, HookStage};
